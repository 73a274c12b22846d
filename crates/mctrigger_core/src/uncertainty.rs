//! Per-bin uncertainty estimation.
//!
//! Converts a bin's `(sum, sum_sq, n)` accumulators into the standard
//! deviation of the mean and the relative error, and folds those into the
//! running maxima a trigger reports.

use mctrigger_data::{Accumulator, TriggerMetric};
use serde::{Deserialize, Serialize};

/// Statistics of a single bin.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Uncertainty {
    pub mean: f64,
    /// Standard deviation of the mean.
    pub std_dev: f64,
    /// `std_dev / mean`, zero when the mean is zero.
    pub rel_err: f64,
}

impl Uncertainty {
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// Computes the uncertainty of one bin from its running sums.
///
/// Callers exclude bins with fewer than two realizations. A radicand that
/// floating-point cancellation pushes below zero is clamped to zero.
#[must_use]
pub fn estimate(sum: f64, sum_sq: f64, n: u32) -> Uncertainty {
    debug_assert!(n >= 2, "uncertainty needs at least two realizations, got {n}");
    let n = f64::from(n);
    let mean = sum / n;
    let radicand = ((sum_sq / n - mean * mean) / (n - 1.0)).max(0.0);
    let std_dev = radicand.sqrt();
    let rel_err = if mean != 0.0 { std_dev / mean } else { 0.0 };
    Uncertainty {
        mean,
        std_dev,
        rel_err,
    }
}

#[must_use]
pub fn estimate_bin(acc: &Accumulator, n: u32) -> Uncertainty {
    estimate(acc.sum, acc.sum_sq, n)
}

/// Worst statistics seen for one trigger during a single evaluation pass.
///
/// Every field starts at zero and only ever rises.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Observed {
    pub variance: f64,
    pub std_dev: f64,
    pub rel_err: f64,
}

impl Observed {
    /// Raises std_dev, rel_err and variance to the maximum of the current
    /// value and the bin's value.
    pub fn raise(&mut self, bin: &Uncertainty) {
        self.raise_spread(bin);
        self.variance = self.variance.max(bin.variance());
    }

    /// Raises std_dev and rel_err only; the caller owns `variance`.
    pub fn raise_spread(&mut self, bin: &Uncertainty) {
        self.std_dev = self.std_dev.max(bin.std_dev);
        self.rel_err = self.rel_err.max(bin.rel_err);
    }

    /// Field-wise maximum of two partial scans.
    #[must_use]
    pub fn merge(self, other: Observed) -> Observed {
        Observed {
            variance: self.variance.max(other.variance),
            std_dev: self.std_dev.max(other.std_dev),
            rel_err: self.rel_err.max(other.rel_err),
        }
    }

    /// The value a trigger with `metric` compares against its threshold.
    #[must_use]
    pub fn select(&self, metric: TriggerMetric) -> f64 {
        match metric {
            TriggerMetric::Variance => self.variance,
            TriggerMetric::StandardDeviation => self.std_dev,
            TriggerMetric::RelativeError => self.rel_err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_known_values() {
        // Batches 1, 2, 3: mean 2, sample variance 1, std dev of mean sqrt(1/3).
        let u = estimate(6.0, 14.0, 3);
        assert!((u.mean - 2.0).abs() < 1e-12);
        assert!((u.std_dev - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((u.rel_err - u.std_dev / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_mean_has_zero_rel_err() {
        // Batches -1, 1.
        let u = estimate(0.0, 2.0, 2);
        assert_eq!(u.mean, 0.0);
        assert!(u.std_dev > 0.0);
        assert_eq!(u.rel_err, 0.0);
    }

    #[test]
    fn test_negative_radicand_clamped() {
        // sum_sq / n is a hair below mean^2.
        let u = estimate(3.0, 4.5 - 1e-12, 2);
        assert_eq!(u.std_dev, 0.0);
        assert!(!u.std_dev.is_nan());
    }

    #[test]
    fn test_constant_batches_have_no_spread() {
        let mut acc = Accumulator::default();
        for _ in 0..10 {
            acc.add(0.1);
        }
        let u = estimate_bin(&acc, 10);
        assert!(u.std_dev >= 0.0);
        assert!(u.std_dev < 1e-8);
    }

    #[test]
    fn test_raise_only_increases() {
        let mut observed = Observed::default();
        observed.raise(&Uncertainty {
            mean: 1.0,
            std_dev: 0.5,
            rel_err: 0.5,
        });
        observed.raise(&Uncertainty {
            mean: 10.0,
            std_dev: 0.1,
            rel_err: 0.01,
        });
        assert_eq!(observed.std_dev, 0.5);
        assert_eq!(observed.rel_err, 0.5);
        assert_eq!(observed.variance, 0.25);
    }

    #[test]
    fn test_select_metric() {
        let observed = Observed {
            variance: 1.0,
            std_dev: 2.0,
            rel_err: 3.0,
        };
        assert_eq!(observed.select(TriggerMetric::Variance), 1.0);
        assert_eq!(observed.select(TriggerMetric::StandardDeviation), 2.0);
        assert_eq!(observed.select(TriggerMetric::RelativeError), 3.0);
    }
}
