//! Run-level trigger settings.
//!
//! Strongly-typed mirror of the `settings.toml` the input layer produces.
//!
//! ## Example `settings.toml`
//!
//! ```toml
//! run_mode = "eigenvalue"
//! surface_variance = "latest_crossing"
//!
//! [batches]
//! inactive = 10
//! minimum = 20
//! maximum = 100
//! interval = 5          # omit to let the engine predict it
//!
//! [keff_trigger]
//! metric = "std_dev"
//! threshold = 0.001
//! ```

use crate::surface_current::SurfaceVariancePolicy;
use mctrigger_data::{RunMode, TriggerMetric};
use serde::{Deserialize, Serialize};

/// Batch counts that drive the evaluation cadence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Batches discarded before tallies start accumulating.
    pub inactive: u32,
    /// Batches always run before triggers are first checked.
    pub minimum: u32,
    /// Hard cap; the run ends here converged or not.
    pub maximum: u32,
    /// Batches between checks. `None` starts at 1 and is re-predicted after
    /// every unconverged check.
    #[serde(default)]
    pub interval: Option<u32>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            inactive: 10,
            minimum: 20,
            maximum: 100,
            interval: None,
        }
    }
}

/// Trigger on the combined k-effective estimate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct KeffTrigger {
    pub metric: TriggerMetric,
    pub threshold: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TriggerSettings {
    #[serde(default)]
    pub run_mode: RunMode,
    #[serde(default)]
    pub batches: BatchSettings,
    #[serde(default)]
    pub keff_trigger: Option<KeffTrigger>,
    #[serde(default)]
    pub surface_variance: SurfaceVariancePolicy,
}

impl TriggerSettings {
    /// Validates all settings.
    ///
    /// # Validation Rules
    /// - `inactive < minimum <= maximum`
    /// - A fixed interval is at least one batch
    /// - The k-effective threshold is positive and finite
    pub fn validate(&self) -> anyhow::Result<()> {
        let b = &self.batches;
        anyhow::ensure!(
            b.inactive < b.minimum,
            "Inactive batches ({}) must be fewer than minimum batches ({})",
            b.inactive,
            b.minimum
        );
        anyhow::ensure!(
            b.minimum <= b.maximum,
            "Minimum batches ({}) exceed maximum batches ({})",
            b.minimum,
            b.maximum
        );
        if let Some(interval) = b.interval {
            anyhow::ensure!(interval >= 1, "Batch interval must be at least 1");
        }
        if let Some(keff) = &self.keff_trigger {
            anyhow::ensure!(
                keff.threshold.is_finite() && keff.threshold > 0.0,
                "k-effective trigger threshold must be positive"
            );
        }
        Ok(())
    }

    /// Parses and validates settings from TOML.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings = toml::from_str::<Self>(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Eigenvalue trigger, only when the run produces an eigenvalue.
    #[must_use]
    pub fn active_keff_trigger(&self) -> Option<&KeffTrigger> {
        match self.run_mode {
            RunMode::Eigenvalue => self.keff_trigger.as_ref(),
            RunMode::FixedSource => None,
        }
    }

    /// Short digest identifying the settings a verdict was produced under.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.run_mode).as_bytes());
        hasher.update(format!("{:?}", self.batches).as_bytes());
        hasher.update(format!("{:?}", self.keff_trigger).as_bytes());
        hasher.update(format!("{:?}", self.surface_variance).as_bytes());
        hex::encode(&hasher.finalize()[..8])
    }
}
