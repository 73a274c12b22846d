//! Top-level trigger policy.
//!
//! The [`TriggerEvaluator`] is driven once per finished batch. On batches the
//! cadence selects it runs the problem-wide check, reports the verdict to a
//! [`MessageSink`] and, when the batch interval is left to the engine,
//! predicts how many batches convergence needs. Variance estimators shrink
//! as `1/N`, so a ratio `r` needs about `r²` times the active batches run so
//! far.

use crate::cadence::CadencePhase;
use crate::checker::{check_triggers, EvaluationResult, TriggerSource};
use crate::config::TriggerSettings;
use crate::report::MessageSink;
use mctrigger_data::Problem;
use serde::{Deserialize, Serialize};

/// Which process of a multi-process run this evaluator belongs to. Only the
/// coordinator checks triggers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorRole {
    #[default]
    Coordinator,
    Follower,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "prediction", rename_all = "snake_case")]
pub enum Prediction {
    /// Converged, or the interval is fixed.
    None,
    Within { total: u32 },
    /// The run will stop at the maximum before converging.
    ExceedsMaximum { total: u32 },
}

impl Prediction {
    #[must_use]
    pub fn total(&self) -> Option<u32> {
        match self {
            Prediction::None => None,
            Prediction::Within { total } | Prediction::ExceedsMaximum { total } => Some(*total),
        }
    }
}

/// Everything one evaluation produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchVerdict {
    pub batch: u32,
    pub result: EvaluationResult,
    pub prediction: Prediction,
}

impl BatchVerdict {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.result.satisfied
    }
}

/// Total batches needed for `worst_ratio` to fall to one.
///
/// Saturates at `u32::MAX` when the ratio is too large (or not finite) for
/// the count to fit.
#[must_use]
pub fn predict_total_batches(batch: u32, inactive: u32, minimum: u32, worst_ratio: f64) -> u32 {
    let active = f64::from(batch.saturating_sub(inactive));
    let scaled = (active * worst_ratio * worst_ratio).floor();
    let interval = scaled + f64::from(inactive) - f64::from(minimum) + 1.0;
    let total = interval + f64::from(minimum);
    if total.is_nan() || total >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    total.max(0.0) as u32
}

/// Cadence, check, report and prediction across the batch sequence.
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    settings: TriggerSettings,
    role: EvaluatorRole,
    interval: u32,
}

impl TriggerEvaluator {
    pub fn new(settings: TriggerSettings) -> Self {
        let interval = settings.batches.interval.unwrap_or(1).max(1);
        Self {
            settings,
            role: EvaluatorRole::Coordinator,
            interval,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: EvaluatorRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &TriggerSettings {
        &self.settings
    }

    /// Batches between checks currently in force.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub fn predicts(&self) -> bool {
        self.settings.batches.interval.is_none()
    }

    #[must_use]
    pub fn phase(&self, batch: u32) -> CadencePhase {
        let b = &self.settings.batches;
        CadencePhase::of(batch, b.minimum, self.interval, b.maximum)
    }

    /// Runs the trigger check if `batch` is due for one.
    ///
    /// Returns `None` on followers and on batches the cadence skips. An
    /// unconverged check in prediction mode moves the interval so the next
    /// check falls on the predicted batch.
    pub fn evaluate<S: MessageSink + ?Sized>(
        &mut self,
        batch: u32,
        problem: &Problem,
        sink: &mut S,
    ) -> Option<BatchVerdict> {
        if self.role == EvaluatorRole::Follower {
            return None;
        }
        let phase = self.phase(batch);
        if !phase.should_evaluate() {
            tracing::trace!(batch, ?phase, "No trigger check this batch");
            return None;
        }

        let result = check_triggers(problem, &self.settings);
        let prediction = self.report(batch, &result, sink);
        Some(BatchVerdict {
            batch,
            result,
            prediction,
        })
    }

    fn report<S: MessageSink + ?Sized>(
        &mut self,
        batch: u32,
        result: &EvaluationResult,
        sink: &mut S,
    ) -> Prediction {
        let Some(worst) = result.worst.as_ref() else {
            sink.info(&format!("Triggers satisfied for batch {batch}"));
            return Prediction::None;
        };

        let message = match worst.source {
            TriggerSource::Eigenvalue => format!(
                "Triggers unsatisfied, max unc./thresh. is {:.5} for {}",
                worst.ratio, worst.name
            ),
            TriggerSource::Tally { tally, .. } => format!(
                "Triggers unsatisfied, max unc./thresh. is {:.5} for {} in tally {}",
                worst.ratio, worst.name, tally
            ),
        };
        sink.info(&message);

        if !self.predicts() {
            return Prediction::None;
        }

        let b = self.settings.batches;
        let total = predict_total_batches(batch, b.inactive, b.minimum, worst.ratio);
        self.interval = total.saturating_sub(b.minimum).max(1);
        tracing::debug!(batch, total, interval = self.interval, "Predicted batch count");

        if total > b.maximum {
            sink.warning(&format!(
                "The estimated number of batches is {total} --- greater than max batches"
            ));
            Prediction::ExceedsMaximum { total }
        } else {
            sink.info(&format!("The estimated number of batches is {total}"));
            Prediction::Within { total }
        }
    }
}
