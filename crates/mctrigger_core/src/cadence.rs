//! When to check triggers.
//!
//! Triggers are checked from the minimum batch onward, every `interval`
//! batches counted from the minimum, and always on the final batch.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CadencePhase {
    BelowMinimum,
    OffCadence,
    OnCadence,
    FinalBatch,
}

impl CadencePhase {
    /// Classifies `batch` against the configured batch counts.
    ///
    /// An `interval` of zero is treated as one.
    #[must_use]
    pub fn of(batch: u32, minimum: u32, interval: u32, maximum: u32) -> Self {
        if batch < minimum {
            CadencePhase::BelowMinimum
        } else if batch == maximum {
            CadencePhase::FinalBatch
        } else if (batch - minimum) % interval.max(1) == 0 {
            CadencePhase::OnCadence
        } else {
            CadencePhase::OffCadence
        }
    }

    #[must_use]
    pub fn should_evaluate(self) -> bool {
        matches!(self, CadencePhase::OnCadence | CadencePhase::FinalBatch)
    }
}
