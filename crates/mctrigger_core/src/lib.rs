//! # mctrigger core
//!
//! Convergence triggers for batch-based Monte Carlo transport runs.
//!
//! After an eligible batch the engine estimates the uncertainty of every
//! triggered tally bin, compares it to the user thresholds and, when the run
//! has not converged, predicts how many batches it still needs.
//!
//! ## Architecture
//!
//! Evaluated leaf-first:
//! - [`uncertainty`]: `(sum, sum_sq, n)` to standard deviation and relative error
//! - [`surface_current`]: worst case over every face crossing of a mesh current tally
//! - [`checker`]: every trigger in the problem, folded into one worst ratio
//! - [`evaluator`]: cadence, status messages and batch-count prediction
//!
//! ## Example
//!
//! ```
//! use mctrigger_core::{MemorySink, TriggerEvaluator, TriggerSettings};
//! use mctrigger_data::Problem;
//!
//! let mut evaluator = TriggerEvaluator::new(TriggerSettings::default());
//! let mut sink = MemorySink::new();
//! let verdict = evaluator.evaluate(20, &Problem::default(), &mut sink);
//! assert!(verdict.unwrap().converged());
//! ```

/// Batch cadence of trigger checks
pub mod cadence;
/// Problem-wide trigger check and its verdict
pub mod checker;
/// Trigger settings loaded from `settings.toml`
pub mod config;
/// Batch-by-batch evaluation, reporting and prediction
pub mod evaluator;
/// Tracing subscriber setup
pub mod logging;
/// Message sinks for status output
pub mod report;
/// Mesh surface current scan
pub mod surface_current;
/// Per-bin uncertainty estimation
pub mod uncertainty;

pub use cadence::CadencePhase;
pub use checker::{
    check_triggers, exceedance_ratio, EvaluationResult, TriggerObservation, TriggerSource,
    WorstTrigger, EIGENVALUE_LABEL,
};
pub use config::{BatchSettings, KeffTrigger, TriggerSettings};
pub use evaluator::{predict_total_batches, BatchVerdict, EvaluatorRole, Prediction, TriggerEvaluator};
pub use logging::init_logging;
pub use report::{MemorySink, MessageLevel, MessageSink, TracingSink};
pub use surface_current::{surface_current_uncertainty, SurfaceLayout, SurfaceScan, SurfaceVariancePolicy};
pub use uncertainty::{estimate, estimate_bin, Observed, Uncertainty};
