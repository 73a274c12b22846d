pub mod tee;

pub use tee::Tee;

use anyhow::{Context, Result};
use mctrigger_core::{BatchVerdict, MessageSink, Prediction, TriggerEvaluator, TriggerSettings};
use mctrigger_data::Problem;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// What a batch sweep produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Batches on which triggers were checked.
    pub evaluated: Vec<u32>,
    /// First batch whose check passed; the sweep stops there.
    pub converged_at: Option<u32>,
    /// Most recent prediction made during the sweep.
    pub last_prediction: Option<Prediction>,
}

/// Owns the evaluator and the snapshot it checks.
pub struct App {
    pub evaluator: TriggerEvaluator,
    pub problem: Problem,
    pub verdicts: Vec<BatchVerdict>,
}

impl App {
    pub fn new(settings: TriggerSettings, problem: Problem) -> Result<Self> {
        settings.validate().context("invalid trigger settings")?;
        problem.validate().context("invalid problem snapshot")?;
        tracing::info!(
            fingerprint = %settings.fingerprint(),
            tallies = problem.tallies.len(),
            "Trigger engine ready"
        );
        Ok(Self {
            evaluator: TriggerEvaluator::new(settings),
            problem,
            verdicts: Vec::new(),
        })
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(settings: P, snapshot: Q) -> Result<Self> {
        let settings = mctrigger_io::read_settings(settings)?;
        let problem = mctrigger_io::read_problem(snapshot)?;
        Self::new(settings, problem)
    }

    /// Feeds each batch of `batches` to the evaluator, stopping at the first
    /// converged check. The snapshot is the same for every batch.
    pub fn run<S: MessageSink + ?Sized>(
        &mut self,
        batches: RangeInclusive<u32>,
        sink: &mut S,
    ) -> RunSummary {
        let mut summary = RunSummary {
            evaluated: Vec::new(),
            converged_at: None,
            last_prediction: None,
        };

        for batch in batches {
            let Some(verdict) = self.evaluator.evaluate(batch, &self.problem, sink) else {
                continue;
            };
            summary.evaluated.push(batch);
            if verdict.prediction != Prediction::None {
                summary.last_prediction = Some(verdict.prediction);
            }
            let converged = verdict.converged();
            self.verdicts.push(verdict);
            if converged {
                summary.converged_at = Some(batch);
                break;
            }
        }
        summary
    }
}
