//! Problem-wide trigger check.
//!
//! Computes the observed uncertainty of every trigger (the k-effective
//! trigger first, then each tally's triggers in order), compares it to the
//! threshold, and keeps the single worst uncertainty/threshold ratio.

use crate::config::TriggerSettings;
use crate::surface_current::{surface_current_uncertainty, SurfaceLayout, SurfaceVariancePolicy};
use crate::uncertainty::{estimate_bin, Observed};
use mctrigger_data::{Problem, ScoreKind, Tally, TallyId, TallyKind, Trigger, TriggerMetric};
use serde::{Deserialize, Serialize};

/// Label reported for the k-effective trigger.
pub const EIGENVALUE_LABEL: &str = "eigenvalue";

/// Where a trigger lives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TriggerSource {
    Eigenvalue,
    /// `trigger` indexes [`Tally::triggers`].
    Tally { tally: TallyId, trigger: usize },
}

impl TriggerSource {
    #[must_use]
    pub fn tally(&self) -> Option<TallyId> {
        match self {
            TriggerSource::Eigenvalue => None,
            TriggerSource::Tally { tally, .. } => Some(*tally),
        }
    }
}

/// Outcome of one trigger in one evaluation pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TriggerObservation {
    pub source: TriggerSource,
    /// Score name, or [`EIGENVALUE_LABEL`].
    pub name: String,
    pub metric: TriggerMetric,
    pub threshold: f64,
    pub observed: Observed,
    /// `observed` selected by `metric`.
    pub uncertainty: f64,
    /// Uncertainty/threshold ratio, present only when the threshold is exceeded.
    pub ratio: Option<f64>,
    /// The tally had fewer than two realizations and was not examined.
    pub skipped: bool,
}

impl TriggerObservation {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.ratio.is_none()
    }
}

/// The trigger furthest from convergence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorstTrigger {
    pub ratio: f64,
    pub source: TriggerSource,
    pub name: String,
    pub metric: TriggerMetric,
}

/// Verdict of a single evaluation pass. Built fresh on every check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    /// `true` iff no trigger exceeds its threshold.
    pub satisfied: bool,
    /// First trigger with the largest ratio; `None` when satisfied.
    pub worst: Option<WorstTrigger>,
    pub observations: Vec<TriggerObservation>,
}

impl Default for EvaluationResult {
    fn default() -> Self {
        Self {
            satisfied: true,
            worst: None,
            observations: Vec::new(),
        }
    }
}

impl EvaluationResult {
    /// Largest ratio across the problem, `0.0` when converged.
    #[must_use]
    pub fn worst_ratio(&self) -> f64 {
        self.worst.as_ref().map_or(0.0, |w| w.ratio)
    }

    pub fn unsatisfied(&self) -> impl Iterator<Item = &TriggerObservation> {
        self.observations.iter().filter(|o| !o.is_satisfied())
    }

    fn record(
        &mut self,
        source: TriggerSource,
        name: String,
        metric: TriggerMetric,
        threshold: f64,
        observed: Observed,
        skipped: bool,
    ) {
        let uncertainty = observed.select(metric);
        let ratio = (!skipped && uncertainty > threshold)
            .then(|| exceedance_ratio(metric, uncertainty, threshold));

        if let Some(ratio) = ratio {
            self.satisfied = false;
            // Strict comparison keeps the first trigger on ties.
            if self.worst.as_ref().map_or(true, |w| ratio > w.ratio) {
                self.worst = Some(WorstTrigger {
                    ratio,
                    source,
                    name: name.clone(),
                    metric,
                });
            }
        }

        self.observations.push(TriggerObservation {
            source,
            name,
            metric,
            threshold,
            observed,
            uncertainty,
            ratio,
            skipped,
        });
    }
}

/// Distance to convergence in units of the underlying quantity.
///
/// Variance is quadratic in that quantity, so its ratio is square-rooted.
#[must_use]
pub fn exceedance_ratio(metric: TriggerMetric, uncertainty: f64, threshold: f64) -> f64 {
    match metric {
        TriggerMetric::Variance => (uncertainty / threshold).sqrt(),
        TriggerMetric::StandardDeviation | TriggerMetric::RelativeError => uncertainty / threshold,
    }
}

/// Checks every trigger in `problem` against its threshold.
#[must_use]
pub fn check_triggers(problem: &Problem, settings: &TriggerSettings) -> EvaluationResult {
    let mut result = EvaluationResult::default();

    if let Some(keff) = settings.active_keff_trigger() {
        match problem.eigenvalue {
            Some(k) => {
                let rel_err = if k.mean != 0.0 { k.std_dev / k.mean } else { 0.0 };
                let observed = Observed {
                    variance: k.std_dev * k.std_dev,
                    std_dev: k.std_dev,
                    rel_err,
                };
                result.record(
                    TriggerSource::Eigenvalue,
                    EIGENVALUE_LABEL.to_string(),
                    keff.metric,
                    keff.threshold,
                    observed,
                    false,
                );
            }
            None => tracing::warn!("k-effective trigger set but no eigenvalue estimate is available"),
        }
    }

    for tally in &problem.tallies {
        let skipped = tally.n_realizations < 2;
        if tally.triggers.is_empty() {
            continue;
        }
        tracing::debug!(
            tally = %tally.id,
            kind = ?tally.kind,
            triggers = tally.triggers.len(),
            n = tally.n_realizations,
            skipped,
            "Checking tally triggers"
        );
        for (index, trigger) in tally.triggers.iter().enumerate() {
            let observed = if skipped {
                Observed::default()
            } else {
                observe(problem, tally, trigger, settings.surface_variance)
            };
            let name = tally
                .scores
                .get(trigger.score_index)
                .map_or_else(|| format!("score {}", trigger.score_index), |s| s.name.clone());
            result.record(
                TriggerSource::Tally {
                    tally: tally.id,
                    trigger: index,
                },
                name,
                trigger.metric,
                trigger.threshold,
                observed,
                skipped,
            );
        }
    }

    tracing::debug!(
        satisfied = result.satisfied,
        worst_ratio = result.worst_ratio(),
        triggers = result.observations.len(),
        "Trigger check complete"
    );
    result
}

fn observe(
    problem: &Problem,
    tally: &Tally,
    trigger: &Trigger,
    policy: SurfaceVariancePolicy,
) -> Observed {
    let Some(score) = tally.scores.get(trigger.score_index) else {
        tracing::warn!(tally = %tally.id, score = trigger.score_index, "Trigger watches a missing score");
        return Observed::default();
    };
    let offset = tally.score_bin_offset(trigger.score_index);

    match tally.kind {
        TallyKind::SurfaceCurrent => {
            let layout = SurfaceLayout::of(tally);
            let mesh = tally.mesh_filter().and_then(|(_, id)| problem.mesh(id));
            match (layout, mesh) {
                (Some(layout), Some(mesh)) => {
                    surface_current_uncertainty(tally, layout, mesh, offset, policy).observed
                }
                _ => {
                    tracing::warn!(tally = %tally.id, "Surface current tally lacks mesh or surface filter");
                    Observed::default()
                }
            }
        }
        TallyKind::Volume => scan_score_bins(tally, score.kind, offset),
    }
}

/// Raises the observation over every filter bin, nuclide bin and, for
/// expansion scores, every moment of the watched score.
fn scan_score_bins(tally: &Tally, kind: ScoreKind, offset: usize) -> Observed {
    let n = tally.n_realizations;
    let per_nuclide = tally.n_score_bins();
    let mut observed = Observed::default();

    for filter_bin in 0..tally.n_filter_bins() {
        for nuclide in 0..tally.n_nuclide_bins {
            let first = nuclide * per_nuclide + offset;
            let mut visit = |score_bin: usize| {
                observed.raise(&estimate_bin(tally.results.get(filter_bin, score_bin), n));
            };
            match kind {
                ScoreKind::Legendre { order } => {
                    for moment in 0..=order as usize {
                        visit(first + moment);
                    }
                }
                ScoreKind::SphericalHarmonic { order } => {
                    let mut score_bin = first;
                    for degree in 0..=i64::from(order) {
                        for _m in -degree..=degree {
                            visit(score_bin);
                            score_bin += 1;
                        }
                    }
                }
                ScoreKind::Scalar | ScoreKind::Current => visit(first),
            }
        }
    }
    observed
}
