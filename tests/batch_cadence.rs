mod common;

use common::{fill_bin, sd, trigger, ProblemBuilder};
use mctrigger_lib::app::App;
use mctrigger_lib::model::config::{BatchSettings, TriggerSettings};
use mctrigger_lib::model::data::{Problem, TriggerMetric};
use mctrigger_lib::model::evaluator::{predict_total_batches, Prediction, TriggerEvaluator};
use mctrigger_lib::model::report::MemorySink;
use mctrigger_lib::model::uncertainty::estimate_bin;
use mctrigger_lib::model::surface_current::{
    surface_current_uncertainty, SurfaceLayout, SurfaceVariancePolicy,
};

/// One flux tally whose only trigger sits at twice its threshold.
fn twice_threshold() -> Problem {
    ProblemBuilder::new()
        .with_volume_tally(1, &["flux"], 1, |t| {
            fill_bin(t, 0, 0, 1.0, 0.6);
            // Half the bin's own std dev, so the ratio is exactly 2.
            let threshold = estimate_bin(t.results.get(0, 0), t.n_realizations).std_dev / 2.0;
            t.triggers.push(trigger(TriggerMetric::StandardDeviation, threshold, 0));
        })
        .build()
}

fn settings(inactive: u32, minimum: u32, maximum: u32, interval: Option<u32>) -> TriggerSettings {
    TriggerSettings {
        batches: BatchSettings {
            inactive,
            minimum,
            maximum,
            interval,
        },
        ..Default::default()
    }
}

#[test]
fn test_fixed_cadence_batches() {
    let problem = twice_threshold();
    let mut evaluator = TriggerEvaluator::new(settings(5, 10, 23, Some(5)));
    let mut sink = MemorySink::new();

    let evaluated: Vec<u32> = (1..=23)
        .filter(|&b| evaluator.evaluate(b, &problem, &mut sink).is_some())
        .collect();
    assert_eq!(evaluated, vec![10, 15, 20, 23]);
    assert_eq!(sink.messages.len(), 4);
    assert!(sink.warnings().next().is_none());
}

#[test]
fn test_unsatisfied_message_names_tally() {
    let mut evaluator = TriggerEvaluator::new(settings(10, 20, 100, Some(10)));
    let mut sink = MemorySink::new();
    let verdict = evaluator.evaluate(20, &twice_threshold(), &mut sink).unwrap();

    assert!(!verdict.converged());
    assert_eq!(
        sink.infos().next(),
        Some("Triggers unsatisfied, max unc./thresh. is 2.00000 for flux in tally 1")
    );
}

#[test]
fn test_prediction_example() {
    assert_eq!(predict_total_batches(20, 10, 20, 2.0), 51);

    let mut evaluator = TriggerEvaluator::new(settings(10, 20, 100, None));
    let mut sink = MemorySink::new();
    let verdict = evaluator.evaluate(20, &twice_threshold(), &mut sink).unwrap();
    assert_eq!(verdict.prediction, Prediction::Within { total: 51 });
    assert_eq!(
        sink.infos().last(),
        Some("The estimated number of batches is 51")
    );
}

#[test]
fn test_prediction_beyond_maximum_is_a_warning() {
    let mut evaluator = TriggerEvaluator::new(settings(10, 20, 40, None));
    let mut sink = MemorySink::new();
    let verdict = evaluator.evaluate(20, &twice_threshold(), &mut sink).unwrap();
    assert_eq!(verdict.prediction, Prediction::ExceedsMaximum { total: 51 });
    assert_eq!(sink.warnings().count(), 1);

    // The run carries on to its final batch, which is always checked.
    assert!(evaluator.evaluate(40, &twice_threshold(), &mut sink).is_some());
}

#[test]
fn test_app_follows_predicted_cadence() {
    let mut app = App::new(settings(10, 20, 100, None), twice_threshold()).unwrap();
    let mut sink = MemorySink::new();
    let summary = app.run(1..=60, &mut sink);

    // 20 predicts 51; at 51 the unchanged snapshot predicts 175 > 100.
    assert_eq!(summary.evaluated, vec![20, 51]);
    assert_eq!(summary.converged_at, None);
    assert_eq!(
        summary.last_prediction,
        Some(Prediction::ExceedsMaximum { total: 175 })
    );
    assert_eq!(app.verdicts.len(), 2);
}

#[test]
fn test_app_stops_when_converged() {
    let problem = ProblemBuilder::new()
        .with_volume_tally(1, &["flux"], 1, |t| {
            fill_bin(t, 0, 0, 1.0, 0.1);
            t.triggers.push(trigger(TriggerMetric::StandardDeviation, sd(0.1) * 2.0, 0));
        })
        .build();
    let mut app = App::new(settings(2, 5, 50, Some(5)), problem).unwrap();
    let mut sink = MemorySink::new();
    let summary = app.run(1..=50, &mut sink);

    assert_eq!(summary.evaluated, vec![5]);
    assert_eq!(summary.converged_at, Some(5));
    assert_eq!(
        sink.infos().collect::<Vec<_>>(),
        vec!["Triggers satisfied for batch 5"]
    );
}

#[test]
fn test_surface_scan_counts_crossings() {
    let problem = ProblemBuilder::new()
        .with_mesh([2, 1, 1])
        .with_current_tally(1, 0, None, |t| {
            t.triggers.push(trigger(TriggerMetric::RelativeError, 0.1, 0));
        })
        .build();
    let tally = &problem.tallies[0];
    let layout = SurfaceLayout::of(tally).unwrap();
    let scan = surface_current_uncertainty(
        tally,
        layout,
        &problem.meshes[0],
        0,
        SurfaceVariancePolicy::LatestCrossing,
    );
    assert_eq!(scan.evaluations, 24);
}
