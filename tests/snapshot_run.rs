mod common;

use common::{fill_bin, trigger, ProblemBuilder};
use mctrigger_io::{read_log, write_problem, JsonlSink};
use mctrigger_lib::app::{App, Tee};
use mctrigger_lib::model::data::TriggerMetric;
use mctrigger_lib::model::evaluator::Prediction;
use mctrigger_lib::model::report::{MemorySink, MessageLevel};
use std::fs;

const SETTINGS: &str = r#"
[batches]
inactive = 10
minimum = 20
maximum = 100
"#;

fn write_inputs(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    // Ratio sqrt(25/3) ~ 2.89: the first check predicts 94 batches.
    let problem = ProblemBuilder::new()
        .with_volume_tally(4, &["fission"], 2, |t| {
            fill_bin(t, 1, 0, 1.0, 0.5);
            t.triggers.push(trigger(TriggerMetric::StandardDeviation, 0.1, 0));
        })
        .build();

    let settings = dir.join("settings.toml");
    let snapshot = dir.join("problem.json");
    fs::write(&settings, SETTINGS).unwrap();
    write_problem(&snapshot, &problem).unwrap();
    (settings, snapshot)
}

#[test]
fn test_load_and_sweep_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let (settings, snapshot) = write_inputs(dir.path());

    let mut app = App::load(&settings, &snapshot).unwrap();
    assert!(app.evaluator.predicts());

    let mut sink = MemorySink::new();
    let summary = app.run(1..=100, &mut sink);

    assert_eq!(summary.evaluated, vec![20, 94, 100]);
    assert_eq!(summary.converged_at, None);
    assert!(matches!(
        summary.last_prediction,
        Some(Prediction::ExceedsMaximum { .. })
    ));
    assert_eq!(sink.warnings().count(), 2);
    assert_eq!(
        sink.infos().nth(1),
        Some("The estimated number of batches is 94")
    );
}

#[test]
fn test_verdicts_land_in_jsonl_log() {
    let dir = tempfile::tempdir().unwrap();
    let (settings, snapshot) = write_inputs(dir.path());
    let log = dir.path().join("verdicts.jsonl");

    let mut app = App::load(&settings, &snapshot).unwrap();
    let mut sink = Tee(MemorySink::new(), JsonlSink::append(&log).unwrap());
    app.run(1..=100, &mut sink);
    assert_eq!(sink.1.finish().unwrap(), 0);

    let records = read_log(&log).unwrap();
    assert_eq!(records.len(), sink.0.messages.len());
    assert_eq!(records.len(), 6);
    assert_eq!(
        records
            .iter()
            .filter(|r| r.level == MessageLevel::Warning)
            .count(),
        2
    );
    assert!(records[0].message.contains("in tally 4"));
}

#[test]
fn test_load_rejects_bad_settings() {
    let dir = tempfile::tempdir().unwrap();
    let (settings, snapshot) = write_inputs(dir.path());
    fs::write(
        &settings,
        "[batches]\ninactive = 30\nminimum = 20\nmaximum = 100\n",
    )
    .unwrap();

    assert!(App::load(&settings, &snapshot).is_err());
}
