//! Unit tests for TCX workout reading

use kaiord::krd::types::{Duration, DurationKind, Intensity, Sport, Target, TargetKind, TargetValue};
use kaiord::tcx::{read_tcx, TcxError, TcxReader};
use serde_json::json;
use std::fs;

const RUNNING_TCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Workouts>
    <Workout Sport="Running">
      <Step xsi:type="Step_t">
        <StepId>1</StepId>
        <Duration xsi:type="Time_t">
          <Seconds>300</Seconds>
        </Duration>
        <Target xsi:type="None_t"/>
      </Step>
    </Workout>
  </Workouts>
</TrainingCenterDatabase>"#;

fn read_fixture() -> String {
    fs::read_to_string("tests/fixtures/workouts/sweet_spot_intervals.tcx")
        .expect("Failed to read fixture")
}

#[test]
fn test_single_running_step() {
    let krd = TcxReader::new().read(RUNNING_TCX).expect("Failed to read TCX");

    assert_eq!(krd.metadata.sport.as_deref(), Some("running"));

    let value = serde_json::to_value(&krd).unwrap();
    assert_eq!(
        value["extensions"]["workout"]["steps"][0],
        json!({
            "stepIndex": 0,
            "durationType": "time",
            "duration": { "type": "time", "seconds": 300.0 },
            "targetType": "open",
            "target": { "type": "open" }
        })
    );
}

#[test]
fn test_fixture_metadata() {
    let krd = read_tcx(&read_fixture()).expect("Failed to read fixture");

    assert_eq!(krd.metadata.created.as_deref(), Some("2025-03-01T07:30:00Z"));
    assert_eq!(krd.metadata.manufacturer.as_deref(), Some("garmin"));
    assert_eq!(krd.metadata.product.as_deref(), Some("edge_1040"));
    assert_eq!(krd.metadata.serial_number, None);
    assert_eq!(krd.metadata.sport.as_deref(), Some("cycling"));
    assert!(krd.extensions.tcx.is_some());
}

#[test]
fn test_fixture_structure() {
    let krd = read_tcx(&read_fixture()).unwrap();
    let workout = krd.workout().unwrap();

    assert_eq!(workout.name.as_deref(), Some("Sweet Spot"));
    assert_eq!(workout.sport, Sport::Cycling);
    assert_eq!(workout.steps.len(), 4);
    assert!(workout.tcx_extensions().is_some());

    let top: Vec<(u32, Option<&str>)> = workout
        .top_level_steps()
        .map(|s| (s.step_index, s.name.as_deref()))
        .collect();
    assert_eq!(
        top,
        vec![(0, Some("Warm Up")), (1, Some("Burn")), (2, Some("Cool Down"))]
    );

    let block = workout.steps[1].as_block().expect("Expected repeat block");
    assert_eq!(block.repeat_count, 3);
    assert!(block.id.is_none());
    assert_eq!(block.steps[0].step_index, 0);
    assert_eq!(block.steps[1].step_index, 1);
}

#[test]
fn test_fixture_targets_and_durations() {
    let krd = read_tcx(&read_fixture()).unwrap();
    let workout = krd.workout().unwrap();

    let warm_up = workout.steps[0].as_step().unwrap();
    assert_eq!(warm_up.intensity, Some(Intensity::Warmup));
    assert_eq!(
        warm_up.target,
        Target::HeartRate {
            value: TargetValue::Zone { value: 2 }
        }
    );

    let block = workout.steps[1].as_block().unwrap();
    assert_eq!(block.steps[0].target_type(), TargetKind::Power);
    assert_eq!(block.steps[0].target.power_watts(), Some(265.0));
    assert_eq!(block.steps[1].duration, Duration::Distance { meters: 1000.0 });
    assert_eq!(block.steps[1].intensity, Some(Intensity::Resting));

    let burn = workout.steps[2].as_step().unwrap();
    assert_eq!(burn.duration, Duration::Calories { calories: Some(150) });
    assert_eq!(burn.duration_type(), DurationKind::Calories);

    let cool_down = workout.steps[3].as_step().unwrap();
    assert_eq!(cool_down.duration, Duration::Open);
    assert_eq!(cool_down.intensity, Some(Intensity::Cooldown));
}

#[test]
fn test_native_extended_durations() {
    let xml = RUNNING_TCX.replace(
        r#"<Duration xsi:type="Time_t">
          <Seconds>300</Seconds>
        </Duration>"#,
        r#"<Duration xsi:type="HeartRateBelow_t"><HeartRate><Value>120</Value></HeartRate></Duration>"#,
    );

    let krd = read_tcx(&xml).unwrap();
    let step = krd.workout().unwrap().steps[0].as_step().unwrap();

    assert_eq!(step.duration, Duration::HeartRateLessThan { bpm: Some(120) });
}

#[test]
fn test_unknown_sport_falls_back_to_generic() {
    let xml = RUNNING_TCX.replace("Sport=\"Running\"", "Sport=\"Rowing\"");
    let krd = read_tcx(&xml).unwrap();

    assert_eq!(krd.workout().unwrap().sport, Sport::Generic);
    assert_eq!(krd.metadata.sport.as_deref(), Some("generic"));
}

#[test]
fn test_malformed_xml() {
    let result = read_tcx("<TrainingCenterDatabase><Workouts></Workout>");

    let error = result.unwrap_err();
    assert!(error.is_parsing());
    assert!(error.to_string().starts_with("Failed to parse TCX XML"));
}

#[test]
fn test_missing_root_element() {
    let error = read_tcx("<gpx version=\"1.1\"><trk/></gpx>").unwrap_err();

    assert!(error.is_parsing());
    assert_eq!(
        error.to_string(),
        "Invalid TCX format: missing TrainingCenterDatabase element"
    );
}

#[test]
fn test_no_workouts() {
    let xml = r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2"><Activities/></TrainingCenterDatabase>"#;
    let error = read_tcx(xml).unwrap_err();

    assert_eq!(error.to_string(), "No workouts found in TCX file");
}

#[test]
fn test_decode_errors_are_not_wrapped() {
    let xml = RUNNING_TCX.replace("<Seconds>300</Seconds>", "<Seconds>five</Seconds>");
    let error = read_tcx(&xml).unwrap_err();

    match error {
        TcxError::InvalidValue { field, value } => {
            assert_eq!(field, "Duration.Seconds");
            assert_eq!(value, "five");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_zero_repetitions_rejected() {
    let xml = read_fixture().replace("<Repetitions>3</Repetitions>", "<Repetitions>0</Repetitions>");
    assert!(xml.contains("<Repetitions>0</Repetitions>"));

    match read_tcx(&xml).unwrap_err() {
        TcxError::InvalidValue { field, value } => {
            assert_eq!(field, "Step.Repetitions");
            assert_eq!(value, "0");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}
