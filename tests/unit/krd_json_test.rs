//! Unit tests for the KRD JSON layout

use kaiord::krd::types::{
    Duration, KrdDocument, Metadata, RepetitionBlock, Sport, Target, TargetValue, Workout,
    WorkoutEntry, WorkoutStep,
};
use serde_json::json;

#[test]
fn test_document_envelope() {
    let krd = KrdDocument::new(
        Metadata {
            created: Some("2025-01-15T10:00:00Z".to_string()),
            sport: Some("running".to_string()),
            serial_number: Some("1234".to_string()),
            ..Default::default()
        },
        Some(Workout::new(Sport::Running, Vec::new())),
    );

    let value = serde_json::to_value(&krd).unwrap();

    assert_eq!(value["version"], "1.0");
    assert_eq!(value["type"], "workout");
    assert_eq!(
        value["metadata"],
        json!({
            "created": "2025-01-15T10:00:00Z",
            "sport": "running",
            "serialNumber": "1234"
        })
    );
    assert_eq!(value["extensions"]["workout"]["sport"], "running");
    assert!(value["extensions"].get("tcx").is_none());
}

#[test]
fn test_block_and_step_entries() {
    let value = json!({
        "sport": "cycling",
        "steps": [
            {
                "repeatCount": 3,
                "id": "block-a",
                "steps": [
                    {
                        "stepIndex": 0,
                        "durationType": "time",
                        "duration": { "type": "time", "seconds": 60 },
                        "targetType": "power",
                        "target": { "type": "power", "value": { "unit": "percent_ftp", "value": 110 } }
                    }
                ]
            },
            {
                "stepIndex": 0,
                "durationType": "repeat_until_time",
                "duration": { "type": "repeat_until_time", "seconds": 1200, "repeatFrom": 0 },
                "targetType": "heart_rate",
                "target": { "type": "heart_rate", "value": { "unit": "range", "min": 120, "max": 150 } },
                "intensity": "active"
            }
        ]
    });

    let workout: Workout = serde_json::from_value(value).unwrap();

    assert_eq!(workout.sport, Sport::Cycling);
    let block = workout.steps[0].as_block().expect("Expected block");
    assert_eq!(block.id.as_deref(), Some("block-a"));
    assert_eq!(
        block.steps[0].target,
        Target::Power {
            value: TargetValue::PercentFtp { value: 110.0 }
        }
    );

    let step = workout.steps[1].as_step().expect("Expected step");
    assert_eq!(
        step.duration,
        Duration::RepeatUntilTime {
            seconds: Some(1200.0),
            repeat_from: 0
        }
    );
    assert_eq!(
        step.target,
        Target::HeartRate {
            value: TargetValue::Range {
                min: 120.0,
                max: 150.0
            }
        }
    );
}

#[test]
fn test_unknown_sport_reads_as_generic() {
    let workout: Workout = serde_json::from_value(json!({ "sport": "rowing", "steps": [] })).unwrap();
    assert_eq!(workout.sport, Sport::Generic);
}

#[test]
fn test_json_round_trip() {
    let mut step = WorkoutStep::new(0, Duration::Calories { calories: Some(500) }, Target::Open);
    step.notes = Some("steady".to_string());
    let workout = Workout::new(
        Sport::Swimming,
        vec![
            WorkoutEntry::Step(step),
            WorkoutEntry::Block(RepetitionBlock {
                id: None,
                repeat_count: 4,
                steps: vec![WorkoutStep::new(
                    0,
                    Duration::Distance { meters: 100.0 },
                    Target::Open,
                )],
            }),
        ],
    );
    let krd = KrdDocument::new(Metadata::default(), Some(workout));

    let text = serde_json::to_string_pretty(&krd).unwrap();
    let back: KrdDocument = serde_json::from_str(&text).unwrap();

    assert_eq!(back, krd);
}
