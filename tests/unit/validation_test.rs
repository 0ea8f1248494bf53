//! Unit tests for workout domain bounds

use kaiord::krd::types::{Duration, RepetitionBlock, Sport, Target, TargetValue, Workout, WorkoutEntry, WorkoutStep};
use kaiord::krd::validation::{validate_step, validate_workout, DomainError};
use kaiord::tcx::read_tcx;
use std::fs;

fn block(repeat_count: u32, steps: Vec<WorkoutStep>) -> WorkoutEntry {
    WorkoutEntry::Block(RepetitionBlock {
        id: Some("block-1".to_string()),
        repeat_count,
        steps,
    })
}

#[test]
fn test_fixture_is_within_bounds() {
    let xml = fs::read_to_string("tests/fixtures/workouts/sweet_spot_intervals.tcx")
        .expect("Failed to read fixture");
    let krd = read_tcx(&xml).unwrap();

    assert!(validate_workout(krd.workout().unwrap()).is_ok());
}

#[test]
fn test_zero_repeat_count_rejected() {
    let step = WorkoutStep::new(0, Duration::Open, Target::Open);
    let workout = Workout::new(Sport::Cycling, vec![block(0, vec![step])]);

    assert_eq!(
        validate_workout(&workout),
        Err(DomainError::InvalidRepeatCount)
    );
}

#[test]
fn test_nested_step_checked() {
    let too_hard = WorkoutStep::new(
        0,
        Duration::Time { seconds: 30.0 },
        Target::Power {
            value: TargetValue::Watts { value: 2500.0 },
        },
    );
    let workout = Workout::new(Sport::Cycling, vec![block(4, vec![too_hard])]);

    match validate_workout(&workout) {
        Err(DomainError::AboveMaximum { field, max, .. }) => {
            assert_eq!(field, "power.watts");
            assert_eq!(max, 2000.0);
        }
        other => panic!("Expected AboveMaximum, got {:?}", other),
    }
}

#[test]
fn test_negative_time_rejected() {
    let step = WorkoutStep::new(0, Duration::Time { seconds: -5.0 }, Target::Open);
    assert!(matches!(
        validate_step(&step),
        Err(DomainError::Negative { .. })
    ));
}
