//! Domain bounds enforced when workouts are edited.
//!
//! The codecs accept whatever values they are given; these checks belong at
//! the editing boundary, before a value is committed to a workout.

use chrono::DateTime;
use thiserror::Error;

use crate::krd::types::{Duration, Metadata, Target, TargetValue, Workout, WorkoutEntry, WorkoutStep};

/// Maximum calories for calorie-based durations.
pub const MAX_CALORIES: u32 = 10_000;
/// Maximum wattage for power thresholds.
pub const MAX_WATTS: u32 = 2_000;
/// Maximum heart rate for heart-rate thresholds.
pub const MAX_BPM: u32 = 220;
/// Maximum repeat-until-time threshold (24 hours).
pub const MAX_REPEAT_SECONDS: f64 = 86_400.0;
/// Maximum repeat-until-distance threshold (1000 km).
pub const MAX_REPEAT_METERS: f64 = 1_000_000.0;
/// Highest predefined heart-rate zone.
pub const MAX_HEART_RATE_ZONE: u8 = 5;

/// A value outside its allowed range.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("{field} must be at most {max}, got {value}")]
    AboveMaximum { field: String, value: f64, max: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Repeat count must be at least 1")]
    InvalidRepeatCount,

    #[error("Invalid timestamp for {field}: {value}")]
    InvalidTimestamp { field: String, value: String },
}

fn at_most(field: &str, value: f64, max: f64) -> Result<(), DomainError> {
    if value < 0.0 {
        return Err(DomainError::Negative {
            field: field.to_string(),
            value,
        });
    }
    if value > max {
        return Err(DomainError::AboveMaximum {
            field: field.to_string(),
            value,
            max,
        });
    }
    Ok(())
}

fn optional_at_most<T: Into<f64> + Copy>(
    field: &str,
    value: Option<T>,
    max: f64,
) -> Result<(), DomainError> {
    match value {
        Some(v) => at_most(field, v.into(), max),
        None => Ok(()),
    }
}

/// Check a duration's payload against its bounds.
pub fn validate_duration(duration: &Duration) -> Result<(), DomainError> {
    let calories = MAX_CALORIES as f64;
    let watts = MAX_WATTS as f64;
    let bpm = MAX_BPM as f64;

    match duration {
        Duration::Time { seconds } => at_most("seconds", *seconds, f64::MAX),
        Duration::Distance { meters } => at_most("meters", *meters, f64::MAX),
        Duration::Open => Ok(()),
        Duration::HeartRateLessThan { bpm: value }
        | Duration::RepeatUntilHeartRateGreaterThan { bpm: value, .. }
        | Duration::RepeatUntilHeartRateLessThan { bpm: value, .. } => {
            optional_at_most("bpm", *value, bpm)
        }
        Duration::PowerLessThan { watts: value }
        | Duration::PowerGreaterThan { watts: value }
        | Duration::RepeatUntilPowerLessThan { watts: value, .. }
        | Duration::RepeatUntilPowerGreaterThan { watts: value, .. } => {
            optional_at_most("watts", *value, watts)
        }
        Duration::Calories { calories: value }
        | Duration::RepeatUntilCalories {
            calories: value, ..
        } => optional_at_most("calories", *value, calories),
        Duration::RepeatUntilTime { seconds, .. } => {
            optional_at_most("seconds", *seconds, MAX_REPEAT_SECONDS)
        }
        Duration::RepeatUntilDistance { meters, .. } => {
            optional_at_most("meters", *meters, MAX_REPEAT_METERS)
        }
    }
}

fn validate_target_value(field: &str, value: &TargetValue) -> Result<(), DomainError> {
    match value {
        TargetValue::Zone { value } => {
            if (1..=MAX_HEART_RATE_ZONE).contains(value) || field != "heart_rate" {
                Ok(())
            } else {
                Err(DomainError::OutOfRange {
                    field: format!("{}.zone", field),
                    value: *value as f64,
                    min: 1.0,
                    max: MAX_HEART_RATE_ZONE as f64,
                })
            }
        }
        TargetValue::Bpm { value } => at_most(&format!("{}.bpm", field), *value, MAX_BPM as f64),
        TargetValue::Watts { value } => {
            at_most(&format!("{}.watts", field), *value, MAX_WATTS as f64)
        }
        TargetValue::Range { min, max } => {
            at_most(&format!("{}.min", field), *min, f64::MAX)?;
            if max < min {
                return Err(DomainError::OutOfRange {
                    field: format!("{}.max", field),
                    value: *max,
                    min: *min,
                    max: f64::MAX,
                });
            }
            Ok(())
        }
        TargetValue::Mps { value }
        | TargetValue::Rpm { value }
        | TargetValue::PercentFtp { value }
        | TargetValue::PercentMax { value } => at_most(field, *value, f64::MAX),
    }
}

/// Check a target's value against its bounds.
pub fn validate_target(target: &Target) -> Result<(), DomainError> {
    match target {
        Target::Open | Target::StrokeType { .. } => Ok(()),
        Target::HeartRate { value } => validate_target_value("heart_rate", value),
        Target::Power { value } => validate_target_value("power", value),
        Target::Pace { value } => validate_target_value("pace", value),
        Target::Cadence { value } => validate_target_value("cadence", value),
    }
}

pub fn validate_step(step: &WorkoutStep) -> Result<(), DomainError> {
    validate_duration(&step.duration)?;
    validate_target(&step.target)
}

/// Check every step and block of a workout.
pub fn validate_workout(workout: &Workout) -> Result<(), DomainError> {
    for entry in &workout.steps {
        match entry {
            WorkoutEntry::Step(step) => validate_step(step)?,
            WorkoutEntry::Block(block) => {
                if block.repeat_count < 1 {
                    return Err(DomainError::InvalidRepeatCount);
                }
                for step in &block.steps {
                    validate_step(step)?;
                }
            }
        }
    }
    Ok(())
}

/// `created` must be an RFC 3339 timestamp when present.
pub fn validate_metadata(metadata: &Metadata) -> Result<(), DomainError> {
    if let Some(created) = &metadata.created {
        DateTime::parse_from_rfc3339(created).map_err(|_| DomainError::InvalidTimestamp {
            field: "created".to_string(),
            value: created.clone(),
        })?;
    }
    Ok(())
}
