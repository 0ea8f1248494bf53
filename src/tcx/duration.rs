//! Step duration codec.
//!
//! TCX natively knows time and distance durations. Every other KRD kind is
//! written as a lap-button duration with `kaiord:originalDuration*`
//! attributes that carry the original kind and payload, so the kind comes
//! back intact when the file is read again.

use crate::krd::types::{Duration, DurationKind};
use crate::tcx::types::{parse_number, TcxError, KAIORD_PREFIX};
use crate::xml::XmlElement;

const TIME: &str = "Time_t";
const DISTANCE: &str = "Distance_t";
const LAP_BUTTON: &str = "LapButton_t";
const CALORIES_BURNED: &str = "CaloriesBurned_t";
const HEART_RATE_BELOW: &str = "HeartRateBelow_t";

const ORIGINAL_TYPE: &str = "originalDurationType";
const ORIGINAL_PREFIX: &str = "originalDuration";

/// Payload attributes, by field suffix.
const BPM: &str = "Bpm";
const WATTS: &str = "Watts";
const CALORIES: &str = "Calories";
const SECONDS: &str = "Seconds";
const METERS: &str = "Meters";
const REPEAT_FROM: &str = "RepeatFrom";

/// Decode a `<Duration>` element.
pub fn decode_duration(element: &XmlElement) -> Result<Duration, TcxError> {
    if let Some(duration) = decode_original_duration(element)? {
        return Ok(duration);
    }

    match element.xsi_type() {
        Some(TIME) => {
            let raw = element
                .child_text("Seconds")
                .ok_or_else(|| TcxError::MissingField("Duration.Seconds".to_string()))?;
            Ok(Duration::Time {
                seconds: parse_number("Duration.Seconds", &raw)?,
            })
        }
        Some(DISTANCE) => {
            let raw = element
                .child_text("Meters")
                .ok_or_else(|| TcxError::MissingField("Duration.Meters".to_string()))?;
            Ok(Duration::Distance {
                meters: parse_number("Duration.Meters", &raw)?,
            })
        }
        Some(CALORIES_BURNED) => {
            let calories = element
                .child_text("Calories")
                .map(|raw| parse_number("Duration.Calories", &raw))
                .transpose()?;
            Ok(Duration::Calories { calories })
        }
        Some(HEART_RATE_BELOW) => {
            let bpm = element
                .child("HeartRate")
                .and_then(|hr| hr.child_text("Value"))
                .map(|raw| parse_number("Duration.HeartRate.Value", &raw))
                .transpose()?;
            Ok(Duration::HeartRateLessThan { bpm })
        }
        other => {
            tracing::trace!(duration_type = ?other, "Decoding duration as open");
            Ok(Duration::Open)
        }
    }
}

/// Rebuild an extended duration from `kaiord:originalDuration*` attributes.
fn decode_original_duration(element: &XmlElement) -> Result<Option<Duration>, TcxError> {
    let Some(token) = element.prefixed_attribute(ORIGINAL_TYPE) else {
        return Ok(None);
    };
    let Some(kind) = DurationKind::from_token(token) else {
        tracing::warn!(original_type = token, "Unknown original duration type, ignoring");
        return Ok(None);
    };

    let int = |field: &str| -> Result<Option<u32>, TcxError> {
        original_value(element, field)
            .map(|raw| parse_number(&attribute_name(field), raw))
            .transpose()
    };
    let float = |field: &str| -> Result<Option<f64>, TcxError> {
        original_value(element, field)
            .map(|raw| parse_number(&attribute_name(field), raw))
            .transpose()
    };
    let repeat_from = || -> Result<u32, TcxError> {
        int(REPEAT_FROM)?.ok_or_else(|| TcxError::MissingField(attribute_name(REPEAT_FROM)))
    };

    let duration = match kind {
        DurationKind::Time | DurationKind::Distance | DurationKind::Open => return Ok(None),
        DurationKind::HeartRateLessThan => Duration::HeartRateLessThan { bpm: int(BPM)? },
        DurationKind::PowerLessThan => Duration::PowerLessThan { watts: int(WATTS)? },
        DurationKind::PowerGreaterThan => Duration::PowerGreaterThan { watts: int(WATTS)? },
        DurationKind::Calories => Duration::Calories {
            calories: int(CALORIES)?,
        },
        DurationKind::RepeatUntilTime => Duration::RepeatUntilTime {
            seconds: float(SECONDS)?,
            repeat_from: repeat_from()?,
        },
        DurationKind::RepeatUntilDistance => Duration::RepeatUntilDistance {
            meters: float(METERS)?,
            repeat_from: repeat_from()?,
        },
        DurationKind::RepeatUntilCalories => Duration::RepeatUntilCalories {
            calories: int(CALORIES)?,
            repeat_from: repeat_from()?,
        },
        DurationKind::RepeatUntilHeartRateGreaterThan => {
            Duration::RepeatUntilHeartRateGreaterThan {
                bpm: int(BPM)?,
                repeat_from: repeat_from()?,
            }
        }
        DurationKind::RepeatUntilHeartRateLessThan => Duration::RepeatUntilHeartRateLessThan {
            bpm: int(BPM)?,
            repeat_from: repeat_from()?,
        },
        DurationKind::RepeatUntilPowerLessThan => Duration::RepeatUntilPowerLessThan {
            watts: int(WATTS)?,
            repeat_from: repeat_from()?,
        },
        DurationKind::RepeatUntilPowerGreaterThan => Duration::RepeatUntilPowerGreaterThan {
            watts: int(WATTS)?,
            repeat_from: repeat_from()?,
        },
    };

    Ok(Some(duration))
}

fn original_value<'a>(element: &'a XmlElement, field: &str) -> Option<&'a str> {
    element.prefixed_attribute(&format!("{}{}", ORIGINAL_PREFIX, field))
}

/// Qualified attribute name, e.g. `kaiord:originalDurationBpm`.
fn attribute_name(field: &str) -> String {
    format!("{}:{}{}", KAIORD_PREFIX, ORIGINAL_PREFIX, field)
}

/// Encode a duration as a `<Duration>` element.
pub fn encode_duration(duration: &Duration) -> XmlElement {
    match duration {
        Duration::Time { seconds } => XmlElement::new("Duration")
            .with_attribute("xsi:type", TIME)
            .with_child(XmlElement::text_element("Seconds", seconds.to_string())),
        Duration::Distance { meters } => XmlElement::new("Duration")
            .with_attribute("xsi:type", DISTANCE)
            .with_child(XmlElement::text_element("Meters", meters.to_string())),
        other => encode_lap_button(other),
    }
}

/// Lap-button fallback carrying the original kind in vendor attributes.
fn encode_lap_button(duration: &Duration) -> XmlElement {
    let mut element = XmlElement::new("Duration").with_attribute("xsi:type", LAP_BUTTON);

    let (payload, repeat_from): (Option<(&str, String)>, Option<u32>) = match duration {
        Duration::Time { .. } | Duration::Distance { .. } | Duration::Open => return element,
        Duration::HeartRateLessThan { bpm } => (bpm.map(|v| (BPM, v.to_string())), None),
        Duration::PowerLessThan { watts } | Duration::PowerGreaterThan { watts } => {
            (watts.map(|v| (WATTS, v.to_string())), None)
        }
        Duration::Calories { calories } => (calories.map(|v| (CALORIES, v.to_string())), None),
        Duration::RepeatUntilTime {
            seconds,
            repeat_from,
        } => (seconds.map(|v| (SECONDS, v.to_string())), Some(*repeat_from)),
        Duration::RepeatUntilDistance {
            meters,
            repeat_from,
        } => (meters.map(|v| (METERS, v.to_string())), Some(*repeat_from)),
        Duration::RepeatUntilCalories {
            calories,
            repeat_from,
        } => (calories.map(|v| (CALORIES, v.to_string())), Some(*repeat_from)),
        Duration::RepeatUntilHeartRateGreaterThan { bpm, repeat_from }
        | Duration::RepeatUntilHeartRateLessThan { bpm, repeat_from } => {
            (bpm.map(|v| (BPM, v.to_string())), Some(*repeat_from))
        }
        Duration::RepeatUntilPowerLessThan { watts, repeat_from }
        | Duration::RepeatUntilPowerGreaterThan { watts, repeat_from } => {
            (watts.map(|v| (WATTS, v.to_string())), Some(*repeat_from))
        }
    };

    // A threshold kind without its threshold carries nothing worth keeping.
    if payload.is_none() && repeat_from.is_none() {
        return element;
    }

    element.set_attribute(
        format!("{}:{}", KAIORD_PREFIX, ORIGINAL_TYPE),
        duration.kind().as_str(),
    );
    if let Some((field, value)) = payload {
        element.set_attribute(attribute_name(field), value);
    }
    if let Some(repeat_from) = repeat_from {
        element.set_attribute(attribute_name(REPEAT_FROM), repeat_from.to_string());
    }

    element
}
