//! Step target codec.
//!
//! Only open targets and predefined heart-rate zones have a `<Target>`
//! representation here. Power travels in the step's TPX extension (see
//! [`crate::tcx::step`]) when given in watts. Pace, cadence, non-zone
//! heart-rate and relative power targets are not encoded.

use crate::krd::types::{Target, TargetValue};
use crate::tcx::types::{parse_number, TcxError};
use crate::xml::XmlElement;

const NONE: &str = "None_t";
const HEART_RATE: &str = "HeartRate_t";
const PREDEFINED_HR_ZONE: &str = "PredefinedHeartRateZone_t";

/// Decode a `<Target>` element. A missing element is an open target.
pub fn decode_target(element: Option<&XmlElement>) -> Result<Target, TcxError> {
    let Some(element) = element else {
        return Ok(Target::Open);
    };

    match element.xsi_type() {
        Some(NONE) | None => Ok(Target::Open),
        Some(HEART_RATE) => decode_heart_rate(element),
        Some(other) => {
            tracing::debug!(target_type = other, "Unsupported TCX target, decoding as open");
            Ok(Target::Open)
        }
    }
}

fn decode_heart_rate(element: &XmlElement) -> Result<Target, TcxError> {
    let zone = element
        .child("HeartRateZone")
        .filter(|zone| zone.xsi_type() == Some(PREDEFINED_HR_ZONE))
        .and_then(|zone| zone.child_text("Number"));

    match zone {
        Some(raw) => Ok(Target::HeartRate {
            value: TargetValue::Zone {
                value: parse_number("Target.HeartRateZone.Number", &raw)?,
            },
        }),
        None => {
            tracing::debug!("Heart rate target without predefined zone, decoding as open");
            Ok(Target::Open)
        }
    }
}

/// Encode a target as a `<Target>` element.
pub fn encode_target(target: &Target) -> XmlElement {
    match target {
        Target::HeartRate {
            value: TargetValue::Zone { value },
        } => XmlElement::new("Target")
            .with_attribute("xsi:type", HEART_RATE)
            .with_child(
                XmlElement::new("HeartRateZone")
                    .with_attribute("xsi:type", PREDEFINED_HR_ZONE)
                    .with_child(XmlElement::text_element("Number", value.to_string())),
            ),
        Target::Open => none_target(),
        // watts travel in the step's TPX extension
        Target::Power {
            value: TargetValue::Watts { .. },
        } => none_target(),
        other => {
            tracing::warn!(
                target_type = %other.kind(),
                target = ?other,
                "Target has no TCX representation, writing None_t"
            );
            none_target()
        }
    }
}

fn none_target() -> XmlElement {
    XmlElement::new("Target").with_attribute("xsi:type", NONE)
}
