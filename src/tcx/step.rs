//! Step and repeat codec.
//!
//! Power targets ride in the step's `Extensions/TPX/Watts`. On decode an open
//! target is promoted to a watts target when that entry exists. On encode,
//! stored extensions always win: a step read from TCX re-emits exactly what
//! it was read with, and only a freshly authored power step gets a new TPX
//! block.

use crate::krd::types::{Intensity, RepetitionBlock, Target, TargetValue, VendorExtensions, WorkoutStep};
use crate::tcx::duration::{decode_duration, encode_duration};
use crate::tcx::extensions::{capture_extensions, extensions_element, power_extensions, tpx_watts};
use crate::tcx::target::{decode_target, encode_target};
use crate::tcx::types::{parse_number, TcxError};
use crate::xml::XmlElement;

pub const STEP_TYPE: &str = "Step_t";
pub const REPEAT_TYPE: &str = "Repeat_t";

/// Decode a `Step_t` element (a `<Step>` or a repeat's `<Child>`).
pub fn decode_step(element: &XmlElement, step_index: u32) -> Result<WorkoutStep, TcxError> {
    let duration_element = element
        .child("Duration")
        .ok_or_else(|| TcxError::MissingField("Step.Duration".to_string()))?;
    let duration = decode_duration(duration_element)?;

    let mut target = decode_target(element.child("Target"))?;
    let extensions = capture_extensions(element);

    if target == Target::Open {
        if let Some(watts) = extensions.as_ref().and_then(tpx_watts) {
            target = Target::Power {
                value: TargetValue::Watts { value: watts },
            };
        }
    }

    let intensity = element.child_text("Intensity").and_then(|raw| {
        let token = raw.to_lowercase();
        let parsed = Intensity::from_token(&token);
        if parsed.is_none() {
            tracing::warn!(intensity = %raw, "Unknown step intensity, dropping");
        }
        parsed
    });

    Ok(WorkoutStep {
        step_index,
        duration,
        target,
        intensity,
        name: element.child_text("Name"),
        notes: None,
        extensions: extensions.map(VendorExtensions::tcx),
    })
}

/// Decode a `Repeat_t` element into a block. Blocks come back without an
/// id; ids are assigned when the workout is loaded for editing.
pub fn decode_repeat(element: &XmlElement) -> Result<RepetitionBlock, TcxError> {
    let raw = element
        .child_text("Repetitions")
        .ok_or_else(|| TcxError::MissingField("Step.Repetitions".to_string()))?;
    let repeat_count: u32 = parse_number("Step.Repetitions", &raw)?;
    if repeat_count == 0 {
        return Err(TcxError::InvalidValue {
            field: "Step.Repetitions".to_string(),
            value: raw,
        });
    }

    let steps = element
        .children_named("Child")
        .enumerate()
        .map(|(i, child)| {
            if child.xsi_type() == Some(REPEAT_TYPE) {
                return Err(TcxError::UnsupportedStructure(
                    "Nested repeat steps are not supported".to_string(),
                ));
            }
            decode_step(child, i as u32)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RepetitionBlock {
        id: None,
        repeat_count,
        steps,
    })
}

/// Encode a step as `<{name} xsi:type="Step_t">` with the given 1-based id.
pub fn encode_step(name: &str, step: &WorkoutStep, step_id: u32) -> XmlElement {
    let mut element = XmlElement::new(name)
        .with_attribute("xsi:type", STEP_TYPE)
        .with_child(XmlElement::text_element("StepId", step_id.to_string()));

    if let Some(step_name) = &step.name {
        element.push_child(XmlElement::text_element("Name", step_name.as_str()));
    }

    element.push_child(encode_duration(&step.duration));

    if let Some(intensity) = step.intensity {
        element.push_child(XmlElement::text_element(
            "Intensity",
            capitalize(intensity.as_str()),
        ));
    }

    element.push_child(encode_target(&step.target));

    if let Some(bag) = step.tcx_extensions() {
        element.push_child(extensions_element(bag));
    } else if let Some(watts) = step.target.power_watts() {
        element.push_child(power_extensions(watts));
    }

    element
}

/// Encode a block as `<Step xsi:type="Repeat_t">`. `next_id` holds the id
/// for the block itself and is advanced past every child.
pub fn encode_repeat(block: &RepetitionBlock, next_id: &mut u32) -> XmlElement {
    let mut element = XmlElement::new("Step")
        .with_attribute("xsi:type", REPEAT_TYPE)
        .with_child(XmlElement::text_element("StepId", next_id.to_string()))
        .with_child(XmlElement::text_element(
            "Repetitions",
            block.repeat_count.to_string(),
        ));
    *next_id += 1;

    for step in &block.steps {
        element.push_child(encode_step("Child", step, *next_id));
        *next_id += 1;
    }

    element
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
