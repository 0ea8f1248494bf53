//! Workout codec and sport mapping.

use crate::krd::structure::reindex;
use crate::krd::types::{Sport, VendorExtensions, Workout, WorkoutEntry};
use crate::tcx::extensions::{capture_extensions, extensions_element};
use crate::tcx::step::{decode_repeat, decode_step, encode_repeat, encode_step, REPEAT_TYPE};
use crate::tcx::types::TcxError;
use crate::xml::XmlElement;

/// KRD sport to TCX `Sport` attribute. `Generic` doubles as the fallback
/// in both directions.
const SPORT_TABLE: [(Sport, &str); 4] = [
    (Sport::Running, "Running"),
    (Sport::Cycling, "Biking"),
    (Sport::Swimming, "Swimming"),
    (Sport::Generic, "Other"),
];

/// Map a TCX sport name to a KRD sport.
pub fn sport_from_tcx(name: &str) -> Sport {
    SPORT_TABLE
        .iter()
        .find(|(_, tcx)| *tcx == name)
        .map(|(sport, _)| *sport)
        .unwrap_or_else(|| {
            tracing::debug!(sport = name, "Unknown TCX sport, using generic");
            Sport::Generic
        })
}

/// Map a KRD sport to its TCX sport name.
pub fn sport_to_tcx(sport: Sport) -> &'static str {
    SPORT_TABLE
        .iter()
        .find(|(s, _)| *s == sport)
        .map(|(_, tcx)| *tcx)
        .unwrap_or("Other")
}

/// TCX sport names the writer can produce.
pub fn tcx_sport_names() -> impl Iterator<Item = &'static str> {
    SPORT_TABLE.iter().map(|(_, tcx)| *tcx)
}

/// Decode a `<Workout>` element.
pub fn decode_workout(element: &XmlElement) -> Result<Workout, TcxError> {
    let sport = element
        .attribute("Sport")
        .map(sport_from_tcx)
        .unwrap_or_default();

    let mut steps = Vec::new();
    for (position, step) in element.children_named("Step").enumerate() {
        let entry = if step.xsi_type() == Some(REPEAT_TYPE) {
            WorkoutEntry::Block(decode_repeat(step)?)
        } else {
            WorkoutEntry::Step(decode_step(step, position as u32)?)
        };
        steps.push(entry);
    }
    reindex(&mut steps);

    Ok(Workout {
        name: element.child_text("Name"),
        sport,
        sub_sport: None,
        steps,
        extensions: capture_extensions(element).map(VendorExtensions::tcx),
    })
}

/// Encode a workout as a `<Workout>` element. StepIds run 1, 2, 3, ... in
/// document order, counting a repeat before its children.
pub fn encode_workout(workout: &Workout) -> XmlElement {
    let mut element = XmlElement::new("Workout").with_attribute("Sport", sport_to_tcx(workout.sport));

    if let Some(name) = &workout.name {
        element.push_child(XmlElement::text_element("Name", name.as_str()));
    }

    let mut next_id = 1u32;
    for entry in &workout.steps {
        match entry {
            WorkoutEntry::Step(step) => {
                element.push_child(encode_step("Step", step, next_id));
                next_id += 1;
            }
            WorkoutEntry::Block(block) => element.push_child(encode_repeat(block, &mut next_id)),
        }
    }

    if let Some(bag) = workout.tcx_extensions() {
        element.push_child(extensions_element(bag));
    }

    element
}
