//! Output validation for written TCX.
//!
//! The writer accepts any [`TcxValidator`]. [`StructuralValidator`] checks
//! well-formedness and the parts of the Training Center schema the writer
//! produces; a full XSD validator can be plugged in behind the same trait.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::tcx::step::{REPEAT_TYPE, STEP_TYPE};
use crate::tcx::types::{ValidationIssue, ValidationOutcome, NS_TCX, ROOT_ELEMENT};
use crate::tcx::workout::tcx_sport_names;
use crate::xml::{parse_xml, XmlElement};

/// Checks TCX text against the schema.
#[async_trait]
pub trait TcxValidator: Send + Sync {
    async fn validate(&self, xml: &str) -> ValidationOutcome;
}

const DURATION_TYPES: [&str; 7] = [
    "Time_t",
    "Distance_t",
    "LapButton_t",
    "UserInitiated_t",
    "HeartRateAbove_t",
    "HeartRateBelow_t",
    "CaloriesBurned_t",
];

const TARGET_TYPES: [&str; 4] = ["None_t", "HeartRate_t", "Speed_t", "Cadence_t"];

const MAX_WORKOUT_NAME_LEN: usize = 15;

/// Well-formedness plus structural schema checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`TcxValidator::validate`].
    pub fn check(&self, xml: &str) -> ValidationOutcome {
        let root = match parse_xml(xml) {
            Ok(root) => root,
            Err(e) => {
                return ValidationOutcome::from_issues(vec![ValidationIssue::new(
                    "document",
                    e.to_string(),
                )])
            }
        };

        let mut issues = Vec::new();
        check_root(&root, &mut issues);
        ValidationOutcome::from_issues(issues)
    }
}

#[async_trait]
impl TcxValidator for StructuralValidator {
    async fn validate(&self, xml: &str) -> ValidationOutcome {
        self.check(xml)
    }
}

fn check_root(root: &XmlElement, issues: &mut Vec<ValidationIssue>) {
    if root.local_name() != ROOT_ELEMENT {
        issues.push(ValidationIssue::new(
            root.name.as_str(),
            format!("Root element must be {}", ROOT_ELEMENT),
        ));
        return;
    }

    if root.attribute("xmlns") != Some(NS_TCX) {
        issues.push(ValidationIssue::new(
            ROOT_ELEMENT,
            format!("Default namespace must be {}", NS_TCX),
        ));
    }

    let workouts: Vec<&XmlElement> = root
        .children_named("Workouts")
        .flat_map(|list| list.children_named("Workout"))
        .collect();
    if workouts.is_empty() {
        issues.push(ValidationIssue::new(
            "Workouts",
            "Document must contain at least one Workout",
        ));
    }

    for (i, workout) in workouts.into_iter().enumerate() {
        check_workout(&format!("Workouts.Workout[{}]", i), workout, issues);
    }
}

fn check_workout(path: &str, workout: &XmlElement, issues: &mut Vec<ValidationIssue>) {
    match workout.attribute("Sport") {
        Some(sport) if tcx_sport_names().any(|name| name == sport) => {}
        Some(sport) => issues.push(ValidationIssue::new(
            format!("{}.Sport", path),
            format!("Unknown sport '{}'", sport),
        )),
        None => issues.push(ValidationIssue::new(
            format!("{}.Sport", path),
            "Missing Sport attribute",
        )),
    }

    if let Some(name) = workout.child_text("Name") {
        if name.chars().count() > MAX_WORKOUT_NAME_LEN {
            issues.push(ValidationIssue::new(
                format!("{}.Name", path),
                format!(
                    "Workout name '{}' exceeds {} characters",
                    name, MAX_WORKOUT_NAME_LEN
                ),
            ));
        }
    }

    let steps: Vec<&XmlElement> = workout.children_named("Step").collect();
    if steps.is_empty() {
        issues.push(ValidationIssue::new(
            path,
            "Workout must contain at least one Step",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (i, step) in steps.into_iter().enumerate() {
        let step_path = format!("{}.Step[{}]", path, i);
        check_step(&step_path, step, &mut seen_ids, issues);
    }
}

fn check_step(
    path: &str,
    step: &XmlElement,
    seen_ids: &mut HashSet<u32>,
    issues: &mut Vec<ValidationIssue>,
) {
    match step.child_text("StepId").map(|raw| raw.parse::<u32>()) {
        Some(Ok(id)) if id >= 1 => {
            if !seen_ids.insert(id) {
                issues.push(ValidationIssue::new(
                    format!("{}.StepId", path),
                    format!("Duplicate StepId {}", id),
                ));
            }
        }
        Some(_) => issues.push(ValidationIssue::new(
            format!("{}.StepId", path),
            "StepId must be a positive integer",
        )),
        None => issues.push(ValidationIssue::new(
            format!("{}.StepId", path),
            "Missing StepId",
        )),
    }

    match step.xsi_type() {
        Some(STEP_TYPE) => check_step_body(path, step, issues),
        Some(REPEAT_TYPE) => {
            match step.child_text("Repetitions").map(|raw| raw.parse::<u32>()) {
                Some(Ok(count)) if count >= 1 => {}
                _ => issues.push(ValidationIssue::new(
                    format!("{}.Repetitions", path),
                    "Repetitions must be a positive integer",
                )),
            }
            let children: Vec<&XmlElement> = step.children_named("Child").collect();
            if children.is_empty() {
                issues.push(ValidationIssue::new(
                    path,
                    "Repeat must contain at least one Child",
                ));
            }
            for (i, child) in children.into_iter().enumerate() {
                check_step(&format!("{}.Child[{}]", path, i), child, seen_ids, issues);
            }
        }
        other => issues.push(ValidationIssue::new(
            format!("{}.type", path),
            format!("Unknown step type {:?}", other.unwrap_or_default()),
        )),
    }
}

fn check_step_body(path: &str, step: &XmlElement, issues: &mut Vec<ValidationIssue>) {
    match step.child("Duration").map(XmlElement::xsi_type) {
        Some(Some(kind)) if DURATION_TYPES.contains(&kind) => {}
        Some(_) => issues.push(ValidationIssue::new(
            format!("{}.Duration", path),
            "Unknown duration type",
        )),
        None => issues.push(ValidationIssue::new(
            format!("{}.Duration", path),
            "Missing Duration",
        )),
    }

    match step.child("Target").map(XmlElement::xsi_type) {
        Some(Some(kind)) if TARGET_TYPES.contains(&kind) => {}
        Some(_) => issues.push(ValidationIssue::new(
            format!("{}.Target", path),
            "Unknown target type",
        )),
        None => issues.push(ValidationIssue::new(
            format!("{}.Target", path),
            "Missing Target",
        )),
    }
}
