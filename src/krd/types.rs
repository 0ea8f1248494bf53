//! KRD document model.
//!
//! The KRD tree is the normalized form every codec converts to and from.
//! Serialization follows the KRD JSON layout: camelCase keys, `type` as the
//! discriminator of durations and targets, `unit` as the discriminator of
//! target values.

use serde::{Deserialize, Serialize};

use crate::xml::{XmlElement, XmlNode};

/// KRD format version written into every document.
pub const KRD_VERSION: &str = "1.0";

/// Kind of document carried by a KRD file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Workout,
}

/// Top-level KRD document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrdDocument {
    /// Format version (always "1.0")
    pub version: String,
    /// Document kind
    #[serde(rename = "type")]
    pub kind: DocumentType,
    /// File-level metadata
    pub metadata: Metadata,
    /// Structured workout and vendor payloads
    #[serde(default)]
    pub extensions: DocumentExtensions,
}

impl KrdDocument {
    /// Create a workout document.
    pub fn new(metadata: Metadata, workout: Option<Workout>) -> Self {
        Self {
            version: KRD_VERSION.to_string(),
            kind: DocumentType::Workout,
            metadata,
            extensions: DocumentExtensions {
                workout,
                tcx: None,
            },
        }
    }

    /// The structured workout, if the document carries one.
    pub fn workout(&self) -> Option<&Workout> {
        self.extensions.workout.as_ref()
    }
}

/// Document-level extension slots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<Workout>,
    /// Verbatim TCX `Extensions` content from the document root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcx: Option<ExtensionBag>,
}

/// File metadata. Every field is optional and only written when present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Creation time (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// Extension slot shared by workouts and steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VendorExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcx: Option<ExtensionBag>,
}

impl VendorExtensions {
    pub fn tcx(bag: ExtensionBag) -> Self {
        Self { tcx: Some(bag) }
    }
}

/// Opaque vendor XML captured from an `Extensions` element.
///
/// Content is kept in document order and never interpreted, so encoding a
/// decoded bag reproduces the same markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionBag(Vec<XmlNode>);

impl ExtensionBag {
    pub fn new(nodes: Vec<XmlNode>) -> Self {
        Self(nodes)
    }

    pub fn nodes(&self) -> &[XmlNode] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element children matching a local name.
    pub fn elements_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.0.iter().filter_map(move |node| match node {
            XmlNode::Element(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }
}

/// Sport of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Running,
    Cycling,
    Swimming,
    /// Fallback for anything unrecognized
    #[default]
    #[serde(other)]
    Generic,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Running => "running",
            Sport::Cycling => "cycling",
            Sport::Swimming => "swimming",
            Sport::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sport refinement. Not representable in TCX; carried only in KRD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubSport {
    Treadmill,
    Street,
    Trail,
    Track,
    Road,
    Mountain,
    IndoorCycling,
    LapSwimming,
    OpenWater,
    #[serde(other)]
    Generic,
}

/// Step intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Warmup,
    Active,
    Cooldown,
    Rest,
    Resting,
    Recovery,
    Interval,
    Other,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Warmup => "warmup",
            Intensity::Active => "active",
            Intensity::Cooldown => "cooldown",
            Intensity::Rest => "rest",
            Intensity::Resting => "resting",
            Intensity::Recovery => "recovery",
            Intensity::Interval => "interval",
            Intensity::Other => "other",
        }
    }

    /// Parse a lowercase token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "warmup" => Some(Intensity::Warmup),
            "active" => Some(Intensity::Active),
            "cooldown" => Some(Intensity::Cooldown),
            "rest" => Some(Intensity::Rest),
            "resting" => Some(Intensity::Resting),
            "recovery" => Some(Intensity::Recovery),
            "interval" => Some(Intensity::Interval),
            "other" => Some(Intensity::Other),
            _ => None,
        }
    }
}

/// Discriminator of [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationKind {
    Time,
    Distance,
    Open,
    HeartRateLessThan,
    PowerLessThan,
    PowerGreaterThan,
    Calories,
    RepeatUntilTime,
    RepeatUntilDistance,
    RepeatUntilCalories,
    RepeatUntilHeartRateGreaterThan,
    RepeatUntilHeartRateLessThan,
    RepeatUntilPowerLessThan,
    RepeatUntilPowerGreaterThan,
}

impl DurationKind {
    pub const ALL: [DurationKind; 14] = [
        DurationKind::Time,
        DurationKind::Distance,
        DurationKind::Open,
        DurationKind::HeartRateLessThan,
        DurationKind::PowerLessThan,
        DurationKind::PowerGreaterThan,
        DurationKind::Calories,
        DurationKind::RepeatUntilTime,
        DurationKind::RepeatUntilDistance,
        DurationKind::RepeatUntilCalories,
        DurationKind::RepeatUntilHeartRateGreaterThan,
        DurationKind::RepeatUntilHeartRateLessThan,
        DurationKind::RepeatUntilPowerLessThan,
        DurationKind::RepeatUntilPowerGreaterThan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationKind::Time => "time",
            DurationKind::Distance => "distance",
            DurationKind::Open => "open",
            DurationKind::HeartRateLessThan => "heart_rate_less_than",
            DurationKind::PowerLessThan => "power_less_than",
            DurationKind::PowerGreaterThan => "power_greater_than",
            DurationKind::Calories => "calories",
            DurationKind::RepeatUntilTime => "repeat_until_time",
            DurationKind::RepeatUntilDistance => "repeat_until_distance",
            DurationKind::RepeatUntilCalories => "repeat_until_calories",
            DurationKind::RepeatUntilHeartRateGreaterThan => "repeat_until_heart_rate_greater_than",
            DurationKind::RepeatUntilHeartRateLessThan => "repeat_until_heart_rate_less_than",
            DurationKind::RepeatUntilPowerLessThan => "repeat_until_power_less_than",
            DurationKind::RepeatUntilPowerGreaterThan => "repeat_until_power_greater_than",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }
}

impl std::fmt::Display for DurationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How long a step lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Duration {
    Time {
        seconds: f64,
    },
    Distance {
        meters: f64,
    },
    /// Ends on lap button press
    Open,
    HeartRateLessThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bpm: Option<u32>,
    },
    PowerLessThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watts: Option<u32>,
    },
    PowerGreaterThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watts: Option<u32>,
    },
    Calories {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        calories: Option<u32>,
    },
    RepeatUntilTime {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<f64>,
        repeat_from: u32,
    },
    RepeatUntilDistance {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meters: Option<f64>,
        repeat_from: u32,
    },
    RepeatUntilCalories {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        calories: Option<u32>,
        repeat_from: u32,
    },
    RepeatUntilHeartRateGreaterThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bpm: Option<u32>,
        repeat_from: u32,
    },
    RepeatUntilHeartRateLessThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bpm: Option<u32>,
        repeat_from: u32,
    },
    RepeatUntilPowerLessThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watts: Option<u32>,
        repeat_from: u32,
    },
    RepeatUntilPowerGreaterThan {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watts: Option<u32>,
        repeat_from: u32,
    },
}

impl Duration {
    pub fn kind(&self) -> DurationKind {
        match self {
            Duration::Time { .. } => DurationKind::Time,
            Duration::Distance { .. } => DurationKind::Distance,
            Duration::Open => DurationKind::Open,
            Duration::HeartRateLessThan { .. } => DurationKind::HeartRateLessThan,
            Duration::PowerLessThan { .. } => DurationKind::PowerLessThan,
            Duration::PowerGreaterThan { .. } => DurationKind::PowerGreaterThan,
            Duration::Calories { .. } => DurationKind::Calories,
            Duration::RepeatUntilTime { .. } => DurationKind::RepeatUntilTime,
            Duration::RepeatUntilDistance { .. } => DurationKind::RepeatUntilDistance,
            Duration::RepeatUntilCalories { .. } => DurationKind::RepeatUntilCalories,
            Duration::RepeatUntilHeartRateGreaterThan { .. } => {
                DurationKind::RepeatUntilHeartRateGreaterThan
            }
            Duration::RepeatUntilHeartRateLessThan { .. } => {
                DurationKind::RepeatUntilHeartRateLessThan
            }
            Duration::RepeatUntilPowerLessThan { .. } => DurationKind::RepeatUntilPowerLessThan,
            Duration::RepeatUntilPowerGreaterThan { .. } => {
                DurationKind::RepeatUntilPowerGreaterThan
            }
        }
    }

    /// Step index a repeat-until duration loops back to.
    pub fn repeat_from(&self) -> Option<u32> {
        match self {
            Duration::RepeatUntilTime { repeat_from, .. }
            | Duration::RepeatUntilDistance { repeat_from, .. }
            | Duration::RepeatUntilCalories { repeat_from, .. }
            | Duration::RepeatUntilHeartRateGreaterThan { repeat_from, .. }
            | Duration::RepeatUntilHeartRateLessThan { repeat_from, .. }
            | Duration::RepeatUntilPowerLessThan { repeat_from, .. }
            | Duration::RepeatUntilPowerGreaterThan { repeat_from, .. } => Some(*repeat_from),
            _ => None,
        }
    }
}

/// Discriminator of [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Open,
    HeartRate,
    Power,
    Pace,
    Cadence,
    StrokeType,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Open => "open",
            TargetKind::HeartRate => "heart_rate",
            TargetKind::Power => "power",
            TargetKind::Pace => "pace",
            TargetKind::Cadence => "cadence",
            TargetKind::StrokeType => "stroke_type",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Swim stroke for stroke-type targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stroke {
    Any,
    Freestyle,
    Backstroke,
    Breaststroke,
    Butterfly,
    Drill,
    Mixed,
    Im,
}

/// Intensity goal of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Open,
    HeartRate { value: TargetValue },
    Power { value: TargetValue },
    Pace { value: TargetValue },
    Cadence { value: TargetValue },
    /// Swimming only
    StrokeType { stroke: Stroke },
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Open => TargetKind::Open,
            Target::HeartRate { .. } => TargetKind::HeartRate,
            Target::Power { .. } => TargetKind::Power,
            Target::Pace { .. } => TargetKind::Pace,
            Target::Cadence { .. } => TargetKind::Cadence,
            Target::StrokeType { .. } => TargetKind::StrokeType,
        }
    }

    /// Absolute wattage of a `power` target expressed in watts.
    pub fn power_watts(&self) -> Option<f64> {
        match self {
            Target::Power {
                value: TargetValue::Watts { value },
            } => Some(*value),
            _ => None,
        }
    }
}

/// Value of a heart-rate, power, pace or cadence target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum TargetValue {
    Zone { value: u8 },
    Bpm { value: f64 },
    Watts { value: f64 },
    Mps { value: f64 },
    Rpm { value: f64 },
    PercentFtp { value: f64 },
    PercentMax { value: f64 },
    Range { min: f64, max: f64 },
}

/// A single leaf step.
///
/// `durationType` and `targetType` are derived from the payloads rather
/// than stored, so they can never disagree with `duration.type` and
/// `target.type`. They are still written to KRD JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WorkoutStepRecord", into = "WorkoutStepRecord")]
pub struct WorkoutStep {
    /// Position among sibling steps (0-based)
    pub step_index: u32,
    pub duration: Duration,
    pub target: Target,
    pub intensity: Option<Intensity>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub extensions: Option<VendorExtensions>,
}

impl WorkoutStep {
    pub fn new(step_index: u32, duration: Duration, target: Target) -> Self {
        Self {
            step_index,
            duration,
            target,
            intensity: None,
            name: None,
            notes: None,
            extensions: None,
        }
    }

    pub fn duration_type(&self) -> DurationKind {
        self.duration.kind()
    }

    pub fn target_type(&self) -> TargetKind {
        self.target.kind()
    }

    /// Stored TCX extension content, if any.
    pub fn tcx_extensions(&self) -> Option<&ExtensionBag> {
        self.extensions.as_ref().and_then(|e| e.tcx.as_ref())
    }
}

/// Wire shape of a step, carrying the denormalized type fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutStepRecord {
    step_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_type: Option<DurationKind>,
    duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_type: Option<TargetKind>,
    target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intensity: Option<Intensity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<VendorExtensions>,
}

impl From<WorkoutStepRecord> for WorkoutStep {
    fn from(record: WorkoutStepRecord) -> Self {
        Self {
            step_index: record.step_index,
            duration: record.duration,
            target: record.target,
            intensity: record.intensity,
            name: record.name,
            notes: record.notes,
            extensions: record.extensions,
        }
    }
}

impl From<WorkoutStep> for WorkoutStepRecord {
    fn from(step: WorkoutStep) -> Self {
        Self {
            step_index: step.step_index,
            duration_type: Some(step.duration.kind()),
            duration: step.duration,
            target_type: Some(step.target.kind()),
            target: step.target,
            intensity: step.intensity,
            name: step.name,
            notes: step.notes,
            extensions: step.extensions,
        }
    }
}

/// "Repeat these steps N times". Blocks never nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepetitionBlock {
    /// Stable identity; never changes once assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub repeat_count: u32,
    pub steps: Vec<WorkoutStep>,
}

/// An entry of a workout's step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkoutEntry {
    Block(RepetitionBlock),
    Step(WorkoutStep),
}

impl WorkoutEntry {
    pub fn as_step(&self) -> Option<&WorkoutStep> {
        match self {
            WorkoutEntry::Step(step) => Some(step),
            WorkoutEntry::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&RepetitionBlock> {
        match self {
            WorkoutEntry::Block(block) => Some(block),
            WorkoutEntry::Step(_) => None,
        }
    }
}

/// A structured workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub sport: Sport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_sport: Option<SubSport>,
    /// Ordered mix of steps and repetition blocks
    #[serde(default)]
    pub steps: Vec<WorkoutEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<VendorExtensions>,
}

impl Workout {
    pub fn new(sport: Sport, steps: Vec<WorkoutEntry>) -> Self {
        Self {
            name: None,
            sport,
            sub_sport: None,
            steps,
            extensions: None,
        }
    }

    /// Top-level leaf steps, skipping blocks.
    pub fn top_level_steps(&self) -> impl Iterator<Item = &WorkoutStep> {
        self.steps.iter().filter_map(WorkoutEntry::as_step)
    }

    /// Repetition blocks in list order.
    pub fn blocks(&self) -> impl Iterator<Item = &RepetitionBlock> {
        self.steps.iter().filter_map(WorkoutEntry::as_block)
    }

    pub fn tcx_extensions(&self) -> Option<&ExtensionBag> {
        self.extensions.as_ref().and_then(|e| e.tcx.as_ref())
    }
}
