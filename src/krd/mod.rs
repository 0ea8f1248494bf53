//! KRD document model and the editing operations built on it.

pub mod structure;
pub mod types;
pub mod validation;

pub use structure::{
    delete_block, ensure_block_ids, ensure_document_block_ids, flatten_for_display,
    unwrap_block, wrap_steps_in_block, BlockIdGenerator, DisplayBar, Selection, StepRef,
    StructureError, UuidBlockIdGenerator,
};
pub use types::{
    Duration, DurationKind, ExtensionBag, Intensity, KrdDocument, Metadata, RepetitionBlock,
    Sport, Target, TargetKind, TargetValue, Workout, WorkoutEntry, WorkoutStep,
};
pub use validation::{validate_workout, DomainError};
