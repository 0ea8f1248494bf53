//! Kaiord - structured workout conversion
//!
//! Converts Garmin Training Center (TCX) workouts to and from the KRD
//! document model. Provides the XML tree codec, the TCX reader/writer
//! pipeline with schema validation, and the repetition-block editing
//! model used on top of KRD workouts.

pub mod config;
pub mod krd;
pub mod logging;
pub mod tcx;
pub mod xml;

// Re-export commonly used types
pub use config::AppConfig;
pub use krd::types::{KrdDocument, Workout, WorkoutEntry, WorkoutStep};
pub use tcx::reader::TcxReader;
pub use tcx::types::TcxError;
pub use tcx::validator::{StructuralValidator, TcxValidator};
pub use tcx::writer::TcxWriter;
