//! Garmin Training Center (TCX) workout support.
//!
//! Reading goes text -> XML tree -> document/workout/step codecs -> KRD.
//! Writing runs the codecs in reverse, serializes the tree and hands the
//! text to a [`TcxValidator`] before returning it.

pub mod document;
pub mod duration;
pub mod extensions;
pub mod reader;
pub mod step;
pub mod target;
pub mod types;
pub mod validator;
pub mod workout;
pub mod writer;

pub use reader::{read_tcx, TcxReader};
pub use types::{TcxError, ValidationIssue, ValidationOutcome};
pub use validator::{StructuralValidator, TcxValidator};
pub use writer::TcxWriter;
