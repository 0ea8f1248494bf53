//! TCX constants and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Training Center Database namespace.
pub const NS_TCX: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
/// Garmin activity extension namespace (TPX power data).
pub const NS_TPX: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
/// XML Schema instance namespace.
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// Private namespace for data TCX cannot express natively.
pub const NS_KAIORD: &str = "http://kaiord.dev/tcx-extensions/1.0";
pub const SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";

/// Prefix bound to [`NS_TPX`] on the root of written documents.
pub const TPX_PREFIX: &str = "ns3";

/// Prefix bound to [`NS_KAIORD`] in written documents.
pub const KAIORD_PREFIX: &str = "kaiord";

/// Root element name.
pub const ROOT_ELEMENT: &str = "TrainingCenterDatabase";

/// One schema violation reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the offending element or attribute
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validating a TCX document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Valid exactly when `errors` is empty.
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Errors from reading or writing TCX.
#[derive(Debug, Error)]
pub enum TcxError {
    /// Malformed input or a failed pipeline stage
    #[error("{message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Written document does not conform to the schema
    #[error("TCX validation failed: {}", format_issues(.errors))]
    Validation { errors: Vec<ValidationIssue> },

    /// Required element missing while decoding
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Element or attribute with an unusable value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Structure the KRD model cannot hold
    #[error("Unsupported TCX structure: {0}")]
    UnsupportedStructure(String),
}

fn format_issues(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TcxError {
    /// Parsing error with a fixed message and no underlying cause.
    pub fn parsing(message: impl Into<String>) -> Self {
        TcxError::Parsing {
            message: message.into(),
            source: None,
        }
    }

    /// Parsing error wrapping a cause; the cause text is appended to the message.
    pub fn parsing_with_cause<E>(context: &str, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TcxError::Parsing {
            message: format!("{}: {}", context, cause),
            source: Some(Box::new(cause)),
        }
    }

    pub fn is_parsing(&self) -> bool {
        matches!(self, TcxError::Parsing { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TcxError::Validation { .. })
    }

    /// Violations of a validation error; empty for other kinds.
    pub fn validation_errors(&self) -> &[ValidationIssue] {
        match self {
            TcxError::Validation { errors } => errors,
            _ => &[],
        }
    }
}

/// Parse a numeric field, mapping failures to [`TcxError::InvalidValue`].
pub(crate) fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, TcxError> {
    raw.trim().parse().map_err(|_| TcxError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    })
}
