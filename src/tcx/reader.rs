//! TCX reader: XML text to [`KrdDocument`].

use crate::krd::types::KrdDocument;
use crate::tcx::document::{decode_document, ensure_root};
use crate::tcx::types::TcxError;
use crate::xml::parse_xml;

/// Reads TCX workout files into KRD documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcxReader;

impl TcxReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse TCX text and convert its first workout.
    ///
    /// XML syntax errors and a wrong root element are reported as
    /// [`TcxError::Parsing`]. Decode failures inside the workout keep their
    /// own kind.
    pub fn read(&self, xml: &str) -> Result<KrdDocument, TcxError> {
        tracing::debug!(bytes = xml.len(), "Parsing TCX document");

        let root = parse_xml(xml).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse TCX XML");
            TcxError::parsing_with_cause("Failed to parse TCX XML", e)
        })?;

        ensure_root(&root).map_err(|e| {
            tracing::error!(root = %root.name, "Invalid TCX root element");
            e
        })?;

        let krd = decode_document(&root)?;

        if let Some(workout) = krd.workout() {
            tracing::info!(
                sport = %workout.sport,
                entries = workout.steps.len(),
                "TCX workout converted"
            );
        }

        Ok(krd)
    }
}

/// Read TCX text with a default [`TcxReader`].
pub fn read_tcx(xml: &str) -> Result<KrdDocument, TcxError> {
    TcxReader::new().read(xml)
}
