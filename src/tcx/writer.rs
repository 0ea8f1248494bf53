//! TCX writer: [`KrdDocument`] to validated XML text.

use crate::krd::types::KrdDocument;
use crate::tcx::document::encode_document;
use crate::tcx::types::TcxError;
use crate::tcx::validator::TcxValidator;
use crate::xml::{serialize_xml, XmlWriteOptions};

/// Writes KRD documents as TCX, validating the output before returning it.
pub struct TcxWriter<V: TcxValidator> {
    validator: V,
    options: XmlWriteOptions,
}

impl<V: TcxValidator> TcxWriter<V> {
    /// Create a writer that checks its output with `validator`.
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            options: XmlWriteOptions::default(),
        }
    }

    /// Override output formatting.
    pub fn with_options(mut self, options: XmlWriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Encode, serialize and validate.
    ///
    /// Encoding and serialization failures become [`TcxError::Parsing`]
    /// with the cause attached. A rejected document becomes
    /// [`TcxError::Validation`] carrying every violation.
    pub async fn write(&self, krd: &KrdDocument) -> Result<String, TcxError> {
        tracing::debug!("Encoding KRD to TCX");

        let root = encode_document(krd)
            .map_err(|e| TcxError::parsing_with_cause("Failed to encode KRD to TCX", e))?;

        let xml = serialize_xml(&root, self.options)
            .map_err(|e| TcxError::parsing_with_cause("Failed to serialize TCX XML", e))?;

        let outcome = self.validator.validate(&xml).await;
        if !outcome.valid {
            tracing::warn!(errors = outcome.errors.len(), "Written TCX failed validation");
            return Err(TcxError::Validation {
                errors: outcome.errors,
            });
        }

        tracing::info!(bytes = xml.len(), "TCX document written");
        Ok(xml)
    }
}
