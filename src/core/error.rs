use thiserror::Error;

/// Errors that can occur while extracting, decoding or exporting an invoice.
///
/// The coherence validator never returns these to its caller; it folds them
/// into a warning on the [`ValidationReport`](super::ValidationReport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacturaError {
    /// A record section has the wrong JSON shape (e.g. `productos` is not an array).
    #[error("unexpected shape for '{field}': expected {expected}")]
    Shape {
        /// Dot-separated path to the offending field (e.g. "productos[2]").
        field: String,
        /// What the field should have been.
        expected: &'static str,
    },

    /// The model response was not valid JSON, or a record failed to serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model response decoded, but not to a JSON object.
    #[error("model response is not a JSON object")]
    NotAnObject,

    /// Reading or writing an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The AI provider answered with a non-success status.
    #[error("API error (HTTP {status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the provider.
        body: String,
    },

    /// The provider's responses do not follow its protocol (e.g. a model
    /// listing whose page tokens loop).
    #[error("unexpected provider response: {0}")]
    Protocol(String),

    /// The AI provider answered without any usable text.
    #[error("empty response from model")]
    EmptyResponse,

    /// The session holds no extracted invoice.
    #[error("no invoice loaded")]
    NoInvoiceLoaded,

    /// Any other extraction failure reported by an [`InvoiceExtractor`](super::InvoiceExtractor).
    #[error("extraction failed: {0}")]
    Extraction(String),
}

impl FacturaError {
    /// Shape error for `field`.
    pub fn shape(field: impl Into<String>, expected: &'static str) -> Self {
        Self::Shape {
            field: field.into(),
            expected,
        }
    }
}
