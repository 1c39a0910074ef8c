//! Gemini document model client.
//!
//! Sends the PDF inline with [`EXTRACTION_PROMPT`](crate::core::EXTRACTION_PROMPT)
//! to `generateContent`, forcing a JSON response, and decodes the answer into
//! an [`InvoiceRecord`](crate::core::InvoiceRecord). Also lists available
//! models and checks connectivity.
//!
//! # Example
//!
//! ```ignore
//! use factura_check::core::*;
//! use factura_check::gemini::*;
//!
//! let client = GeminiClient::new(GeminiConfig::load("factura.toml")?)?;
//! client.test_connection().await?;
//!
//! let mut session = Session::new();
//! let report = session.extract_with(&client, &std::fs::read("invoice.pdf")?).await?;
//! for err in &report.errors {
//!     eprintln!("{err}");
//! }
//! ```

mod client;
mod config;
mod wire;

pub use client::{GeminiClient, MAX_MODEL_PAGES, filter_gemini_models};
pub use config::{API_KEY_ENV, GeminiConfig, GenerationSettings};

/// Fallback model list when the provider cannot be asked.
pub const DEFAULT_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
];
