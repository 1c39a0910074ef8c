//! # factura-check
//!
//! Invoice extraction companion: decode the structured record a generative
//! document model returns for a PDF invoice, keep it in an editable session,
//! cross-check its arithmetic, and export it as JSON for accounting tools.
//!
//! The record stays semi-structured ([`serde_json::Value`]) because model
//! output is partial and loosely typed. Monetary fields are coerced to `f64`
//! on read and never rewritten.
//!
//! ## Quick Start
//!
//! ```rust
//! use factura_check::core::*;
//! use serde_json::json;
//!
//! let record = InvoiceRecord::from_value(json!({
//!     "productos": [
//!         { "descripcion": "Servicio", "cantidad": 2, "precio_unitario": 500 }
//!     ],
//!     "totales": { "subtotal": 1000, "iva": 160, "total": 1160 }
//! }))
//! .unwrap();
//!
//! let report = validate_invoice(&record);
//! assert!(report.is_valid);
//! assert!(report.warnings.is_empty());
//! assert_eq!(report.details.unwrap().expected_total, 1160.0);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Record model, coherence validation, session, JSON export |
//! | `gemini` | Gemini REST client: extraction, model listing, connection test |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "gemini")]
pub mod gemini;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
