//! Core invoice record model, coherence validation, session state and export.
//!
//! The record mirrors the JSON the extraction prompt asks for. Validation
//! cross-checks line items against totals and reports mismatches as data;
//! it never fails.

pub mod amount;
mod builder;
mod error;
mod export;
mod extractor;
mod session;
mod types;
mod validation;

pub use amount::{coerce_amount, format_amount};
pub use builder::*;
pub use error::*;
pub use export::*;
pub use extractor::*;
pub use session::*;
pub use types::*;
pub use validation::*;
