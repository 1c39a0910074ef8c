use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use super::error::FacturaError;
use super::types::InvoiceRecord;

/// File name used when the record carries no invoice number.
pub const UNNUMBERED_STEM: &str = "sin_numero";

/// Serialize a record as pretty JSON: 4-space indent, non-ASCII kept literal.
pub fn to_pretty_json(record: &InvoiceRecord) -> Result<String, FacturaError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| FacturaError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Download name for a record: `factura_{numero}.json`, with `/` replaced
/// by `_`. Falls back to `factura_sin_numero.json`.
pub fn export_file_name(record: &InvoiceRecord) -> String {
    let stem = record
        .invoice_number()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNNUMBERED_STEM);
    format!("factura_{}.json", stem.replace('/', "_"))
}

/// Write the pretty JSON of `record` to `path`.
pub fn write_json(record: &InvoiceRecord, path: impl AsRef<Path>) -> Result<(), FacturaError> {
    let json = to_pretty_json(record)?;
    fs::write(path.as_ref(), &json)?;
    info!(path = %path.as_ref().display(), bytes = json.len(), "exported invoice JSON");
    Ok(())
}
