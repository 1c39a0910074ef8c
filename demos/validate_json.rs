//! Validate an extracted invoice stored as JSON (raw model output is fine,
//! code fences included).
//!
//! ```sh
//! cargo run --example validate_json -- factura.json
//! RUST_LOG=debug cargo run --example validate_json -- factura.json
//! ```

use factura_check::core::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: validate_json <invoice.json>")?;
    let text = std::fs::read_to_string(&path)?;

    let mut session = Session::new();
    session.load_extraction(parse_extraction_response(&text)?);

    if let Some(summary) = session.summary() {
        println!("Invoice:   {}", summary.number);
        println!("Products:  {}", summary.product_count);
        println!("Total:     ${} {}", format_amount(summary.total), summary.currency);
        if let Some(date) = summary.issue_date {
            println!("Issued:    {date}");
        }
    }

    let report = session.report().ok_or(FacturaError::NoInvoiceLoaded)?;
    if let Some(d) = &report.details {
        println!("\nLine items subtotal:  ${}", format_amount(d.line_items_subtotal));
        println!("Extracted subtotal:   ${}", format_amount(d.extracted_subtotal));
        println!("Expected total:       ${}", format_amount(d.expected_total));
        println!("Extracted total:      ${}", format_amount(d.extracted_total));
    }

    for w in &report.warnings {
        println!("WARNING: {w}");
    }
    for e in &report.errors {
        println!("ERROR:   {e}");
    }
    if report.is_clean() {
        println!("\nInvoice is arithmetically coherent.");
    }

    if let Some(name) = session.export_file_name() {
        println!("\nExport name: {name}");
    }
    Ok(())
}
