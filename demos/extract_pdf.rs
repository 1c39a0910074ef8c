//! Extract an invoice PDF with Gemini, validate it and save the JSON.
//!
//! ```sh
//! export GEMINI_API_KEY=...
//! cargo run --example extract_pdf --features gemini -- invoice.pdf [factura.toml]
//! ```

use std::path::Path;

use factura_check::core::*;
use factura_check::gemini::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let pdf_path = args
        .next()
        .ok_or("usage: extract_pdf <invoice.pdf> [config.toml]")?;
    let config = match args.next() {
        Some(path) => GeminiConfig::load(path)?,
        None => GeminiConfig::default(),
    };

    let client = GeminiClient::new(config)?;
    let reply = client.test_connection().await?;
    info!(model = client.model(), reply = %reply, "connected");

    let pdf = std::fs::read(&pdf_path)?;
    let mut session = Session::new();
    let report = session.extract_with(&client, &pdf).await?;

    for w in &report.warnings {
        println!("WARNING: {w}");
    }
    for e in &report.errors {
        println!("ERROR:   {e}");
    }
    if report.is_clean() {
        println!("Invoice is arithmetically coherent.");
    }

    let record = session.record().ok_or(FacturaError::NoInvoiceLoaded)?;
    let out = Path::new(&pdf_path).with_file_name(export_file_name(record));
    write_json(record, &out)?;
    println!("Saved {}", out.display());
    Ok(())
}
