//! Session lifecycle: extraction, in-place edits with re-validation, reset,
//! summary and export.

use std::future::{Future, ready};

use factura_check::core::*;
use serde_json::json;

/// Extractor that answers with a fixed model response.
struct CannedExtractor {
    response: String,
}

impl CannedExtractor {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl InvoiceExtractor for CannedExtractor {
    fn extract(
        &self,
        pdf: &[u8],
        prompt: &str,
    ) -> impl Future<Output = Result<InvoiceRecord, FacturaError>> + Send {
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(prompt, EXTRACTION_PROMPT);
        ready(parse_extraction_response(&self.response))
    }
}

/// Extractor whose provider call always fails.
struct FailingExtractor;

impl InvoiceExtractor for FailingExtractor {
    fn extract(
        &self,
        _pdf: &[u8],
        _prompt: &str,
    ) -> impl Future<Output = Result<InvoiceRecord, FacturaError>> + Send {
        ready(Err(FacturaError::Api {
            status: 429,
            body: "quota exceeded".into(),
        }))
    }
}

const PDF: &[u8] = b"%PDF-1.7\n%fake";

const MODEL_RESPONSE: &str = r#"```json
{
  "vendedor": { "nombre": "Ferretería El Martillo", "rfc_tax_id": "FEM010101AAA" },
  "detalles_factura": { "numero": "FM/2025/0042", "fecha_emision": "2025-02-14", "moneda": "MXN" },
  "productos": [
    { "descripcion": "Martillo", "cantidad": 2, "precio_unitario": 250.0, "subtotal": 500.0 },
    { "descripcion": "Clavos (caja)", "cantidad": 5, "precio_unitario": 100.0, "total": 500.0 }
  ],
  "totales": { "subtotal": 1000.0, "iva": 160.0, "total": 1150.0 }
}
```"#;

fn sample_record() -> InvoiceRecord {
    InvoiceRecordBuilder::new()
        .number("A-1")
        .add_line(LineItemBuilder::new("Servicio").quantity(1).unit_price(100).build())
        .totals(TotalsBuilder::new().subtotal(100).tax(16).total(116).build())
        .build()
}

#[tokio::test]
async fn extract_loads_and_validates() {
    let mut session = Session::new();
    let report = session
        .extract_with(&CannedExtractor::new(MODEL_RESPONSE), PDF)
        .await
        .unwrap();

    // 1000 + 160 = 1160 but the document says 1150
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.warnings.is_empty());

    assert!(session.is_loaded());
    assert!(session.extracted_at().is_some());
    let record = session.record().unwrap();
    assert!(record.is_normalized());
    assert_eq!(record.invoice_number(), Some("FM/2025/0042"));
}

#[tokio::test]
async fn failed_extraction_keeps_previous_state() {
    let mut session = Session::new();
    session.load_extraction(sample_record());

    let err = session.extract_with(&FailingExtractor, PDF).await.unwrap_err();
    assert!(matches!(err, FacturaError::Api { status: 429, .. }));
    assert_eq!(session.record().unwrap().invoice_number(), Some("A-1"));
}

#[tokio::test]
async fn malformed_model_output_is_an_error() {
    let mut session = Session::new();
    let err = session
        .extract_with(&CannedExtractor::new("Sorry, I cannot read this file."), PDF)
        .await
        .unwrap_err();
    assert!(matches!(err, FacturaError::Json(_)));
    assert!(!session.is_loaded());
}

#[test]
fn edit_revalidates() {
    let mut session = Session::new();
    assert!(session.load_extraction(sample_record()).is_clean());

    session
        .edit(|record| record.set_field(Section::Totals, "total", 150.0))
        .unwrap()
        .unwrap();
    let report = session.report().unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);

    session
        .edit(|record| record.set_field(Section::Totals, "total", 116.0))
        .unwrap()
        .unwrap();
    assert!(session.report().unwrap().is_clean());
}

#[test]
fn edit_adding_line_item_triggers_subtotal_warning() {
    let mut session = Session::new();
    session.load_extraction(sample_record());

    session.edit(|record| {
        record
            .line_items_mut()
            .unwrap()
            .push(json!({ "descripcion": "Extra", "subtotal": 40 }));
    });
    let report = session.report().unwrap();
    assert!(report.is_valid);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn edit_restores_removed_sections() {
    let mut session = Session::new();
    session.load_extraction(sample_record());

    session.edit(|record| {
        record.as_map_mut().remove("comprador");
    });
    assert!(session.record().unwrap().is_normalized());
}

#[test]
fn reset_clears_everything() {
    let mut session = Session::new();
    session.load_extraction(sample_record());
    session.reset();

    assert!(!session.is_loaded());
    assert!(session.record().is_none());
    assert!(session.report().is_none());
    assert!(session.summary().is_none());
    assert!(session.export_file_name().is_none());
}

#[test]
fn summary_and_export() {
    let mut session = Session::new();
    session.load_extraction(parse_extraction_response(MODEL_RESPONSE).unwrap());

    let summary = session.summary().unwrap();
    assert_eq!(summary.number, "FM/2025/0042");
    assert_eq!(summary.product_count, 2);
    assert_eq!(summary.total, 1150.0);
    assert_eq!(summary.currency, "MXN");
    assert_eq!(
        summary.issue_date,
        chrono::NaiveDate::from_ymd_opt(2025, 2, 14)
    );

    assert_eq!(
        session.export_file_name().as_deref(),
        Some("factura_FM_2025_0042.json")
    );
    let json = session.export_json().unwrap();
    assert!(json.contains("Ferretería El Martillo"));
}

#[test]
fn reload_replaces_record() {
    let mut session = Session::new();
    session.load_extraction(sample_record());
    session.load_extraction(InvoiceRecordBuilder::new().number("B-2").build());
    assert_eq!(session.summary().unwrap().number, "B-2");
}
