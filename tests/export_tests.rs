//! JSON export: formatting, Unicode, key order, file naming, writing.

use factura_check::core::*;
use serde_json::{Value, json};

#[test]
fn unicode_is_preserved_not_escaped() {
    let record = InvoiceRecordBuilder::new()
        .seller_name("Panadería Ñandú")
        .notes("Pago en efectivo, ¡gracias!")
        .build();
    let out = to_pretty_json(&record).unwrap();
    assert!(out.contains("Panadería Ñandú"));
    assert!(out.contains("efectivo, ¡gracias!"));
    assert!(!out.contains("\\u"));
}

#[test]
fn export_keeps_model_key_order() {
    let record = parse_extraction_response(
        r#"{"totales": {"total": 1}, "vendedor": {}, "productos": [], "zeta": 1, "alfa": 2}"#,
    )
    .unwrap();
    let out = to_pretty_json(&record).unwrap();
    let pos = |key: &str| out.find(&format!("\"{key}\"")).unwrap();
    assert!(pos("totales") < pos("vendedor"));
    assert!(pos("zeta") < pos("alfa"));
}

#[test]
fn export_round_trips_unknown_fields() {
    let original = json!({
        "vendedor": { "nombre": "ACME", "extra": [1, 2, 3] },
        "comprador": {},
        "detalles_factura": { "numero": "X-1", "tipo_cambio": 17.25 },
        "productos": [ { "clave": "SKU-1", "cantidad": 1.5 } ],
        "totales": { "total": "1,000.00" },
        "metadata": { "pages": 2 }
    });
    let record = InvoiceRecord::from_value(original.clone()).unwrap();
    let back: Value = serde_json::from_str(&to_pretty_json(&record).unwrap()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn pretty_output_shape() {
    let record = InvoiceRecordBuilder::new().number("7").build();
    let out = to_pretty_json(&record).unwrap();
    insta::assert_snapshot!(out, @r#"
    {
        "vendedor": {},
        "comprador": {},
        "detalles_factura": {
            "numero": "7"
        },
        "productos": [],
        "totales": {}
    }
    "#);
}

#[test]
fn write_json_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let record = InvoiceRecordBuilder::new().number("F/1").build();
    let path = dir.path().join(export_file_name(&record));
    write_json(&record, &path).unwrap();

    assert!(path.ends_with("factura_F_1.json"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_pretty_json(&record).unwrap());
}

#[test]
fn write_json_reports_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.json");
    let err = write_json(&InvoiceRecord::new(), &path).unwrap_err();
    assert!(matches!(err, FacturaError::Io(_)));
}
