use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use factura_check::core::*;

fn build_invoice(lines: usize) -> InvoiceRecord {
    let mut builder = InvoiceRecordBuilder::new()
        .seller_name("Ferretería El Martillo")
        .seller_tax_id("FEM010101AAA")
        .buyer_name("Constructora del Norte")
        .number("BENCH-001")
        .issue_date("2025-02-14")
        .currency("MXN");

    let mut subtotal = 0.0;
    for i in 1..=lines {
        let price = 10.0 + (i % 90) as f64 * 0.25;
        subtotal += 3.0 * price;
        builder = builder.add_line(
            LineItemBuilder::new(format!("Item {i}"))
                .code(format!("SKU-{i:05}"))
                .unit("PZA")
                .quantity(3)
                .unit_price(price)
                .build(),
        );
    }

    let tax = subtotal * 0.16;
    builder
        .totals(
            TotalsBuilder::new()
                .subtotal(subtotal)
                .tax(tax)
                .total(subtotal + tax)
                .build(),
        )
        .build()
}

/// Model-style output: amounts as formatted text, wrapped in a code fence.
fn build_text_response(lines: usize) -> String {
    let items: Vec<_> = (1..=lines)
        .map(|i| {
            json!({
                "descripcion": format!("Item {i}"),
                "cantidad": "2",
                "precio_unitario": "$1,250.00",
            })
        })
        .collect();
    let subtotal = 2500.0 * lines as f64;
    let body = json!({
        "detalles_factura": { "numero": "BENCH-TXT" },
        "productos": items,
        "totales": {
            "subtotal": format!("${}", format_amount(subtotal)),
            "iva": format!("${}", format_amount(subtotal * 0.16)),
            "total": format!("${}", format_amount(subtotal * 1.16)),
        }
    });
    format!("```json\n{body}\n```")
}

// ── Validation ─────────────────────────────────────────────────────

fn bench_validate_10_lines(c: &mut Criterion) {
    let record = build_invoice(10);
    c.bench_function("validate_10_lines", |b| {
        b.iter(|| black_box(validate_invoice(black_box(&record))));
    });
}

fn bench_validate_1000_lines(c: &mut Criterion) {
    let record = build_invoice(1000);
    c.bench_function("validate_1000_lines", |b| {
        b.iter(|| black_box(validate_invoice(black_box(&record))));
    });
}

fn bench_coerce_text_amount(c: &mut Criterion) {
    let value = json!("$1,234,567.89");
    c.bench_function("coerce_text_amount", |b| {
        b.iter(|| black_box(coerce_amount(black_box(&value))));
    });
}

// ── Pipeline ───────────────────────────────────────────────────────

fn bench_parse_and_validate_response(c: &mut Criterion) {
    let response = build_text_response(100);
    c.bench_function("parse_and_validate_100_lines", |b| {
        b.iter(|| {
            let record = parse_extraction_response(black_box(&response)).unwrap();
            black_box(validate_invoice(&record))
        });
    });
}

fn bench_export_1000_lines(c: &mut Criterion) {
    let record = build_invoice(1000);
    c.bench_function("export_json_1000_lines", |b| {
        b.iter(|| black_box(to_pretty_json(black_box(&record))));
    });
}

criterion_group!(
    benches,
    bench_validate_10_lines,
    bench_validate_1000_lines,
    bench_coerce_text_amount,
    bench_parse_and_validate_response,
    bench_export_1000_lines,
);
criterion_main!(benches);
