#![no_main]

use factura_check::core::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(record) = InvoiceRecord::from_value(value) else {
        return;
    };
    let first = validate_invoice(&record);
    let second = validate_invoice(&record);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
    assert!(first.errors.len() <= 1);
    let _ = to_pretty_json(&record);
});
