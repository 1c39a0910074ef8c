#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse errors are fine, panics are bugs.
        if let Ok(record) = factura_check::core::parse_extraction_response(s) {
            let report = factura_check::core::validate_invoice(&record);
            assert_eq!(report.is_valid, report.errors.is_empty());
        }
    }
});
