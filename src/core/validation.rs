use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::amount::{coerce_opt, format_amount};
use super::error::FacturaError;
use super::types::*;

/// Largest absolute discrepancy, in currency units, accepted as rounding noise.
/// Mismatches are flagged only when strictly greater.
pub const TOLERANCE: f64 = 1.0;

/// Cross-check an extracted invoice's arithmetic.
///
/// 1. Sum the line items (see [`LineAmounts::contribution`]) and compare with
///    `totales.subtotal`. A mismatch is a warning.
/// 2. Rebuild the grand total from the extracted subtotal, discount and taxes
///    (see [`ExtractedTotals::expected_total`]) and compare with
///    `totales.total`. A mismatch is an error and marks the report invalid.
///
/// Never fails: a malformed record (e.g. `productos` not an array) stops the
/// checks and is reported as a warning, keeping whatever was computed so far.
pub fn validate_invoice(record: &InvoiceRecord) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Err(e) = run_checks(record, &mut report) {
        warn!(error = %e, "coherence validation aborted");
        report
            .warnings
            .push(format!("could not validate arithmetic: {e}"));
    }

    report
}

fn run_checks(record: &InvoiceRecord, report: &mut ValidationReport) -> Result<(), FacturaError> {
    let line_sum = line_items_subtotal(record.line_items()?)?;
    let totals = ExtractedTotals::from_record(record)?;

    if let Some(message) = check_subtotal(line_sum, totals.subtotal) {
        warn!(line_sum, extracted = totals.subtotal, "subtotal mismatch");
        report.warnings.push(message);
    }

    let expected_total = totals.expected_total();
    report.details = Some(ValidationDetails {
        line_items_subtotal: line_sum,
        extracted_subtotal: totals.subtotal,
        expected_total,
        extracted_total: totals.total,
    });
    debug!(
        line_sum,
        extracted_subtotal = totals.subtotal,
        expected_total,
        extracted_total = totals.total,
        "coherence values"
    );

    if let Some(message) = check_total(expected_total, totals.total) {
        warn!(expected_total, extracted = totals.total, "grand total mismatch");
        report.errors.push(message);
        report.is_valid = false;
    }

    Ok(())
}

/// Whether two amounts differ by more than [`TOLERANCE`].
pub fn exceeds_tolerance(a: f64, b: f64) -> bool {
    (a - b).abs() > TOLERANCE
}

/// Soft check: line item sum against the extracted subtotal.
///
/// Returns the warning text on mismatch.
pub fn check_subtotal(line_sum: f64, extracted_subtotal: f64) -> Option<String> {
    exceeds_tolerance(line_sum, extracted_subtotal).then(|| {
        format!(
            "Subtotal mismatch: sum of line items (${}) vs extracted subtotal (${})",
            format_amount(line_sum),
            format_amount(extracted_subtotal)
        )
    })
}

/// Hard check: reconstructed total against the extracted total.
///
/// Returns the error text on mismatch.
pub fn check_total(expected_total: f64, extracted_total: f64) -> Option<String> {
    exceeds_tolerance(expected_total, extracted_total).then(|| {
        format!(
            "Arithmetic error: (subtotal - discount + taxes - withholdings) = ${}, but the document says ${}",
            format_amount(expected_total),
            format_amount(extracted_total)
        )
    })
}

/// Sum of line amounts, one contribution per item.
///
/// # Errors
///
/// `FacturaError::Shape` if an item is not a JSON object.
pub fn line_items_subtotal(items: &[Value]) -> Result<f64, FacturaError> {
    items.iter().enumerate().try_fold(0.0, |sum, (i, item)| {
        let line = LineAmounts::from_value(item, i)?;
        Ok(sum + line.contribution())
    })
}

/// Coerced monetary fields of one line item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineAmounts {
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub total: f64,
}

impl LineAmounts {
    /// Read the amounts of line item `index`.
    pub fn from_value(item: &Value, index: usize) -> Result<Self, FacturaError> {
        match item {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(FacturaError::shape(
                format!("{}[{index}]", Section::LineItems.key()),
                "an object",
            )),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            quantity: coerce_opt(map.get(line_keys::QUANTITY)),
            unit_price: coerce_opt(map.get(line_keys::UNIT_PRICE)),
            subtotal: coerce_opt(map.get(line_keys::SUBTOTAL)),
            total: coerce_opt(map.get(line_keys::TOTAL)),
        }
    }

    /// Amount this line adds to the aggregate subtotal.
    ///
    /// A positive explicit subtotal wins; otherwise a positive line total is
    /// taken as the pre-tax amount; otherwise quantity × unit price. The
    /// second branch overstates lines whose total includes tax.
    pub fn contribution(&self) -> f64 {
        if self.subtotal > 0.0 {
            self.subtotal
        } else if self.total > 0.0 {
            self.total
        } else {
            self.quantity * self.unit_price
        }
    }
}

/// Coerced monetary fields of the `totales` section; absent fields are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractedTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub other_taxes: f64,
    pub withheld_vat: f64,
    pub withheld_income_tax: f64,
    pub total: f64,
}

impl ExtractedTotals {
    /// Read `totales` from a record; an absent section yields all zeros.
    ///
    /// # Errors
    ///
    /// `FacturaError::Shape` if `totales` is present but not an object.
    pub fn from_record(record: &InvoiceRecord) -> Result<Self, FacturaError> {
        Ok(record
            .object_section(Section::Totals)?
            .map(Self::from_map)
            .unwrap_or_default())
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            subtotal: coerce_opt(map.get(totals_keys::SUBTOTAL)),
            discount: coerce_opt(map.get(totals_keys::DISCOUNT)),
            tax: coerce_opt(map.get(totals_keys::TAX)),
            other_taxes: coerce_opt(map.get(totals_keys::OTHER_TAXES)),
            withheld_vat: coerce_opt(map.get(totals_keys::WITHHELD_VAT)),
            withheld_income_tax: coerce_opt(map.get(totals_keys::WITHHELD_INCOME_TAX)),
            total: coerce_opt(map.get(totals_keys::TOTAL)),
        }
    }

    /// Both withholdings.
    pub fn withheld(&self) -> f64 {
        self.withheld_vat + self.withheld_income_tax
    }

    /// `subtotal - discount + tax + other_taxes - withholdings`.
    ///
    /// Built on the extracted subtotal, the tax base the document itself
    /// states, not on the line item sum.
    pub fn expected_total(&self) -> f64 {
        self.subtotal - self.discount + self.tax + self.other_taxes - self.withheld()
    }
}
