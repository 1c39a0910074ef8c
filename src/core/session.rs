use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use super::amount::coerce_opt;
use super::error::FacturaError;
use super::export;
use super::extractor::{EXTRACTION_PROMPT, InvoiceExtractor};
use super::types::*;
use super::validation::validate_invoice;

/// Currency assumed when the record does not name one.
pub const DEFAULT_CURRENCY: &str = "MXN";

/// Day formats tried, in order, when reading `fecha_emision`.
const ISSUE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// An extracted invoice held by a [`Session`], with its latest report.
#[derive(Debug, Clone)]
pub struct LoadedInvoice {
    pub record: InvoiceRecord,
    pub report: ValidationReport,
    pub extracted_at: DateTime<Utc>,
}

/// Application state between extraction, human review and export.
///
/// Created empty, filled by [`load_extraction`](Self::load_extraction) or
/// [`extract_with`](Self::extract_with), edited in place through
/// [`edit`](Self::edit) (which re-runs validation), and emptied by
/// [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct Session {
    current: Option<LoadedInvoice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&LoadedInvoice> {
        self.current.as_ref()
    }

    pub fn record(&self) -> Option<&InvoiceRecord> {
        self.current.as_ref().map(|c| &c.record)
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.current.as_ref().map(|c| &c.report)
    }

    pub fn extracted_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|c| c.extracted_at)
    }

    /// Store a freshly extracted record, replacing any previous one, and
    /// validate it.
    pub fn load_extraction(&mut self, mut record: InvoiceRecord) -> &ValidationReport {
        record.normalize();
        let report = validate_invoice(&record);
        info!(
            is_valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "invoice loaded"
        );
        let loaded = self.current.insert(LoadedInvoice {
            record,
            report,
            extracted_at: Utc::now(),
        });
        &loaded.report
    }

    /// Run `extractor` on `pdf` with [`EXTRACTION_PROMPT`] and load the result.
    ///
    /// On failure the session is left as it was.
    pub async fn extract_with<E: InvoiceExtractor>(
        &mut self,
        extractor: &E,
        pdf: &[u8],
    ) -> Result<&ValidationReport, FacturaError> {
        info!(pdf_bytes = pdf.len(), "extracting invoice");
        let record = extractor.extract(pdf, EXTRACTION_PROMPT).await?;
        Ok(self.load_extraction(record))
    }

    /// Mutate the loaded record, then normalize and re-validate it.
    ///
    /// Returns `None` (without calling `f`) when nothing is loaded.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut InvoiceRecord) -> T) -> Option<T> {
        let current = self.current.as_mut()?;
        let out = f(&mut current.record);
        current.record.normalize();
        current.report = validate_invoice(&current.record);
        Some(out)
    }

    /// Drop the loaded record and its report.
    pub fn reset(&mut self) {
        if self.current.take().is_some() {
            info!("session cleared");
        }
    }

    /// Quick facts about the loaded record.
    pub fn summary(&self) -> Option<InvoiceSummary> {
        self.record().map(InvoiceSummary::from_record)
    }

    /// Pretty JSON of the loaded record.
    pub fn export_json(&self) -> Result<String, FacturaError> {
        let record = self.record().ok_or(FacturaError::NoInvoiceLoaded)?;
        export::to_pretty_json(record)
    }

    /// Download name for the loaded record.
    pub fn export_file_name(&self) -> Option<String> {
        self.record().map(export::export_file_name)
    }
}

/// Headline figures of an invoice record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    /// Invoice number, or `"N/A"`.
    pub number: String,
    /// Number of line items (0 if `productos` is malformed).
    pub product_count: usize,
    /// `totales.total`, else `detalles_factura.total`, coerced.
    pub total: f64,
    /// Currency code, or [`DEFAULT_CURRENCY`].
    pub currency: String,
    /// `fecha_emision` when it reads as a calendar date.
    pub issue_date: Option<NaiveDate>,
}

impl InvoiceSummary {
    pub fn from_record(record: &InvoiceRecord) -> Self {
        let text = |section: Section, key: &str| {
            record
                .field(section, key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let total = record
            .field(Section::Totals, totals_keys::TOTAL)
            .or_else(|| record.field(Section::Details, totals_keys::TOTAL));

        Self {
            number: text(Section::Details, detail_keys::NUMBER)
                .unwrap_or("N/A")
                .to_string(),
            product_count: record.line_items().map(<[_]>::len).unwrap_or(0),
            total: coerce_opt(total),
            currency: text(Section::Details, detail_keys::CURRENCY)
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            issue_date: text(Section::Details, detail_keys::ISSUE_DATE).and_then(parse_issue_date),
        }
    }
}

/// Read a free-text issue date in one of the common day formats.
pub fn parse_issue_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ISSUE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            // ISO timestamps such as "2025-03-01T10:22:00"
            text.get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}
