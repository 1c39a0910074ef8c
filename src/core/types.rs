use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FacturaError;

/// Top-level section of an extracted invoice record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `vendedor`: issuing party.
    Seller,
    /// `comprador`: receiving party.
    Buyer,
    /// `detalles_factura`: number, dates, currency and payment terms.
    Details,
    /// `productos`: ordered line items.
    LineItems,
    /// `totales`: document totals.
    Totals,
}

impl Section {
    /// Every section guaranteed present after normalization.
    pub const ALL: [Section; 5] = [
        Self::Seller,
        Self::Buyer,
        Self::Details,
        Self::LineItems,
        Self::Totals,
    ];

    /// JSON key of the section.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Seller => "vendedor",
            Self::Buyer => "comprador",
            Self::Details => "detalles_factura",
            Self::LineItems => "productos",
            Self::Totals => "totales",
        }
    }

    /// Parse from a JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "vendedor" => Some(Self::Seller),
            "comprador" => Some(Self::Buyer),
            "detalles_factura" => Some(Self::Details),
            "productos" => Some(Self::LineItems),
            "totales" => Some(Self::Totals),
            _ => None,
        }
    }

    /// Value inserted when the section is missing.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::LineItems => Value::Array(Vec::new()),
            _ => Value::Object(Map::new()),
        }
    }
}

/// Keys of a line item (`productos[n]`).
pub mod line_keys {
    /// Seller SKU / product code (text).
    pub const CODE: &str = "clave";
    /// Item description (text).
    pub const DESCRIPTION: &str = "descripcion";
    /// Unit of measure (text).
    pub const UNIT: &str = "unidad";
    /// Invoiced quantity.
    pub const QUANTITY: &str = "cantidad";
    /// Net unit price.
    pub const UNIT_PRICE: &str = "precio_unitario";
    /// Line discount.
    pub const DISCOUNT: &str = "descuento";
    /// Pre-tax line amount.
    pub const SUBTOTAL: &str = "subtotal";
    /// Line tax.
    pub const TAX: &str = "impuestos";
    /// Line amount; may or may not include tax.
    pub const TOTAL: &str = "total";
}

/// Keys of the `totales` section.
pub mod totals_keys {
    /// Pre-tax document subtotal (the certified tax base).
    pub const SUBTOTAL: &str = "subtotal";
    /// Document-level discount.
    pub const DISCOUNT: &str = "descuento";
    /// Subtotal after discount (informational).
    pub const SUBTOTAL_AFTER_DISCOUNT: &str = "subtotal_con_descuento";
    /// VAT charged.
    pub const TAX: &str = "iva";
    /// VAT withheld by the buyer.
    pub const WITHHELD_VAT: &str = "iva_retenido";
    /// Income tax withheld by the buyer.
    pub const WITHHELD_INCOME_TAX: &str = "isr_retenido";
    /// Any other taxes added to the total.
    pub const OTHER_TAXES: &str = "otros_impuestos";
    /// Grand total payable.
    pub const TOTAL: &str = "total";
    /// Grand total spelled out (text).
    pub const TOTAL_IN_WORDS: &str = "total_letra";
}

/// Keys of the `detalles_factura` section.
pub mod detail_keys {
    /// Invoice number.
    pub const NUMBER: &str = "numero";
    /// Invoice series.
    pub const SERIES: &str = "serie";
    /// Fiscal folio / UUID.
    pub const FISCAL_FOLIO: &str = "folio_fiscal";
    /// Issue date (free text, usually ISO or day-first).
    pub const ISSUE_DATE: &str = "fecha_emision";
    /// Due date (free text).
    pub const DUE_DATE: &str = "fecha_vencimiento";
    /// Currency code.
    pub const CURRENCY: &str = "moneda";
    /// Exchange rate.
    pub const EXCHANGE_RATE: &str = "tipo_cambio";
}

/// Free-text observations key.
pub const OBSERVATIONS_KEY: &str = "observaciones";
/// Free-text notes key.
pub const NOTES_KEY: &str = "notas";

/// An extracted invoice: a JSON object with the sections of [`Section`]
/// plus free-text notes. Unknown keys are carried through unchanged.
///
/// Field values stay loosely typed; read amounts through
/// [`coerce_amount`](super::coerce_amount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceRecord(Map<String, Value>);

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceRecord {
    /// Empty record with every section present.
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    /// Wrap a JSON object, inserting missing sections.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut record = Self(map);
        record.normalize();
        record
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, FacturaError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(FacturaError::NotAnObject),
        }
    }

    /// Insert every missing top-level section: `{}`, or `[]` for line items.
    ///
    /// Sections that are present keep their value, even when it has the
    /// wrong shape; validation reports those.
    pub fn normalize(&mut self) {
        for section in Section::ALL {
            self.0
                .entry(section.key())
                .or_insert_with(|| section.empty_value());
        }
    }

    /// Whether every section is present.
    pub fn is_normalized(&self) -> bool {
        Section::ALL.iter().all(|s| self.0.contains_key(s.key()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Raw value of a section.
    pub fn section(&self, section: Section) -> Option<&Value> {
        self.0.get(section.key())
    }

    /// Mutable raw value of a section.
    pub fn section_mut(&mut self, section: Section) -> Option<&mut Value> {
        self.0.get_mut(section.key())
    }

    /// Object section as a map; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// `FacturaError::Shape` if present but not an object.
    pub fn object_section(
        &self,
        section: Section,
    ) -> Result<Option<&Map<String, Value>>, FacturaError> {
        match self.section(section) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(FacturaError::shape(section.key(), "an object")),
        }
    }

    /// Line items; empty when absent.
    ///
    /// # Errors
    ///
    /// `FacturaError::Shape` if `productos` is present but not an array.
    pub fn line_items(&self) -> Result<&[Value], FacturaError> {
        match self.section(Section::LineItems) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(FacturaError::shape(Section::LineItems.key(), "an array")),
        }
    }

    /// Mutable line items; `None` if `productos` is absent or not an array.
    pub fn line_items_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.section_mut(Section::LineItems)?.as_array_mut()
    }

    /// Set `key` inside an object section, creating the section if needed.
    ///
    /// # Errors
    ///
    /// `FacturaError::Shape` for [`Section::LineItems`] or when the section
    /// exists but is not an object.
    pub fn set_field(
        &mut self,
        section: Section,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), FacturaError> {
        if section == Section::LineItems {
            return Err(FacturaError::shape(section.key(), "an object section"));
        }
        let slot = self
            .0
            .entry(section.key())
            .or_insert_with(|| section.empty_value());
        if slot.is_null() {
            *slot = section.empty_value();
        }
        match slot {
            Value::Object(map) => {
                map.insert(key.into(), value.into());
                Ok(())
            }
            _ => Err(FacturaError::shape(section.key(), "an object")),
        }
    }

    /// Field of an object section; `None` when the section or key is absent.
    pub fn field(&self, section: Section, key: &str) -> Option<&Value> {
        self.section(section)?.as_object()?.get(key)
    }

    /// Invoice number from `detalles_factura.numero`, if it is text.
    pub fn invoice_number(&self) -> Option<&str> {
        self.field(Section::Details, detail_keys::NUMBER)?.as_str()
    }

    /// Observations followed by notes, skipping empty ones.
    pub fn notes(&self) -> Vec<&str> {
        [OBSERVATIONS_KEY, NOTES_KEY]
            .iter()
            .filter_map(|k| self.0.get(*k).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

impl From<InvoiceRecord> for Value {
    fn from(record: InvoiceRecord) -> Self {
        Value::Object(record.0)
    }
}

impl TryFrom<Value> for InvoiceRecord {
    type Error = FacturaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Result of the arithmetic coherence check.
///
/// Produced by [`validate_invoice`](super::validate_invoice); never an error
/// itself. `is_valid` only turns false on a grand-total mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// False when the reconstructed grand total disagrees with the extracted one.
    pub is_valid: bool,
    /// Hard mismatches (grand total).
    pub errors: Vec<String>,
    /// Soft mismatches (subtotal) and validation-process failures.
    pub warnings: Vec<String>,
    /// Compared values; `None` until the total check ran.
    pub details: Option<ValidationDetails>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            details: None,
        }
    }
}

impl ValidationReport {
    /// Whether there is nothing to show: no errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Values compared by the coherence checks, for diagnostic display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetails {
    /// Sum of line item amounts.
    pub line_items_subtotal: f64,
    /// `totales.subtotal` as extracted.
    pub extracted_subtotal: f64,
    /// Total reconstructed from the extracted subtotal, discount and taxes.
    pub expected_total: f64,
    /// `totales.total` as extracted.
    pub extracted_total: f64,
}
