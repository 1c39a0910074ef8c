use serde_json::{Map, Value};

use super::types::*;

/// Builder for invoice records, mainly for fixtures and manual entry.
///
/// ```
/// use factura_check::core::*;
///
/// let record = InvoiceRecordBuilder::new()
///     .number("A-1024")
///     .currency("MXN")
///     .add_line(LineItemBuilder::new("Consultoría").quantity(10).unit_price(150).build())
///     .totals(TotalsBuilder::new().subtotal(1500).tax(240).total(1740).build())
///     .build();
///
/// assert!(validate_invoice(&record).is_clean());
/// ```
#[derive(Debug, Default)]
pub struct InvoiceRecordBuilder {
    seller: Map<String, Value>,
    buyer: Map<String, Value>,
    details: Map<String, Value>,
    lines: Vec<Value>,
    totals: Map<String, Value>,
    observations: Option<String>,
    notes: Option<String>,
}

impl InvoiceRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seller_name(mut self, name: impl Into<String>) -> Self {
        self.seller.insert("nombre".into(), Value::String(name.into()));
        self
    }

    pub fn seller_tax_id(mut self, id: impl Into<String>) -> Self {
        self.seller.insert("rfc_tax_id".into(), Value::String(id.into()));
        self
    }

    pub fn buyer_name(mut self, name: impl Into<String>) -> Self {
        self.buyer.insert("nombre".into(), Value::String(name.into()));
        self
    }

    pub fn buyer_tax_id(mut self, id: impl Into<String>) -> Self {
        self.buyer.insert("rfc_tax_id".into(), Value::String(id.into()));
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.details
            .insert(detail_keys::NUMBER.into(), Value::String(number.into()));
        self
    }

    pub fn issue_date(mut self, date: impl Into<String>) -> Self {
        self.details
            .insert(detail_keys::ISSUE_DATE.into(), Value::String(date.into()));
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.details
            .insert(detail_keys::CURRENCY.into(), Value::String(code.into()));
        self
    }

    /// Set an arbitrary `detalles_factura` field.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn add_line(mut self, line: Value) -> Self {
        self.lines.push(line);
        self
    }

    pub fn totals(mut self, totals: Map<String, Value>) -> Self {
        self.totals = totals;
        self
    }

    pub fn observations(mut self, text: impl Into<String>) -> Self {
        self.observations = Some(text.into());
        self
    }

    pub fn notes(mut self, text: impl Into<String>) -> Self {
        self.notes = Some(text.into());
        self
    }

    pub fn build(self) -> InvoiceRecord {
        let mut map = Map::new();
        map.insert(Section::Seller.key().into(), Value::Object(self.seller));
        map.insert(Section::Buyer.key().into(), Value::Object(self.buyer));
        map.insert(Section::Details.key().into(), Value::Object(self.details));
        map.insert(Section::LineItems.key().into(), Value::Array(self.lines));
        map.insert(Section::Totals.key().into(), Value::Object(self.totals));
        if let Some(text) = self.observations {
            map.insert(OBSERVATIONS_KEY.into(), Value::String(text));
        }
        if let Some(text) = self.notes {
            map.insert(NOTES_KEY.into(), Value::String(text));
        }
        InvoiceRecord::from_map(map)
    }
}

/// Builder for a single `productos` entry. Only fields that are set are emitted.
#[derive(Debug)]
pub struct LineItemBuilder {
    fields: Map<String, Value>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            line_keys::DESCRIPTION.into(),
            Value::String(description.into()),
        );
        Self { fields }
    }

    pub fn code(self, code: impl Into<String>) -> Self {
        self.set(line_keys::CODE, Value::String(code.into()))
    }

    pub fn unit(self, unit: impl Into<String>) -> Self {
        self.set(line_keys::UNIT, Value::String(unit.into()))
    }

    pub fn quantity(self, quantity: impl Into<Value>) -> Self {
        self.set(line_keys::QUANTITY, quantity.into())
    }

    pub fn unit_price(self, price: impl Into<Value>) -> Self {
        self.set(line_keys::UNIT_PRICE, price.into())
    }

    pub fn discount(self, discount: impl Into<Value>) -> Self {
        self.set(line_keys::DISCOUNT, discount.into())
    }

    pub fn subtotal(self, subtotal: impl Into<Value>) -> Self {
        self.set(line_keys::SUBTOTAL, subtotal.into())
    }

    pub fn tax(self, tax: impl Into<Value>) -> Self {
        self.set(line_keys::TAX, tax.into())
    }

    pub fn total(self, total: impl Into<Value>) -> Self {
        self.set(line_keys::TOTAL, total.into())
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for the `totales` section. Only fields that are set are emitted.
#[derive(Debug, Default)]
pub struct TotalsBuilder {
    fields: Map<String, Value>,
}

impl TotalsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subtotal(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::SUBTOTAL, amount.into())
    }

    pub fn discount(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::DISCOUNT, amount.into())
    }

    pub fn tax(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::TAX, amount.into())
    }

    pub fn other_taxes(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::OTHER_TAXES, amount.into())
    }

    pub fn withheld_vat(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::WITHHELD_VAT, amount.into())
    }

    pub fn withheld_income_tax(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::WITHHELD_INCOME_TAX, amount.into())
    }

    pub fn total(self, amount: impl Into<Value>) -> Self {
        self.set(totals_keys::TOTAL, amount.into())
    }

    pub fn total_in_words(self, text: impl Into<String>) -> Self {
        self.set(totals_keys::TOTAL_IN_WORDS, Value::String(text.into()))
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Map<String, Value> {
        self.fields
    }
}
