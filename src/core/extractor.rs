use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::error::FacturaError;
use super::types::InvoiceRecord;

/// Instructions plus schema hint sent with the PDF.
///
/// Keys are the ones [`InvoiceRecord`] and the validator read.
pub const EXTRACTION_PROMPT: &str = r#"Analyze this PDF document (an invoice) and extract ALL of its data as precisely as possible.

IMPORTANT:
- Read EVERY line of the document, including headers, tables and footers
- Numbers must be numeric (float/int), NOT strings
- Remove currency symbols ($, €, etc.)
- If a field is not visible, leave it empty or 0

Return a valid JSON object with this structure:
{
  "vendedor": {
    "nombre": "",
    "razon_social": "",
    "direccion": "",
    "ciudad": "",
    "estado": "",
    "codigo_postal": "",
    "pais": "",
    "rfc_tax_id": "",
    "telefono": "",
    "email": "",
    "sitio_web": ""
  },
  "comprador": {
    "nombre": "",
    "razon_social": "",
    "direccion": "",
    "ciudad": "",
    "estado": "",
    "codigo_postal": "",
    "pais": "",
    "rfc_tax_id": "",
    "telefono": "",
    "email": "",
    "contacto": ""
  },
  "detalles_factura": {
    "numero": "",
    "serie": "",
    "folio_fiscal": "",
    "fecha_emision": "",
    "fecha_vencimiento": "",
    "orden_compra": "",
    "condiciones_pago": "",
    "metodo_pago": "",
    "forma_pago": "",
    "moneda": "MXN",
    "tipo_cambio": 1.0,
    "uso_cfdi": "",
    "lugar_expedicion": ""
  },
  "productos": [
    {
      "clave": "",
      "descripcion": "",
      "unidad": "",
      "cantidad": 0.0,
      "precio_unitario": 0.0,
      "descuento": 0.0,
      "subtotal": 0.0,
      "impuestos": 0.0,
      "total": 0.0
    }
  ],
  "totales": {
    "subtotal": 0.0,
    "descuento": 0.0,
    "subtotal_con_descuento": 0.0,
    "iva": 0.0,
    "isr_retenido": 0.0,
    "iva_retenido": 0.0,
    "otros_impuestos": 0.0,
    "total": 0.0,
    "total_letra": ""
  },
  "observaciones": "",
  "notas": ""
}
"#;

/// Document model that turns a PDF into an invoice record.
///
/// Implementations should decode the model output with
/// [`parse_extraction_response`].
pub trait InvoiceExtractor {
    /// Extract a record from `pdf` using `prompt` as instructions and schema hint.
    fn extract(
        &self,
        pdf: &[u8],
        prompt: &str,
    ) -> impl Future<Output = Result<InvoiceRecord, FacturaError>> + Send;
}

/// Strip markdown fences and any text around the outermost JSON object.
///
/// Models sometimes wrap the JSON in ```` ```json ```` fences or prepend
/// commentary despite being asked not to.
pub fn clean_json_response(raw: &str) -> String {
    let unfenced = raw.replace("```json", "").replace("```", "");
    let trimmed = unfenced.trim();

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Decode a model response into a normalized record.
///
/// # Errors
///
/// `FacturaError::Json` if the cleaned text is not JSON,
/// `FacturaError::NotAnObject` if it is JSON but not an object.
pub fn parse_extraction_response(raw: &str) -> Result<InvoiceRecord, FacturaError> {
    let cleaned = clean_json_response(raw);
    debug!(raw_len = raw.len(), cleaned_len = cleaned.len(), "decoding model response");
    let value: Value = serde_json::from_str(&cleaned)?;
    InvoiceRecord::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Section;

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"totales\": {\"total\": 10}}\n```";
        assert_eq!(clean_json_response(raw), "{\"totales\": {\"total\": 10}}");
    }

    #[test]
    fn drops_surrounding_commentary() {
        let raw = "Here is the data you asked for:\n{\"a\": {\"b\": 1}}\nHope it helps!";
        assert_eq!(clean_json_response(raw), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn leaves_braceless_text_alone() {
        assert_eq!(clean_json_response("  not json  "), "not json");
        assert_eq!(clean_json_response("} backwards {"), "} backwards {");
    }

    #[test]
    fn parse_normalizes_sections() {
        let record = parse_extraction_response("{\"notas\": \"hola\"}").unwrap();
        for section in Section::ALL {
            assert!(record.section(section).is_some(), "{}", section.key());
        }
        assert_eq!(record.notes(), vec!["hola"]);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let err = parse_extraction_response("{\"totales\": ").unwrap_err();
        assert!(matches!(err, FacturaError::Json(_)));
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = parse_extraction_response("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, FacturaError::NotAnObject));
    }

    #[test]
    fn prompt_names_every_section() {
        for section in Section::ALL {
            assert!(EXTRACTION_PROMPT.contains(section.key()));
        }
    }
}
