use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// Category text of the conventional energy line item.
pub const ELECTRIC_ENERGY: &str = "Energia Elétrica";

/// Category text of the SCEE energy line item billed without ICMS tax.
pub const SCEE_ENERGY_WITHOUT_TAX: &str = "Energia SCEE s/ ICMS";

/// Recognised line-item categories.
///
/// Classification happens once, when the record is deserialised, and is an
/// exact string match: no trimming, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineItemKind {
    /// `"Energia Elétrica"`.
    ElectricEnergy,
    /// `"Energia SCEE s/ ICMS"`.
    SceeEnergyWithoutTax,
    /// Any other category, kept verbatim.
    Other(String),
}

impl LineItemKind {
    /// The category text as it appears on the invoice.
    pub fn as_str(&self) -> &str {
        match self {
            LineItemKind::ElectricEnergy => ELECTRIC_ENERGY,
            LineItemKind::SceeEnergyWithoutTax => SCEE_ENERGY_WITHOUT_TAX,
            LineItemKind::Other(s) => s,
        }
    }
}

impl From<String> for LineItemKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            ELECTRIC_ENERGY => LineItemKind::ElectricEnergy,
            SCEE_ENERGY_WITHOUT_TAX => LineItemKind::SceeEnergyWithoutTax,
            _ => LineItemKind::Other(s),
        }
    }
}

impl From<&str> for LineItemKind {
    fn from(s: &str) -> Self {
        LineItemKind::from(s.to_string())
    }
}

impl From<LineItemKind> for String {
    fn from(kind: LineItemKind) -> Self {
        match kind {
            LineItemKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

// ── DecimalText ───────────────────────────────────────────────────────────────

/// A numeric value carried as text, e.g. `"100.0"`.
///
/// The listing sends quantities and values as decimal strings; bare JSON
/// numbers are accepted too and kept in their textual form. Any other JSON
/// value (`null`, a boolean, an object) is kept as its JSON text, so the
/// record still loads and only a consumer that needs the number fails.
/// Parsing to `f64` is deferred until then.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawDecimal")]
pub struct DecimalText(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl From<RawDecimal> for DecimalText {
    fn from(raw: RawDecimal) -> Self {
        match raw {
            RawDecimal::Text(s) => DecimalText(s),
            RawDecimal::Number(n) => DecimalText(n.to_string()),
            RawDecimal::Other(value) => DecimalText(value.to_string()),
        }
    }
}

impl DecimalText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the text as a finite `f64`.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not a plain
    /// decimal number (including `NaN` and infinities) is reported as
    /// [`BillingError::InvalidNumber`] against `field`.
    pub fn to_f64(&self, field: &'static str) -> Result<f64> {
        let invalid = || BillingError::InvalidNumber {
            field,
            value: self.0.clone(),
        };
        let value: f64 = self.0.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(value)
    }
}

impl From<&str> for DecimalText {
    fn from(s: &str) -> Self {
        DecimalText(s.to_string())
    }
}

// ── Line items ────────────────────────────────────────────────────────────────

/// One categorised billed quantity/value pair within an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "tipo", alias = "kind")]
    pub kind: LineItemKind,
    #[serde(rename = "quantidade", alias = "quantity", default)]
    pub quantity: DecimalText,
    #[serde(rename = "valorTotal", alias = "totalValue", default)]
    pub total_value: DecimalText,
}

/// Energy credited against consumption through distributed generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompensatedEnergy {
    #[serde(rename = "quantidade", alias = "quantity", default)]
    pub quantity: DecimalText,
    #[serde(rename = "valorTotal", alias = "totalValue", default)]
    pub total_value: DecimalText,
}

/// Municipal public-lighting contribution charged on the invoice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicLightingContribution {
    #[serde(rename = "valorTotal", alias = "totalValue", default)]
    pub total_value: DecimalText,
}

// ── InvoiceRecord ─────────────────────────────────────────────────────────────

/// A single invoice as returned by the listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Billing date, kept verbatim; used as the chart label.
    #[serde(rename = "data", alias = "date", default)]
    pub date: String,
    /// Billed line items in invoice order.
    #[serde(rename = "valoresFaturados", alias = "billedValues", default)]
    pub billed_values: Vec<LineItem>,
    #[serde(
        rename = "energiaCompensada",
        alias = "compensatedEnergy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compensated_energy: Option<CompensatedEnergy>,
    #[serde(
        rename = "contribuicaoIlumPublica",
        alias = "publicLightingContribution",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_lighting_contribution: Option<PublicLightingContribution>,
    #[serde(rename = "clientNumber", alias = "numeroCliente", default)]
    pub client_number: String,
    #[serde(rename = "clientName", alias = "nomeCliente", default)]
    pub client_name: String,
    /// Key handed to the download collaborator.
    #[serde(rename = "fileName", default)]
    pub file_name: String,
}

impl InvoiceRecord {
    /// First line item of the given kind, if any.
    pub fn line_item(&self, kind: &LineItemKind) -> Option<&LineItem> {
        self.billed_values.iter().find(|item| &item.kind == kind)
    }

    /// The electric and SCEE line items, or `None` when either is absent.
    pub fn energy_items(&self) -> Option<(&LineItem, &LineItem)> {
        let electric = self.line_item(&LineItemKind::ElectricEnergy)?;
        let scee = self.line_item(&LineItemKind::SceeEnergyWithoutTax)?;
        Some((electric, scee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "data": "2024-01-01",
            "valoresFaturados": [
                {"tipo": "Energia Elétrica", "quantidade": "100.0", "valorTotal": "50.0"},
                {"tipo": "Energia SCEE s/ ICMS", "quantidade": "20.0", "valorTotal": "10.0"},
                {"tipo": "Energia compensada GD I", "quantidade": "15", "valorTotal": "-7.5"}
            ],
            "energiaCompensada": {"quantidade": "15.0", "valorTotal": "7.5"},
            "contribuicaoIlumPublica": {"valorTotal": "2.0"},
            "clientNumber": "7202788969",
            "clientName": "JOSE MESALY FONSECA",
            "fileName": "3001116735-01-2024.pdf"
        })
    }

    // ── LineItemKind ───────────────────────────────────────────────────────

    #[test]
    fn test_kind_classification_exact() {
        assert_eq!(
            LineItemKind::from("Energia Elétrica"),
            LineItemKind::ElectricEnergy
        );
        assert_eq!(
            LineItemKind::from("Energia SCEE s/ ICMS"),
            LineItemKind::SceeEnergyWithoutTax
        );
    }

    #[test]
    fn test_kind_classification_no_normalisation() {
        assert_eq!(
            LineItemKind::from("energia elétrica"),
            LineItemKind::Other("energia elétrica".to_string())
        );
        assert_eq!(
            LineItemKind::from("Energia Elétrica "),
            LineItemKind::Other("Energia Elétrica ".to_string())
        );
        assert_eq!(
            LineItemKind::from("Energia Eletrica"),
            LineItemKind::Other("Energia Eletrica".to_string())
        );
    }

    #[test]
    fn test_kind_serialises_back_to_text() {
        let json = serde_json::to_string(&LineItemKind::SceeEnergyWithoutTax).unwrap();
        assert_eq!(json, r#""Energia SCEE s/ ICMS""#);
        let json = serde_json::to_string(&LineItemKind::Other("Multa".to_string())).unwrap();
        assert_eq!(json, r#""Multa""#);
    }

    // ── DecimalText ────────────────────────────────────────────────────────

    #[test]
    fn test_decimal_parses_plain_text() {
        assert_eq!(DecimalText::from("100.0").to_f64("q").unwrap(), 100.0);
        assert_eq!(DecimalText::from(" 7.5 ").to_f64("q").unwrap(), 7.5);
        assert_eq!(DecimalText::from("-3").to_f64("q").unwrap(), -3.0);
    }

    #[test]
    fn test_decimal_rejects_malformed() {
        for bad in ["", "12,5", "abc", "1.2.3", "100kWh"] {
            let err = DecimalText::from(bad).to_f64("quantity").unwrap_err();
            match err {
                BillingError::InvalidNumber { field, value } => {
                    assert_eq!(field, "quantity");
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_decimal_rejects_non_finite() {
        assert!(DecimalText::from("NaN").to_f64("q").is_err());
        assert!(DecimalText::from("inf").to_f64("q").is_err());
        assert!(DecimalText::from("-infinity").to_f64("q").is_err());
    }

    #[test]
    fn test_decimal_accepts_json_number() {
        let item: CompensatedEnergy =
            serde_json::from_str(r#"{"quantidade": 15, "valorTotal": 7.5}"#).unwrap();
        assert_eq!(item.quantity.as_str(), "15");
        assert_eq!(item.total_value.to_f64("v").unwrap(), 7.5);
    }

    #[test]
    fn test_decimal_null_loads_and_fails_on_use() {
        let item: CompensatedEnergy =
            serde_json::from_str(r#"{"quantidade": null, "valorTotal": true}"#).unwrap();
        assert_eq!(item.quantity.as_str(), "null");
        assert!(matches!(
            item.quantity.to_f64("compensatedEnergy.quantity"),
            Err(BillingError::InvalidNumber { value, .. }) if value == "null"
        ));
        assert!(item.total_value.to_f64("compensatedEnergy.totalValue").is_err());
    }

    // ── InvoiceRecord ──────────────────────────────────────────────────────

    #[test]
    fn test_record_deserialises_wire_names() {
        let record: InvoiceRecord = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.billed_values.len(), 3);
        assert_eq!(record.billed_values[0].kind, LineItemKind::ElectricEnergy);
        assert_eq!(
            record.billed_values[2].kind,
            LineItemKind::Other("Energia compensada GD I".to_string())
        );
        assert_eq!(record.client_number, "7202788969");
        assert_eq!(record.file_name, "3001116735-01-2024.pdf");
        assert_eq!(
            record.public_lighting_contribution.unwrap().total_value.as_str(),
            "2.0"
        );
    }

    #[test]
    fn test_record_deserialises_english_aliases() {
        let record: InvoiceRecord = serde_json::from_value(serde_json::json!({
            "date": "2024-02-01",
            "billedValues": [
                {"kind": "Energia Elétrica", "quantity": "1", "totalValue": "2"}
            ],
            "compensatedEnergy": {"quantity": "3", "totalValue": "4"},
            "publicLightingContribution": {"totalValue": "5"}
        }))
        .unwrap();
        assert_eq!(record.date, "2024-02-01");
        assert_eq!(record.billed_values[0].kind, LineItemKind::ElectricEnergy);
        assert!(record.compensated_energy.is_some());
        assert!(record.client_number.is_empty());
    }

    #[test]
    fn test_record_missing_optional_sections() {
        let record: InvoiceRecord =
            serde_json::from_str(r#"{"data": "2024-01-01", "valoresFaturados": []}"#).unwrap();
        assert!(record.compensated_energy.is_none());
        assert!(record.public_lighting_contribution.is_none());
    }

    #[test]
    fn test_energy_items_requires_both() {
        let mut record: InvoiceRecord = serde_json::from_value(sample_json()).unwrap();
        let (electric, scee) = record.energy_items().unwrap();
        assert_eq!(electric.quantity.as_str(), "100.0");
        assert_eq!(scee.quantity.as_str(), "20.0");

        record
            .billed_values
            .retain(|item| item.kind != LineItemKind::SceeEnergyWithoutTax);
        assert!(record.energy_items().is_none());
    }

    #[test]
    fn test_line_item_returns_first_match() {
        let mut record: InvoiceRecord = serde_json::from_value(sample_json()).unwrap();
        record.billed_values.push(LineItem {
            kind: LineItemKind::ElectricEnergy,
            quantity: DecimalText::from("999"),
            total_value: DecimalText::from("999"),
        });
        let item = record.line_item(&LineItemKind::ElectricEnergy).unwrap();
        assert_eq!(item.quantity.as_str(), "100.0");
    }
}
