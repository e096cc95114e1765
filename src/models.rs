use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_INSTRUCTIONS: &str = "Noch keine Anweisungen hinterlegt";

pub const NAME: &str = "name";
pub const TURNUS: &str = "turnus";
pub const LAST_INVOICE: &str = "last_invoice";
pub const DOKUMENTENART: &str = "dokumentenart";
pub const BEZUGSWEG: &str = "bezugsweg";
pub const INSTRUCTIONS: &str = "instructions";
pub const SETTLEMENT_COMPLETED: &str = "settlementCompleted";

/// One insurer as stored, kept as the raw JSON object.
///
/// Writes reproduce exactly what was read. Accessors coerce irregular values
/// (`null`, wrong types, empty strings) to "absent" so a bad field never makes the
/// record unreadable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsurerRecord {
    fields: Map<String, Value>,
}

impl InsurerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self::default().with(NAME, Value::String(name.into()))
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// The stored name verbatim, or `""` when missing or not a string.
    pub fn name(&self) -> &str {
        self.fields
            .get(NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn turnus(&self) -> Option<&str> {
        self.text(TURNUS)
    }

    pub fn last_invoice(&self) -> Option<&str> {
        self.text(LAST_INVOICE)
    }

    pub fn instructions(&self) -> Option<&str> {
        self.text(INSTRUCTIONS)
    }

    /// Only a literal `true` counts as settled.
    pub fn settlement_completed(&self) -> bool {
        matches!(self.fields.get(SETTLEMENT_COMPLETED), Some(Value::Bool(true)))
    }

    pub fn set_last_invoice(&mut self, date: &str) {
        self.fields
            .insert(LAST_INVOICE.to_string(), Value::String(date.to_string()));
    }

    /// String field with surrounding whitespace removed; empty strings count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn normalized(&self) -> NormalizedInsurer {
        let text = |key: &str| self.text(key).unwrap_or_default().to_string();
        NormalizedInsurer {
            name: self.name().to_string(),
            turnus: text(TURNUS),
            last_invoice: text(LAST_INVOICE),
            dokumentenart: text(DOKUMENTENART),
            bezugsweg: text(BEZUGSWEG),
            instructions: self
                .instructions()
                .unwrap_or(DEFAULT_INSTRUCTIONS)
                .to_string(),
            settlement_completed: self.settlement_completed(),
        }
    }
}

/// Display form of a record with every field defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInsurer {
    pub name: String,
    pub turnus: String,
    pub last_invoice: String,
    pub dokumentenart: String,
    pub bezugsweg: String,
    pub instructions: String,
    #[serde(rename = "settlementCompleted")]
    pub settlement_completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub insurer_name: String,
    pub last_invoice_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct InsurerStatusView {
    pub name: String,
    pub last_invoice: String,
    pub turnus: String,
    pub instructions: String,
    pub settlement_completed: bool,
    pub status: &'static str,
    pub color: &'static str,
    pub label: String,
    pub days_overdue: u32,
    pub due_date: Option<String>,
}
