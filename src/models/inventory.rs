use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::constants::{
    FIELD_BARCODE_NUMBER, FIELD_MATERIAL_ID, FIELD_STORAGE_BIN, FIELD_ZONE, TABLE_COLUMNS,
};

/// One warehouse inventory row as it appears in the dataset file.
///
/// Every field of the source object is kept so matches can be returned
/// with full fidelity. Values may be absent, null or non-string; use
/// [`InventoryRecord::text`] to read them as display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryRecord(Map<String, Value>);

impl InventoryRecord {
    /// Field value coerced to trimmed text; absent fields read as empty
    pub fn text(&self, name: &str) -> String {
        self.0.get(name).map(coerce_text).unwrap_or_default()
    }

    pub fn material_id(&self) -> String {
        self.text(FIELD_MATERIAL_ID)
    }

    pub fn barcode_number(&self) -> String {
        self.text(FIELD_BARCODE_NUMBER)
    }

    /// Location-only projection used by the quick view
    pub fn quick_view(&self) -> QuickViewRow {
        QuickViewRow {
            material_id: self.material_id(),
            zone: self.text(FIELD_ZONE),
            storage_bin: self.text(FIELD_STORAGE_BIN),
        }
    }

    /// Display text for each column of the full result table
    pub fn table_row(&self) -> Vec<String> {
        TABLE_COLUMNS.iter().map(|column| self.text(column)).collect()
    }
}

impl From<Map<String, Value>> for InventoryRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Coerce any JSON value to the text used for display and comparison.
///
/// Falsy scalars (`null`, `false`, `0`, `""`) become empty text, integral
/// floats print without a fraction, and containers print as compact JSON.
pub fn coerce_text(value: &Value) -> String {
    let text = match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(number) => number_text(number),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.trim().to_string()
}

fn number_text(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return if i == 0 { String::new() } else { i.to_string() };
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f == 0.0 => String::new(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => number.to_string(),
    }
}

/// Reduced-field view of a match: where the material is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickViewRow {
    #[serde(rename = "MATERIAL_ID")]
    pub material_id: String,
    #[serde(rename = "ZONE")]
    pub zone: String,
    #[serde(rename = "STORAGE_BIN")]
    pub storage_bin: String,
}

/// Full-field table of matches, one row of display text per record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        Self {
            columns: TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(InventoryRecord::table_row).collect(),
        }
    }
}
