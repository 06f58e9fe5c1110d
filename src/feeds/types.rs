//! Wire types for the calendar, spreadsheet and reference feeds.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::FeedError;

/// Feed name used in calendar shape errors.
pub const CALENDAR_FEED: &str = "calendar";

/// Feed name used in spreadsheet shape errors.
pub const SHEET_FEED: &str = "sheet";

/// One entry of the calendar taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEntry {
    /// Month the week belongs to.
    pub month_label: String,
    /// Display label of the week.
    pub week_label: String,
    /// Week identifier used to derive field names.
    pub week: String,
}

impl CalendarEntry {
    /// Creates a calendar entry.
    #[must_use]
    pub fn new(
        month_label: impl Into<String>,
        week_label: impl Into<String>,
        week: impl Into<String>,
    ) -> Self {
        Self {
            month_label: month_label.into(),
            week_label: week_label.into(),
            week: week.into(),
        }
    }

    /// Reads calendar entries out of a raw feed payload.
    ///
    /// String and numeric labels are accepted; anything else is treated as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFeed` if the payload is not an array or an entry
    /// lacks `month_label`, `week_label` or `week`.
    pub fn parse_feed(payload: &Value) -> Result<Vec<Self>, FeedError> {
        let items = payload
            .as_array()
            .ok_or_else(|| FeedError::malformed(CALENDAR_FEED, "expected a JSON array"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let field = |name: &str| {
                    item.get(name).and_then(scalar_to_string).ok_or_else(|| {
                        FeedError::malformed(CALENDAR_FEED, format!("entry {i} lacks '{name}'"))
                    })
                };

                Ok(Self {
                    month_label: field("month_label")?,
                    week_label: field("week_label")?,
                    week: field("week")?,
                })
            })
            .collect()
    }
}

/// Published-sheet response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetResponse {
    /// Table payload.
    #[serde(default)]
    pub table: Option<SheetTable>,
}

/// Sheet table: ordered column descriptors and data rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetTable {
    /// Column descriptors.
    #[serde(default)]
    pub cols: Option<Vec<SheetColumn>>,
    /// Data rows.
    #[serde(default)]
    pub rows: Option<Vec<SheetRow>>,
}

/// Column descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetColumn {
    /// Column letter id.
    #[serde(default)]
    pub id: Option<String>,
    /// Header label.
    #[serde(default)]
    pub label: Option<String>,
    /// Declared cell type.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// A data row; cells may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    /// Cells in column order.
    #[serde(default)]
    pub c: Vec<Option<SheetCell>>,
}

/// A single cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetCell {
    /// Typed value.
    #[serde(default)]
    pub v: Option<CellValue>,
    /// Formatted value.
    #[serde(default)]
    pub f: Option<String>,
}

/// Loosely typed cell value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Bool(bool),
}

impl CellValue {
    /// Returns the value as display text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) => number_text(*n),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Returns the value as a number, if it is one or parses as one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
            Self::Bool(_) => None,
        }
    }
}

impl SheetResponse {
    /// Returns the table with both sections present.
    ///
    /// # Errors
    ///
    /// Returns `MalformedFeed` if `table`, `cols` or `rows` is missing.
    pub fn sections(&self) -> Result<(&[SheetColumn], &[SheetRow]), FeedError> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| FeedError::malformed(SHEET_FEED, "response has no table"))?;
        let cols = table
            .cols
            .as_deref()
            .ok_or_else(|| FeedError::malformed(SHEET_FEED, "table has no cols"))?;
        let rows = table
            .rows
            .as_deref()
            .ok_or_else(|| FeedError::malformed(SHEET_FEED, "table has no rows"))?;
        Ok((cols, rows))
    }
}

impl SheetColumn {
    /// Returns the header label, empty if absent.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }
}

impl SheetRow {
    /// Returns the typed value at a column position.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&CellValue> {
        self.c.get(index)?.as_ref()?.v.as_ref()
    }

    /// Returns the non-empty display text at a column position.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<String> {
        self.value(index)
            .map(CellValue::to_text)
            .filter(|s| !s.is_empty())
    }
}

/// SKU reference record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkuRecord {
    /// SKU id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Unit price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Unit cost.
    #[serde(default)]
    pub cost: Option<f64>,
    /// Product class.
    #[serde(default)]
    pub class: Option<String>,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
}

/// Store reference record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreRecord {
    /// Display sequence number.
    #[serde(default)]
    pub seqno: u32,
    /// Store id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Store name.
    #[serde(default)]
    pub label: String,
    /// City name.
    #[serde(default)]
    pub city: String,
    /// State identifier.
    #[serde(default, deserialize_with = "string_or_number")]
    pub state: String,
}

/// Formats a number the way the sheet and grid display it: integral values
/// without a fractional part, negative zero as zero.
#[must_use]
pub fn number_text(value: f64) -> String {
    if value == 0.0 {
        return String::from("0");
    }
    value.to_string()
}

/// Converts a JSON string or number to text.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a string or number, found {value}"))
    })
}
