//! Column schema built from the calendar taxonomy.
//!
//! The schema serializes to the grid's column-definition shape: two pinned
//! identity columns followed by month groups of week groups.

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::FeedError;
use crate::feeds::CalendarEntry;

use super::metrics::MetricField;

/// Header class centering group and metric headers.
const HEADER_CENTER: &str = "header-center";

/// Minimum width of metric columns.
const METRIC_MIN_WIDTH: u32 = 120;

/// Pinned side of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    /// Pinned to the left edge.
    Left,
}

/// Cell style rule attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellStyleRule {
    /// Color by GM % band.
    GmBand,
}

/// A leaf column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Row field shown in the column.
    pub field: String,
    /// Header text.
    pub header_name: String,
    /// Pinned side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pinned>,
    /// Whether the column sorts.
    #[serde(skip_serializing_if = "is_false")]
    pub sortable: bool,
    /// Whether cells accept edits.
    #[serde(skip_serializing_if = "is_false")]
    pub editable: bool,
    /// Header CSS class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_class: Option<String>,
    /// Minimum width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    /// Cell style rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_style: Option<CellStyleRule>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl ColumnDef {
    /// Creates a pinned, sortable identity column.
    #[must_use]
    pub fn identity(field: &str, header: &str) -> Self {
        Self {
            field: field.to_string(),
            header_name: header.to_string(),
            pinned: Some(Pinned::Left),
            sortable: true,
            editable: false,
            header_class: None,
            min_width: None,
            cell_style: None,
        }
    }

    /// Creates the column of one metric of a week.
    #[must_use]
    pub fn metric(week: &str, metric: MetricField) -> Self {
        Self {
            field: metric.field_name(week),
            header_name: metric.header().to_string(),
            pinned: None,
            sortable: false,
            editable: metric.is_editable(),
            header_class: Some(HEADER_CENTER.to_string()),
            min_width: Some(METRIC_MIN_WIDTH),
            cell_style: (metric == MetricField::GmPercent).then_some(CellStyleRule::GmBand),
        }
    }
}

/// The four metric columns of one calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGroup {
    /// Week identifier.
    #[serde(skip)]
    pub week: String,
    /// Week label shown as the group header.
    pub header_name: String,
    /// Header CSS class.
    pub header_class: String,
    /// Metric columns.
    pub children: Vec<ColumnDef>,
}

impl WeekGroup {
    /// Creates the week group for a calendar entry.
    #[must_use]
    pub fn from_entry(entry: &CalendarEntry) -> Self {
        Self {
            week: entry.week.clone(),
            header_name: entry.week_label.clone(),
            header_class: HEADER_CENTER.to_string(),
            children: MetricField::ALL
                .iter()
                .map(|metric| ColumnDef::metric(&entry.week, *metric))
                .collect(),
        }
    }
}

/// Week groups sharing a month label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    /// Month label.
    pub header_name: String,
    /// Week groups, in calendar order.
    pub children: Vec<WeekGroup>,
}

/// Grid column schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Pinned identity columns; empty when no calendar was loaded.
    pub identity: Vec<ColumnDef>,
    /// Month groups, in first-seen order.
    pub months: Vec<MonthGroup>,
}

impl ColumnSchema {
    /// Builds the schema from calendar entries.
    #[must_use]
    pub fn from_entries(entries: &[CalendarEntry]) -> Self {
        let mut months: Vec<MonthGroup> = Vec::new();
        let mut month_index: HashMap<&str, usize> = HashMap::new();

        for entry in entries {
            let index = *month_index
                .entry(entry.month_label.as_str())
                .or_insert_with(|| {
                    months.push(MonthGroup {
                        header_name: entry.month_label.clone(),
                        children: Vec::new(),
                    });
                    months.len() - 1
                });
            months[index].children.push(WeekGroup::from_entry(entry));
        }

        debug!(
            "Built column schema: {} months, {} weeks",
            months.len(),
            entries.len()
        );

        Self {
            identity: vec![
                ColumnDef::identity("store", "Store"),
                ColumnDef::identity("sku", "SKU"),
            ],
            months,
        }
    }

    /// Returns true if no calendar data is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.is_empty() && self.months.is_empty()
    }

    /// Number of month groups.
    #[must_use]
    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    /// Number of week groups across all months.
    #[must_use]
    pub fn week_count(&self) -> usize {
        self.months.iter().map(|m| m.children.len()).sum()
    }

    /// Iterates week groups in display order.
    pub fn weeks(&self) -> impl Iterator<Item = &WeekGroup> {
        self.months.iter().flat_map(|m| m.children.iter())
    }

    /// Returns true if some week group carries this identifier.
    #[must_use]
    pub fn has_week(&self, week: &str) -> bool {
        self.weeks().any(|w| w.week == week)
    }

    /// Returns the grid column definitions as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_grid_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for ColumnSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.identity.len() + self.months.len()))?;
        for column in &self.identity {
            seq.serialize_element(column)?;
        }
        for month in &self.months {
            seq.serialize_element(month)?;
        }
        seq.end()
    }
}

/// Builds the column schema from a raw calendar feed.
///
/// # Errors
///
/// Returns `MalformedFeed` if the feed is not an array or an entry lacks a
/// required field.
pub fn build_column_schema(feed: &Value) -> Result<ColumnSchema, FeedError> {
    let entries = CalendarEntry::parse_feed(feed)?;
    Ok(ColumnSchema::from_entries(&entries))
}
