//! Row dataset built from the spreadsheet export.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::feeds::{SheetColumn, SheetResponse, SheetRow, number_text};

use super::metrics::{WeekMetrics, ZERO};
use super::row::{PlanningRow, RowKey};

/// Header of the store column.
pub const STORE_COLUMN: &str = "Store";
/// Header of the SKU column.
pub const SKU_COLUMN: &str = "SKU";
/// Header of the week column.
pub const WEEK_COLUMN: &str = "Week";
/// Header of the sales units column.
pub const SALES_UNITS_COLUMN: &str = "Sales Units";
/// Header of the sales dollars column.
pub const SALES_DOLLARS_COLUMN: &str = "Sales Dollars";
/// Header of the GM dollars column.
pub const GM_DOLLARS_COLUMN: &str = "GM Dollars";
/// Header of the GM percent column (a fraction in the sheet).
pub const GM_PERCENT_COLUMN: &str = "GM %";

/// Positions of the known columns in the sheet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    store: usize,
    sku: usize,
    week: usize,
    sales_units: Option<usize>,
    sales_dollars: Option<usize>,
    gm_dollars: Option<usize>,
    gm_percent: Option<usize>,
}

impl ColumnIndex {
    /// Locates columns by header label; the first matching column wins.
    fn locate(cols: &[SheetColumn]) -> Result<Self, FeedError> {
        let find = |label: &str| cols.iter().position(|c| c.label() == label);
        let require = |label: &str| {
            find(label).ok_or_else(|| FeedError::RequiredColumnMissing {
                column: label.to_string(),
            })
        };

        let index = Self {
            store: require(STORE_COLUMN)?,
            sku: require(SKU_COLUMN)?,
            week: require(WEEK_COLUMN)?,
            sales_units: find(SALES_UNITS_COLUMN),
            sales_dollars: find(SALES_DOLLARS_COLUMN),
            gm_dollars: find(GM_DOLLARS_COLUMN),
            gm_percent: find(GM_PERCENT_COLUMN),
        };

        for (label, position) in [
            (SALES_UNITS_COLUMN, index.sales_units),
            (SALES_DOLLARS_COLUMN, index.sales_dollars),
            (GM_DOLLARS_COLUMN, index.gm_dollars),
            (GM_PERCENT_COLUMN, index.gm_percent),
        ] {
            if position.is_none() {
                warn!("Sheet has no '{label}' column; defaulting to {ZERO}");
            }
        }

        Ok(index)
    }

    fn metrics(&self, row: &SheetRow) -> WeekMetrics {
        let text = |position: Option<usize>| {
            position
                .and_then(|i| row.text(i))
                .unwrap_or_else(|| ZERO.to_string())
        };

        WeekMetrics {
            sales_units: text(self.sales_units),
            sales_dollars: text(self.sales_dollars),
            gm_dollars: text(self.gm_dollars),
            gm_percent: self
                .gm_percent
                .and_then(|i| row.value(i))
                .and_then(|v| v.as_f64())
                .map_or_else(|| ZERO.to_string(), |fraction| number_text(fraction * 100.0)),
        }
    }
}

/// Builds planning rows from a spreadsheet export.
///
/// Rows are keyed by (store, SKU) in first-seen order; each sheet row fills
/// one week of its planning row, and a repeated (store, SKU, week) keeps
/// the later values.
///
/// # Errors
///
/// Returns `MalformedFeed` if the table is incomplete and
/// `RequiredColumnMissing` if `Store`, `SKU` or `Week` is absent.
pub fn build_row_dataset(sheet: &SheetResponse) -> Result<Vec<PlanningRow>, FeedError> {
    let (cols, rows) = sheet.sections()?;
    let index = ColumnIndex::locate(cols)?;

    let mut dataset: Vec<PlanningRow> = Vec::new();
    let mut positions: HashMap<RowKey, usize> = HashMap::new();

    for row in rows {
        let store = row.text(index.store).unwrap_or_default();
        let sku = row.text(index.sku).unwrap_or_default();
        let week = row.text(index.week).unwrap_or_default();

        let key = RowKey::new(store, sku);
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            dataset.push(PlanningRow::new(key));
            dataset.len() - 1
        });

        dataset[position].set_week(week, index.metrics(row));
    }

    debug!(
        "Built {} planning rows from {} sheet rows",
        dataset.len(),
        rows.len()
    );
    Ok(dataset)
}
