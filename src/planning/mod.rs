//! Planning module.
//!
//! This module turns the calendar and spreadsheet feeds into the grid's
//! column schema and row dataset, applies sales-units edits and classifies
//! GM % values into color bands.

mod dataset;
mod edit;
mod metrics;
mod row;
mod schema;
mod trend;

pub use dataset::{
    GM_DOLLARS_COLUMN, GM_PERCENT_COLUMN, SALES_DOLLARS_COLUMN, SALES_UNITS_COLUMN, SKU_COLUMN,
    STORE_COLUMN, WEEK_COLUMN, build_row_dataset,
};
pub use edit::{UnitsEdit, apply_units_edit};
pub use metrics::{
    GmBand, MetricField, WeekMetrics, ZERO, classify_gm_percent, classify_gm_text, fixed2,
    leading_number,
};
pub use row::{PlanningRow, RowKey, RowSet, into_row_set};
pub use schema::{
    CellStyleRule, ColumnDef, ColumnSchema, MonthGroup, Pinned, WeekGroup, build_column_schema,
};
pub use trend::{TrendPoint, build_gm_trend};
