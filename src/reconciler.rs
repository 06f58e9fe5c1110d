//! Planning reconciler.
//!
//! This module owns the grid state: it loads the column schema and row
//! dataset from the feeds, and applies sales-units edits to the row
//! collection. Edits to the same row are applied in the order they were
//! started; edits to different rows do not wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use crate::error::EditError;
use crate::feeds::{FeedClient, PriceLookup};
use crate::planning::{
    ColumnSchema, PlanningRow, RowKey, RowSet, UnitsEdit, build_column_schema, build_row_dataset,
    into_row_set,
};

/// Reconciler holding the grid's schema and rows.
pub struct PlanningReconciler<L: PriceLookup> {
    /// SKU price/cost lookup.
    lookup: L,
    /// Column schema.
    schema: ColumnSchema,
    /// Current row collection.
    rows: Mutex<RowSet>,
    /// Per-row edit queues.
    edit_queues: Mutex<HashMap<RowKey, Arc<AsyncMutex<()>>>>,
}

/// Result of loading the grid from the feeds.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MountReport {
    /// Number of month groups.
    pub months: usize,
    /// Number of week groups.
    pub weeks: usize,
    /// Number of planning rows.
    pub rows: usize,
    /// Feed failures the grid degraded on.
    pub errors: Vec<String>,
}

impl MountReport {
    /// Returns true if both feeds loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for MountReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.is_complete() { "loaded" } else { "degraded" };
        writeln!(f, "Grid {status}:")?;
        writeln!(f, "  Months: {}", self.months)?;
        writeln!(f, "  Weeks: {}", self.weeks)?;
        writeln!(f, "  Rows: {}", self.rows)?;

        if !self.errors.is_empty() {
            writeln!(f, "  Errors:")?;
            for error in &self.errors {
                writeln!(f, "    - {error}")?;
            }
        }

        Ok(())
    }
}

/// Outcome of a sales-units edit.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// The edit was applied; carries the updated row.
    Applied(Arc<PlanningRow>),
    /// The edit was ignored and the rows are unchanged.
    Rejected(EditError),
}

impl EditOutcome {
    /// Returns true if the edit was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

impl<L: PriceLookup> PlanningReconciler<L> {
    /// Creates a reconciler from an already built schema and dataset.
    #[must_use]
    pub fn from_parts(schema: ColumnSchema, rows: Vec<PlanningRow>, lookup: L) -> Self {
        Self {
            lookup,
            schema,
            rows: Mutex::new(into_row_set(rows)),
            edit_queues: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the calendar and planning sheet concurrently and builds the grid.
    ///
    /// A failed or malformed calendar leaves the schema empty; a failed or
    /// malformed sheet leaves the rows empty. Neither failure is fatal.
    pub async fn mount(client: &FeedClient, lookup: L) -> (Self, MountReport) {
        info!("Loading planning grid");

        let (calendar, sheet) = tokio::join!(client.fetch_calendar(), client.fetch_planning_sheet());
        let mut errors = Vec::new();

        let schema = match calendar.and_then(|feed| build_column_schema(&feed)) {
            Ok(schema) => schema,
            Err(e) => {
                error!("Failed to load calendar: {e}");
                errors.push(format!("calendar: {e}"));
                ColumnSchema::default()
            }
        };

        let rows = match sheet.and_then(|response| build_row_dataset(&response)) {
            Ok(rows) => rows,
            Err(e) => {
                error!("Failed to load planning sheet: {e}");
                errors.push(format!("planning sheet: {e}"));
                Vec::new()
            }
        };

        let report = MountReport {
            months: schema.month_count(),
            weeks: schema.week_count(),
            rows: rows.len(),
            errors,
        };

        info!(
            "Grid loaded: {} months, {} weeks, {} rows",
            report.months, report.weeks, report.rows
        );

        (Self::from_parts(schema, rows, lookup), report)
    }

    /// Column schema.
    #[must_use]
    pub const fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Snapshot of the current row collection.
    #[must_use]
    pub fn rows(&self) -> RowSet {
        Arc::clone(&self.rows.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current version of one row.
    #[must_use]
    pub fn row(&self, key: &RowKey) -> Option<Arc<PlanningRow>> {
        self.rows().iter().find(|row| row.key == *key).cloned()
    }

    /// Applies a sales-units edit to one week of one row.
    ///
    /// The edit waits for earlier edits of the same row, prices the new
    /// units, then merges the result into the collection current at that
    /// point. Rejected edits leave the collection untouched.
    pub async fn edit_units(&self, key: &RowKey, week: &str, new_units_text: &str) -> EditOutcome {
        if self.row(key).is_none() {
            warn!("Ignoring edit of {key} {week}: no such row");
            return EditOutcome::Rejected(EditError::UnknownRow {
                key: key.to_string(),
            });
        }
        if !self.schema.has_week(week) {
            debug!("Editing week {week} which has no column group");
        }

        let queue = self.queue_for(key);
        let outcome = {
            let _turn = queue.lock().await;
            self.apply(key, week, new_units_text).await
        };
        self.release_queue(key, &queue);

        outcome
    }

    async fn apply(&self, key: &RowKey, week: &str, new_units_text: &str) -> EditOutcome {
        let edit = match UnitsEdit::prepare(&key.sku, week, new_units_text, &self.lookup).await {
            Ok(edit) => edit,
            Err(e) => {
                debug!("Ignoring edit of {key} {week}: {e}");
                return EditOutcome::Rejected(e);
            }
        };

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(next) = edit.merge_into(&rows, key) else {
            return EditOutcome::Rejected(EditError::UnknownRow {
                key: key.to_string(),
            });
        };
        *rows = next;

        match rows.iter().find(|row| row.key == *key) {
            Some(row) => {
                info!(
                    "Set {key} {week} to {} units ({} sales, {}% GM)",
                    edit.metrics.sales_units, edit.metrics.sales_dollars, edit.metrics.gm_percent
                );
                EditOutcome::Applied(Arc::clone(row))
            }
            None => EditOutcome::Rejected(EditError::UnknownRow {
                key: key.to_string(),
            }),
        }
    }

    fn queue_for(&self, key: &RowKey) -> Arc<AsyncMutex<()>> {
        let mut queues = self
            .edit_queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(queues.entry(key.clone()).or_default())
    }

    fn release_queue(&self, key: &RowKey, queue: &Arc<AsyncMutex<()>>) {
        let mut queues = self
            .edit_queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Held by the map and by this caller only.
        if Arc::strong_count(queue) == 2 {
            queues.remove(key);
        }
    }

    #[cfg(test)]
    fn pending_queues(&self) -> usize {
        self.edit_queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
