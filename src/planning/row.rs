//! Planning rows keyed by store and SKU.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;

use super::metrics::{MetricField, WeekMetrics};

/// Shared, copy-on-write row collection.
///
/// Edits replace the outer `Arc` and the edited row; untouched rows stay
/// shared with the previous collection.
pub type RowSet = Arc<Vec<Arc<PlanningRow>>>;

/// Identity of a planning row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    /// Store id.
    pub store: String,
    /// SKU id.
    pub sku: String,
}

impl RowKey {
    /// Creates a row key.
    #[must_use]
    pub fn new(store: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            sku: sku.into(),
        }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.store, self.sku)
    }
}

/// One store/SKU row with its per-week metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningRow {
    /// Row identity.
    pub key: RowKey,
    /// Metrics by week identifier, in the order weeks were first set.
    weeks: Vec<(String, WeekMetrics)>,
}

impl PlanningRow {
    /// Creates a row with no week data.
    #[must_use]
    pub const fn new(key: RowKey) -> Self {
        Self {
            key,
            weeks: Vec::new(),
        }
    }

    /// Store id.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.key.store
    }

    /// SKU id.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.key.sku
    }

    /// Metrics of a week, if the row has any.
    #[must_use]
    pub fn week(&self, week: &str) -> Option<&WeekMetrics> {
        self.weeks
            .iter()
            .find_map(|(w, metrics)| (w == week).then_some(metrics))
    }

    /// Weeks and their metrics, in first-set order.
    pub fn weeks(&self) -> impl Iterator<Item = (&str, &WeekMetrics)> {
        self.weeks.iter().map(|(w, metrics)| (w.as_str(), metrics))
    }

    /// Number of weeks with metrics.
    #[must_use]
    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    /// Text of one metric of one week.
    #[must_use]
    pub fn metric(&self, week: &str, field: MetricField) -> Option<&str> {
        self.week(week).map(|m| m.get(field))
    }

    /// Looks up a value by its flat grid field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "store" => return Some(self.store()),
            "sku" => return Some(self.sku()),
            _ => {}
        }

        MetricField::ALL.iter().find_map(|metric| {
            let week = name.strip_suffix(metric.suffix())?.strip_suffix('_')?;
            self.metric(week, *metric)
        })
    }

    /// Sets one week's metrics. A week already present keeps its position.
    pub fn set_week(&mut self, week: impl Into<String>, metrics: WeekMetrics) {
        let week = week.into();
        match self.weeks.iter_mut().find(|(w, _)| *w == week) {
            Some((_, slot)) => *slot = metrics,
            None => self.weeks.push((week, metrics)),
        }
    }

    /// Returns a copy of this row with one week's metrics replaced.
    #[must_use]
    pub fn with_week(&self, week: &str, metrics: WeekMetrics) -> Self {
        let mut row = self.clone();
        row.set_week(week, metrics);
        row
    }
}

impl Serialize for PlanningRow {
    /// Serializes to the flat grid shape: `store`, `sku` and
    /// `{week}_{metric}` fields.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.weeks.len() * MetricField::ALL.len()))?;
        map.serialize_entry("store", &self.key.store)?;
        map.serialize_entry("sku", &self.key.sku)?;
        for (week, metrics) in &self.weeks {
            for metric in MetricField::ALL {
                map.serialize_entry(&metric.field_name(week), metrics.get(metric))?;
            }
        }
        map.end()
    }
}

/// Wraps rows into a shared collection.
#[must_use]
pub fn into_row_set(rows: Vec<PlanningRow>) -> RowSet {
    Arc::new(rows.into_iter().map(Arc::new).collect())
}
