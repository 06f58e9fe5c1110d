//! Sales-units edits and derived-field recomputation.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::EditError;
use crate::feeds::{PriceLookup, SkuField};

use super::metrics::{WeekMetrics, leading_number};
use super::row::{RowKey, RowSet};

/// A priced sales-units edit, ready to merge into a row collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitsEdit {
    /// Edited week.
    pub week: String,
    /// Recomputed metrics for that week.
    pub metrics: WeekMetrics,
}

impl UnitsEdit {
    /// Reads the edited text's leading number, which must be finite.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` when the text does not start with a number.
    pub fn parse_units(text: &str) -> Result<f64, EditError> {
        leading_number(text)
            .filter(|units| units.is_finite())
            .ok_or_else(|| EditError::ParseFailure {
                input: text.to_string(),
            })
    }

    /// Parses the input and prices it against the SKU's price and cost.
    ///
    /// A failed lookup prices the edit at zero.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` for non-numeric input; no lookup is made.
    pub async fn prepare<L>(sku: &str, week: &str, text: &str, lookup: &L) -> Result<Self, EditError>
    where
        L: PriceLookup + ?Sized,
    {
        let units = Self::parse_units(text)?;
        let price = resolve(lookup, sku, SkuField::Price).await;
        let cost = resolve(lookup, sku, SkuField::Cost).await;

        debug!("Pricing {units} units of {sku} for {week} at {price}/{cost}");

        Ok(Self {
            week: week.to_string(),
            metrics: WeekMetrics::derive(units, price, cost),
        })
    }

    /// Merges the edit into the row matching `key`.
    ///
    /// Returns a new collection sharing every other row, or `None` if no
    /// row matches.
    #[must_use]
    pub fn merge_into(&self, rows: &RowSet, key: &RowKey) -> Option<RowSet> {
        let mut matched = false;
        let next: Vec<_> = rows
            .iter()
            .map(|row| {
                if row.key == *key {
                    matched = true;
                    Arc::new(row.with_week(&self.week, self.metrics.clone()))
                } else {
                    Arc::clone(row)
                }
            })
            .collect();

        matched.then(|| Arc::new(next))
    }
}

/// Resolves one SKU attribute, degrading to zero on failure.
async fn resolve<L>(lookup: &L, sku: &str, field: SkuField) -> f64
where
    L: PriceLookup + ?Sized,
{
    match lookup.value_by_id(sku, field).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Lookup of {field} for SKU '{sku}' failed, using 0: {e}");
            0.0
        }
    }
}

/// Applies a sales-units edit to the row matching `key`.
///
/// Non-numeric input, or a key with no row, returns `rows` itself.
pub async fn apply_units_edit<L>(
    rows: &RowSet,
    key: &RowKey,
    week: &str,
    new_units_text: &str,
    lookup: &L,
) -> RowSet
where
    L: PriceLookup + ?Sized,
{
    let edit = match UnitsEdit::prepare(&key.sku, week, new_units_text, lookup).await {
        Ok(edit) => edit,
        Err(e) => {
            debug!("Ignoring edit of {key} {week}: {e}");
            return Arc::clone(rows);
        }
    };

    edit.merge_into(rows, key).unwrap_or_else(|| {
        warn!("Ignoring edit of {key} {week}: no such row");
        Arc::clone(rows)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::feeds::{CatalogLookup, MockPriceLookup, SkuRecord};
    use crate::planning::{MetricField, PlanningRow, into_row_set};

    fn rows() -> RowSet {
        let seeded = WeekMetrics {
            sales_units: String::from("4"),
            sales_dollars: String::from("20"),
            gm_dollars: String::from("8"),
            gm_percent: String::from("40"),
        };
        into_row_set(vec![
            PlanningRow::new(RowKey::new("S1", "SK1")).with_week("W3", seeded.clone()),
            PlanningRow::new(RowKey::new("S1", "SK9")).with_week("W3", seeded.clone()),
            PlanningRow::new(RowKey::new("S2", "SK9")).with_week("W3", seeded),
        ])
    }

    fn catalog() -> CatalogLookup {
        CatalogLookup::new(vec![SkuRecord {
            id: String::from("SK9"),
            label: String::from("Widget"),
            price: Some(5.0),
            cost: Some(3.0),
            class: None,
            department: None,
        }])
    }

    #[tokio::test]
    async fn test_edit_recomputes_week() {
        let before = rows();
        let key = RowKey::new("S1", "SK9");
        let after = apply_units_edit(&before, &key, "W3", "10", &catalog()).await;

        let row = after.iter().find(|r| r.key == key).unwrap();
        assert_eq!(row.field("W3_sales_units"), Some("10"));
        assert_eq!(row.field("W3_sales_dollars"), Some("50.00"));
        assert_eq!(row.field("W3_gm_dollars"), Some("20.00"));
        assert_eq!(row.field("W3_gm_percent"), Some("40.00"));
    }

    #[tokio::test]
    async fn test_edit_leaves_other_rows_untouched() {
        let before = rows();
        let key = RowKey::new("S1", "SK9");
        let after = apply_units_edit(&before, &key, "W3", "10", &catalog()).await;

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after.iter()) {
            if old.key == key {
                assert!(!Arc::ptr_eq(old, new));
            } else {
                assert!(Arc::ptr_eq(old, new));
                assert_eq!(old, new);
            }
        }
        assert_eq!(before[1].metric("W3", MetricField::SalesUnits), Some("4"));
    }

    #[tokio::test]
    async fn test_non_numeric_edit_is_noop() {
        let before = rows();
        let mut lookup = MockPriceLookup::new();
        lookup.expect_value_by_id().never();

        let after = apply_units_edit(&before, &RowKey::new("S1", "SK9"), "W3", "abc", &lookup).await;
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_edit_reads_leading_number() {
        let before = rows();
        let key = RowKey::new("S1", "SK9");
        let after = apply_units_edit(&before, &key, "W3", "12abc", &catalog()).await;

        assert!(!Arc::ptr_eq(&before, &after));
        let row = after.iter().find(|r| r.key == key).unwrap();
        assert_eq!(row.field("W3_sales_units"), Some("12"));
        assert_eq!(row.field("W3_sales_dollars"), Some("60.00"));
        assert_eq!(row.field("W3_gm_percent"), Some("40.00"));
    }

    #[tokio::test]
    async fn test_unknown_row_is_noop() {
        let before = rows();
        let after = apply_units_edit(&before, &RowKey::new("S9", "SK9"), "W3", "5", &catalog()).await;
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_lookup_failure_zeroes_derived_fields() {
        let mut lookup = MockPriceLookup::new();
        lookup.expect_value_by_id().times(2).returning(|id, _| {
            Err(LookupError::SkuNotFound { id: id.to_string() })
        });

        let before = rows();
        let key = RowKey::new("S1", "SK9");
        let after = apply_units_edit(&before, &key, "W3", "7", &lookup).await;

        let row = after.iter().find(|r| r.key == key).unwrap();
        assert_eq!(row.field("W3_sales_units"), Some("7"));
        assert_eq!(row.field("W3_sales_dollars"), Some("0.00"));
        assert_eq!(row.field("W3_gm_dollars"), Some("0.00"));
        assert_eq!(row.field("W3_gm_percent"), Some("0"));
    }

    #[tokio::test]
    async fn test_cost_failure_only() {
        let mut lookup = MockPriceLookup::new();
        lookup.expect_value_by_id().returning(|id, field| match field {
            SkuField::Price => Ok(8.0),
            SkuField::Cost => Err(LookupError::MissingField {
                id: id.to_string(),
                field: field.to_string(),
            }),
        });

        let edit = UnitsEdit::prepare("SK9", "W1", " 2.5 ", &lookup).await.unwrap();
        assert_eq!(edit.metrics.sales_units, "2.5");
        assert_eq!(edit.metrics.sales_dollars, "20.00");
        assert_eq!(edit.metrics.gm_dollars, "20.00");
        assert_eq!(edit.metrics.gm_percent, "100.00");
    }

    #[tokio::test]
    async fn test_edit_adds_missing_week() {
        let before = rows();
        let key = RowKey::new("S2", "SK9");
        let after = apply_units_edit(&before, &key, "W4", "1", &catalog()).await;

        let row = after.iter().find(|r| r.key == key).unwrap();
        assert_eq!(row.metric("W4", MetricField::SalesDollars), Some("5.00"));
        assert_eq!(row.metric("W3", MetricField::SalesUnits), Some("4"));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(UnitsEdit::parse_units("10").unwrap(), 10.0);
        assert_eq!(UnitsEdit::parse_units(" -3.5 ").unwrap(), -3.5);
        assert_eq!(UnitsEdit::parse_units("12abc").unwrap(), 12.0);
        assert_eq!(UnitsEdit::parse_units("8 units").unwrap(), 8.0);
        assert!(UnitsEdit::parse_units("abc").is_err());
        assert!(UnitsEdit::parse_units("Infinity").is_err());
        assert!(UnitsEdit::parse_units("").is_err());
        assert!(UnitsEdit::parse_units("NaN").is_err());
        assert!(UnitsEdit::parse_units("inf").is_err());
    }
}
