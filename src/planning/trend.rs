//! Weekly GM trend built from the summary sheet.

use serde::Serialize;
use tracing::debug;

use crate::error::FeedError;
use crate::feeds::SheetResponse;

/// Cell position of GM dollars in a summary row.
const GM_DOLLARS_CELL: usize = 1;
/// Cell position of the GM fraction in a summary row.
const GM_PERCENT_CELL: usize = 3;

/// One week of the GM trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Week label, `W1` for the first row.
    pub week_label: String,
    /// Gross margin dollars.
    pub gm_dollars: f64,
    /// Gross margin percent.
    pub gm_percent: f64,
}

/// Builds the GM trend, one point per summary row.
///
/// Missing or non-numeric cells count as zero.
///
/// # Errors
///
/// Returns `MalformedFeed` if the table is incomplete.
pub fn build_gm_trend(sheet: &SheetResponse) -> Result<Vec<TrendPoint>, FeedError> {
    let (_, rows) = sheet.sections()?;

    let points: Vec<TrendPoint> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let number = |cell: usize| row.value(cell).and_then(|v| v.as_f64()).unwrap_or(0.0);
            TrendPoint {
                week_label: format!("W{}", i + 1),
                gm_dollars: number(GM_DOLLARS_CELL),
                gm_percent: number(GM_PERCENT_CELL) * 100.0,
            }
        })
        .collect();

    debug!("Built GM trend with {} points", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trend_points() {
        let sheet: SheetResponse = serde_json::from_value(json!({
            "table": {
                "cols": [{ "label": "Week" }, { "label": "GM Dollars" }, { "label": "Sales" }, { "label": "GM %" }],
                "rows": [
                    { "c": [{ "v": "Week 1" }, { "v": 1200.5 }, { "v": 3000 }, { "v": 0.4 }] },
                    { "c": [{ "v": "Week 2" }, { "v": "980" }, null, { "v": 0.25 }] },
                    { "c": [{ "v": "Week 3" }] }
                ]
            }
        }))
        .unwrap();

        let trend = build_gm_trend(&sheet).unwrap();
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].week_label, "W1");
        assert!((trend[0].gm_dollars - 1200.5).abs() < f64::EPSILON);
        assert!((trend[0].gm_percent - 40.0).abs() < 1e-9);
        assert!((trend[1].gm_dollars - 980.0).abs() < f64::EPSILON);
        assert!((trend[1].gm_percent - 25.0).abs() < 1e-9);
        assert_eq!(trend[2].week_label, "W3");
        assert!(trend[2].gm_dollars.abs() < f64::EPSILON);
        assert!(trend[2].gm_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn test_trend_requires_table() {
        let sheet: SheetResponse = serde_json::from_value(json!({})).unwrap();
        assert!(build_gm_trend(&sheet).is_err());
    }
}
