//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tabled::{Table, Tabled};

use crate::feeds::{SkuRecord, StoreRecord};
use crate::planning::{
    ColumnSchema, GmBand, PlanningRow, RowKey, TrendPoint, WeekMetrics, classify_gm_text,
};
use crate::reconciler::{EditOutcome, MountReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Row-week line for table display.
#[derive(Tabled)]
struct RowWeekLine {
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Sales Units")]
    sales_units: String,
    #[tabled(rename = "Sales Dollars")]
    sales_dollars: String,
    #[tabled(rename = "GM Dollars")]
    gm_dollars: String,
    #[tabled(rename = "GM %")]
    gm_percent: String,
}

/// SKU line for table display.
#[derive(Tabled)]
struct SkuLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Department")]
    department: String,
}

/// Store line for table display.
#[derive(Tabled)]
struct StoreLine {
    #[tabled(rename = "#")]
    seqno: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "State")]
    state: String,
}

/// Trend line for table display.
#[derive(Tabled)]
struct TrendLine {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "GM Dollars")]
    gm_dollars: String,
    #[tabled(rename = "GM %")]
    gm_percent: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the grid load report.
    #[must_use]
    pub fn format_mount(&self, report: &MountReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if report.is_complete() {
                    format!("{} Grid loaded", "✓".green())
                } else {
                    format!("{} Grid degraded", "⚠".yellow())
                };
                let _ = writeln!(
                    output,
                    ": {} months, {} weeks, {} rows",
                    report.months, report.weeks, report.rows
                );
                for error in &report.errors {
                    let _ = writeln!(output, "   - {error}");
                }
                output
            }
        }
    }

    /// Formats the column schema.
    #[must_use]
    pub fn format_schema(&self, schema: &ColumnSchema) -> String {
        match self.format {
            OutputFormat::Json => schema
                .to_grid_json()
                .and_then(|grid| serde_json::to_string_pretty(&grid))
                .unwrap_or_default(),
            OutputFormat::Text => {
                if schema.is_empty() {
                    return format!("{} No calendar loaded.\n", "⚠".yellow());
                }

                let mut output = String::from("\nColumns\n");
                for column in &schema.identity {
                    let _ = writeln!(output, "   {} (pinned)", column.header_name);
                }
                for month in &schema.months {
                    let _ = writeln!(output, "   {}", month.header_name.bold());
                    for week in &month.children {
                        let fields: Vec<String> = week
                            .children
                            .iter()
                            .map(|c| {
                                if c.editable {
                                    format!("{}*", c.header_name)
                                } else {
                                    c.header_name.clone()
                                }
                            })
                            .collect();
                        let _ = writeln!(
                            output,
                            "      {} [{}]: {}",
                            week.header_name,
                            week.week,
                            fields.join(", ")
                        );
                    }
                }
                let _ = write!(
                    output,
                    "\n{} months, {} weeks (* editable)\n",
                    schema.month_count(),
                    schema.week_count()
                );
                output
            }
        }
    }

    /// Formats planning rows, optionally restricted to one week.
    #[must_use]
    pub fn format_rows(&self, rows: &[Arc<PlanningRow>], week: Option<&str>) -> String {
        match self.format {
            OutputFormat::Json => match week {
                Some(week) => {
                    let lines: Vec<RowWeekJson<'_>> = rows
                        .iter()
                        .filter_map(|row| RowWeekJson::new(row, week))
                        .collect();
                    serde_json::to_string_pretty(&lines).unwrap_or_default()
                }
                None => {
                    let rows: Vec<&PlanningRow> = rows.iter().map(AsRef::as_ref).collect();
                    serde_json::to_string_pretty(&rows).unwrap_or_default()
                }
            },
            OutputFormat::Text => {
                let lines: Vec<RowWeekLine> = rows
                    .iter()
                    .flat_map(|row| {
                        row.weeks()
                            .filter(|(w, _)| week.is_none_or(|only| only == *w))
                            .map(|(w, metrics)| Self::row_week_line(&row.key, w, metrics))
                    })
                    .collect();

                if lines.is_empty() {
                    return String::from("   No planning rows.\n");
                }

                let count = lines.len();
                let mut output = Table::new(lines).to_string();
                let _ = write!(output, "\n{count} row-weeks across {} rows\n", rows.len());
                output
            }
        }
    }

    /// Formats the outcomes of successive edits of one row and week.
    #[must_use]
    pub fn format_edits(&self, key: &RowKey, week: &str, outcomes: &[(String, EditOutcome)]) -> String {
        match self.format {
            OutputFormat::Json => {
                let edits: Vec<EditJson<'_>> = outcomes
                    .iter()
                    .map(|(input, outcome)| EditJson::new(key, week, input, outcome))
                    .collect();
                serde_json::to_string_pretty(&edits).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = String::new();
                for (input, outcome) in outcomes {
                    match outcome {
                        EditOutcome::Applied(row) => {
                            let metrics = row.week(week).cloned().unwrap_or_default();
                            let _ = writeln!(
                                output,
                                "{} {key} {week} <- {input}: {} sales, {} GM, {}",
                                "✓".green(),
                                metrics.sales_dollars,
                                metrics.gm_dollars,
                                Self::paint_gm(&metrics.gm_percent)
                            );
                        }
                        EditOutcome::Rejected(e) => {
                            let _ = writeln!(output, "{} {key} {week} <- {input}: {e}", "✗".red());
                        }
                    }
                }
                output
            }
        }
    }

    /// Formats the band of a GM % value.
    #[must_use]
    pub fn format_band(&self, value: &str, band: GmBand) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "value": value,
                "band": band,
                "background": band.background(),
                "color": band.foreground(),
            }))
            .unwrap_or_default(),
            OutputFormat::Text => format!("{} {}\n", Self::paint(value, band), band),
        }
    }

    /// Formats the SKU catalog.
    #[must_use]
    pub fn format_skus(&self, skus: &[SkuRecord]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(skus).unwrap_or_default(),
            OutputFormat::Text => {
                let lines: Vec<SkuLine> = skus
                    .iter()
                    .map(|s| SkuLine {
                        id: s.id.clone(),
                        label: Self::truncate(&s.label, 30),
                        price: s.price.map_or_else(|| String::from("-"), |p| format!("{p:.2}")),
                        cost: s.cost.map_or_else(|| String::from("-"), |c| format!("{c:.2}")),
                        class: s.class.clone().unwrap_or_default(),
                        department: s.department.clone().unwrap_or_default(),
                    })
                    .collect();
                let mut output = Table::new(lines).to_string();
                let _ = write!(output, "\n{} SKUs\n", skus.len());
                output
            }
        }
    }

    /// Formats the store catalog.
    #[must_use]
    pub fn format_stores(&self, stores: &[StoreRecord]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(stores).unwrap_or_default(),
            OutputFormat::Text => {
                let lines: Vec<StoreLine> = stores
                    .iter()
                    .map(|s| StoreLine {
                        seqno: s.seqno,
                        id: s.id.clone(),
                        label: Self::truncate(&s.label, 30),
                        city: s.city.clone(),
                        state: s.state.clone(),
                    })
                    .collect();
                let mut output = Table::new(lines).to_string();
                let _ = write!(output, "\n{} stores\n", stores.len());
                output
            }
        }
    }

    /// Formats the GM trend.
    #[must_use]
    pub fn format_trend(&self, trend: &[TrendPoint]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(trend).unwrap_or_default(),
            OutputFormat::Text => {
                if trend.is_empty() {
                    return String::from("   No trend data.\n");
                }
                let lines: Vec<TrendLine> = trend
                    .iter()
                    .map(|p| TrendLine {
                        week: p.week_label.clone(),
                        gm_dollars: format!("{:.2}", p.gm_dollars),
                        gm_percent: format!("{:.2}", p.gm_percent),
                    })
                    .collect();
                Table::new(lines).to_string() + "\n"
            }
        }
    }

    fn row_week_line(key: &RowKey, week: &str, metrics: &WeekMetrics) -> RowWeekLine {
        RowWeekLine {
            store: key.store.clone(),
            sku: key.sku.clone(),
            week: week.to_string(),
            sales_units: metrics.sales_units.clone(),
            sales_dollars: metrics.sales_dollars.clone(),
            gm_dollars: metrics.gm_dollars.clone(),
            gm_percent: Self::paint_gm(&metrics.gm_percent).to_string(),
        }
    }

    /// Paints GM % text with its band colors.
    fn paint_gm(text: &str) -> ColoredString {
        Self::paint(text, classify_gm_text(Some(text)))
    }

    fn paint(text: &str, band: GmBand) -> ColoredString {
        match band {
            GmBand::Good => text.white().on_green(),
            GmBand::Caution => text.black().on_yellow(),
            GmBand::Warning => text.white().on_truecolor(255, 165, 0),
            GmBand::Poor => text.white().on_red(),
            GmBand::Neutral => text.normal(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{head}...")
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct RowWeekJson<'a> {
    store: &'a str,
    sku: &'a str,
    week: &'a str,
    #[serde(flatten)]
    metrics: &'a WeekMetrics,
    band: GmBand,
}

impl<'a> RowWeekJson<'a> {
    fn new(row: &'a PlanningRow, week: &'a str) -> Option<Self> {
        let metrics = row.week(week)?;
        Some(Self {
            store: row.store(),
            sku: row.sku(),
            week,
            metrics,
            band: classify_gm_text(Some(&metrics.gm_percent)),
        })
    }
}

#[derive(Serialize)]
struct EditJson<'a> {
    key: String,
    week: &'a str,
    input: &'a str,
    applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<WeekMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> EditJson<'a> {
    fn new(key: &RowKey, week: &'a str, input: &'a str, outcome: &EditOutcome) -> Self {
        let (metrics, error) = match outcome {
            EditOutcome::Applied(row) => (row.week(week).cloned(), None),
            EditOutcome::Rejected(e) => (None, Some(e.to_string())),
        };
        Self {
            key: key.to_string(),
            week,
            input,
            applied: outcome.is_applied(),
            metrics,
            error,
        }
    }
}
