//! Week metrics, derived financial fields and GM % color bands.

use serde::Serialize;

use crate::feeds::number_text;

/// Default text of a metric absent from the sheet.
pub const ZERO: &str = "0";

/// The four metric columns of a week group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    /// Planned sales units (editable).
    SalesUnits,
    /// Sales dollars.
    SalesDollars,
    /// Gross margin dollars.
    GmDollars,
    /// Gross margin percent.
    GmPercent,
}

impl MetricField {
    /// All metric fields, in column order.
    pub const ALL: [Self; 4] = [
        Self::SalesUnits,
        Self::SalesDollars,
        Self::GmDollars,
        Self::GmPercent,
    ];

    /// Field-name suffix.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::SalesUnits => "sales_units",
            Self::SalesDollars => "sales_dollars",
            Self::GmDollars => "gm_dollars",
            Self::GmPercent => "gm_percent",
        }
    }

    /// Column header.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::SalesUnits => "Sales Units",
            Self::SalesDollars => "Sales Dollars",
            Self::GmDollars => "GM Dollars",
            Self::GmPercent => "GM %",
        }
    }

    /// Only sales units accept edits.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::SalesUnits)
    }

    /// Grid field name of this metric for a week: `{week}_{suffix}`.
    #[must_use]
    pub fn field_name(self, week: &str) -> String {
        format!("{week}_{}", self.suffix())
    }
}

/// Metric values of one row for one week, as displayed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekMetrics {
    /// Sales units.
    pub sales_units: String,
    /// Sales dollars.
    pub sales_dollars: String,
    /// GM dollars.
    pub gm_dollars: String,
    /// GM percent.
    pub gm_percent: String,
}

impl Default for WeekMetrics {
    fn default() -> Self {
        Self {
            sales_units: String::from(ZERO),
            sales_dollars: String::from(ZERO),
            gm_dollars: String::from(ZERO),
            gm_percent: String::from(ZERO),
        }
    }
}

impl WeekMetrics {
    /// Returns the text of one metric.
    #[must_use]
    pub fn get(&self, field: MetricField) -> &str {
        match field {
            MetricField::SalesUnits => &self.sales_units,
            MetricField::SalesDollars => &self.sales_dollars,
            MetricField::GmDollars => &self.gm_dollars,
            MetricField::GmPercent => &self.gm_percent,
        }
    }

    /// Recomputes all derived fields from a unit count and SKU pricing.
    ///
    /// Dollar amounts are rounded to cents; GM % is computed from the
    /// rounded amounts and is `"0"` when sales dollars are zero.
    #[must_use]
    pub fn derive(units: f64, price: f64, cost: f64) -> Self {
        let sales_dollars = fixed2(units * price);
        let gm_dollars = fixed2(units * price - units * cost);
        let gm_percent = gm_percent_text(&sales_dollars, &gm_dollars);

        Self {
            sales_units: number_text(units),
            sales_dollars,
            gm_dollars,
            gm_percent,
        }
    }
}

/// Formats a value with exactly two decimals.
///
/// Values lying exactly halfway between two cents round away from zero.
/// Only odd multiples of 1/8 can be exact ties in binary.
#[must_use]
pub fn fixed2(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let whole = value.abs().trunc();
        let cents = ((value.abs() - whole) * 100.0).round();
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}{whole:.0}.{cents:02.0}");
    }
    format!("{value:.2}")
}

/// Reads the longest numeric prefix of `text`, after leading whitespace.
///
/// `"12abc"` reads as 12 and `"12%"` as 12; text with no leading number,
/// such as `"abc"` or `"n/a"`, reads as `None`. `Infinity` is accepted,
/// `NaN` is not.
#[must_use]
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        let sign = if text.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_digits = digits_from(exp_start);
        if exp_digits > 0 {
            end = exp_start + exp_digits;
        }
    }

    text[..end].parse().ok()
}

fn gm_percent_text(sales_dollars: &str, gm_dollars: &str) -> String {
    let sales: f64 = sales_dollars.parse().unwrap_or(0.0);
    let gm: f64 = gm_dollars.parse().unwrap_or(0.0);

    if sales == 0.0 {
        String::from(ZERO)
    } else {
        fixed2(gm / sales * 100.0)
    }
}

/// Color band of a GM % cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GmBand {
    /// 40 and above.
    Good,
    /// From 10 up to 40.
    Caution,
    /// Above 5 and below 10.
    Warning,
    /// 5 and below.
    Poor,
    /// No value.
    Neutral,
}

impl GmBand {
    /// Band name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Caution => "caution",
            Self::Warning => "warning",
            Self::Poor => "poor",
            Self::Neutral => "neutral",
        }
    }

    /// Cell background color.
    #[must_use]
    pub const fn background(self) -> &'static str {
        match self {
            Self::Good => "green",
            Self::Caution => "yellow",
            Self::Warning => "orange",
            Self::Poor => "red",
            Self::Neutral => "white",
        }
    }

    /// Cell text color.
    #[must_use]
    pub const fn foreground(self) -> &'static str {
        match self {
            Self::Caution | Self::Neutral => "black",
            Self::Good | Self::Warning | Self::Poor => "white",
        }
    }
}

impl std::fmt::Display for GmBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a GM % value into its color band.
///
/// The lower boundary 5 belongs to `Poor`; `NaN` is treated as absent.
#[must_use]
pub fn classify_gm_percent(value: Option<f64>) -> GmBand {
    match value {
        None => GmBand::Neutral,
        Some(v) if v.is_nan() => GmBand::Neutral,
        Some(v) if v >= 40.0 => GmBand::Good,
        Some(v) if v >= 10.0 => GmBand::Caution,
        Some(v) if v > 5.0 => GmBand::Warning,
        Some(_) => GmBand::Poor,
    }
}

/// Classifies GM % cell text by its leading number; blank text counts as
/// zero.
#[must_use]
pub fn classify_gm_text(value: Option<&str>) -> GmBand {
    match value.map(str::trim) {
        None => GmBand::Neutral,
        Some("") => GmBand::Poor,
        Some(text) => classify_gm_percent(leading_number(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(MetricField::SalesUnits.field_name("W3"), "W3_sales_units");
        assert_eq!(MetricField::GmPercent.field_name("W3"), "W3_gm_percent");
        assert!(MetricField::SalesUnits.is_editable());
        assert!(!MetricField::GmDollars.is_editable());
    }

    #[test]
    fn test_derive_metrics() {
        let metrics = WeekMetrics::derive(10.0, 5.0, 3.0);
        assert_eq!(metrics.sales_units, "10");
        assert_eq!(metrics.sales_dollars, "50.00");
        assert_eq!(metrics.gm_dollars, "20.00");
        assert_eq!(metrics.gm_percent, "40.00");
    }

    #[test]
    fn test_derive_zero_price() {
        let metrics = WeekMetrics::derive(10.0, 0.0, 0.0);
        assert_eq!(metrics.sales_dollars, "0.00");
        assert_eq!(metrics.gm_dollars, "0.00");
        assert_eq!(metrics.gm_percent, "0");
    }

    #[test]
    fn test_derive_negative_margin() {
        let metrics = WeekMetrics::derive(4.0, 2.5, 3.0);
        assert_eq!(metrics.sales_dollars, "10.00");
        assert_eq!(metrics.gm_dollars, "-2.00");
        assert_eq!(metrics.gm_percent, "-20.00");
    }

    #[test]
    fn test_fixed2_ties_round_away_from_zero() {
        assert_eq!(fixed2(0.125), "0.13");
        assert_eq!(fixed2(0.625), "0.63");
        assert_eq!(fixed2(10.375), "10.38");
        assert_eq!(fixed2(-2.875), "-2.88");
        assert_eq!(fixed2(2.5), "2.50");
        assert_eq!(fixed2(1.005), "1.00");
        assert_eq!(fixed2(-0.0), "0.00");

        let metrics = WeekMetrics::derive(1.0, 10.125, 0.0);
        assert_eq!(metrics.sales_dollars, "10.13");
        assert_eq!(metrics.gm_dollars, "10.13");
        assert_eq!(metrics.gm_percent, "100.00");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12abc"), Some(12.0));
        assert_eq!(leading_number("  -3.5kg"), Some(-3.5));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("7."), Some(7.0));
        assert_eq!(leading_number("1e3x"), Some(1000.0));
        assert_eq!(leading_number("4e"), Some(4.0));
        assert_eq!(leading_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(leading_number("abc"), None);
        assert_eq!(leading_number("-"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("NaN"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_gm_percent(Some(10.0)), GmBand::Caution);
        assert_eq!(classify_gm_percent(Some(5.0)), GmBand::Poor);
        assert_eq!(classify_gm_percent(Some(40.0)), GmBand::Good);
        assert_eq!(classify_gm_percent(Some(7.0)), GmBand::Warning);
        assert_eq!(classify_gm_percent(Some(5.01)), GmBand::Warning);
        assert_eq!(classify_gm_percent(Some(39.99)), GmBand::Caution);
        assert_eq!(classify_gm_percent(Some(-12.0)), GmBand::Poor);
        assert_eq!(classify_gm_percent(None), GmBand::Neutral);
        assert_eq!(classify_gm_percent(Some(f64::NAN)), GmBand::Neutral);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify_gm_text(Some("40.00")), GmBand::Good);
        assert_eq!(classify_gm_text(Some("")), GmBand::Poor);
        assert_eq!(classify_gm_text(Some("n/a")), GmBand::Neutral);
        assert_eq!(classify_gm_text(Some("12%")), GmBand::Caution);
        assert_eq!(classify_gm_text(Some(" 45.5 pts")), GmBand::Good);
        assert_eq!(classify_gm_text(None), GmBand::Neutral);
    }

    #[test]
    fn test_band_colors() {
        assert_eq!(GmBand::Good.background(), "green");
        assert_eq!(GmBand::Caution.foreground(), "black");
        assert_eq!(GmBand::Neutral.background(), "white");
    }
}
