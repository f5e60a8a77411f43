//! Column configuration and cell formatting.
//!
//! Columns are static per table instance: the page supplies them, the
//! engine only reads them. Cell values are resolved by dotted-path lookup
//! into the row object and formatted by the column's declared kind.
//! Monetary and percentage values use Turkish-locale digits (dot for
//! thousands, comma for decimals) with TRY as the fallback currency.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EMPTY_CELL: &str = "-";
pub const DEFAULT_CURRENCY: &str = "TRY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKind {
    #[default]
    Text,
    Number,
    Currency,
    Percentage,
    Date,
    DateTime,
}

/// Static description of one table column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Fixed cell width; unset columns share the remaining space.
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub kind: CellKind,
    /// Currency code for `CellKind::Currency` columns.
    #[serde(default)]
    pub currency: Option<String>,
    /// Delegate cell rendering to a registered slot under this column's id.
    #[serde(default)]
    pub is_slot: bool,
    #[serde(default)]
    pub sort_disabled: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            width: None,
            kind: CellKind::Text,
            currency: None,
            is_slot: false,
            sort_disabled: false,
            hidden: false,
        }
    }

    #[must_use]
    pub const fn kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    #[must_use]
    pub const fn slot(mut self) -> Self {
        self.is_slot = true;
        self
    }

    #[must_use]
    pub const fn no_sort(mut self) -> Self {
        self.sort_disabled = true;
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Resolve and format this column's cell text for one row.
    #[must_use]
    pub fn format_cell(&self, row: &Value) -> String {
        format_value(
            value_at(row, &self.id),
            self.kind,
            self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        )
    }
}

/// Dotted-path lookup into a row object (`"customer.name"`).
#[must_use]
pub fn value_at<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |v, seg| v.get(seg))
}

fn format_value(value: Option<&Value>, kind: CellKind, currency: &str) -> String {
    let Some(value) = value else {
        return EMPTY_CELL.to_string();
    };
    if value.is_null() {
        return EMPTY_CELL.to_string();
    }

    match kind {
        CellKind::Text => match value {
            Value::String(s) if s.is_empty() => EMPTY_CELL.to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        CellKind::Number => as_f64(value).map_or_else(|| EMPTY_CELL.to_string(), format_number),
        CellKind::Currency => as_f64(value).map_or_else(
            || EMPTY_CELL.to_string(),
            |n| format!("{} {}", group_digits(n, 2), currency_symbol(currency)),
        ),
        CellKind::Percentage => {
            as_f64(value).map_or_else(|| EMPTY_CELL.to_string(), |n| format!("%{}", format_number(n)))
        }
        CellKind::Date => format_date(value, "%d.%m.%Y"),
        CellKind::DateTime => format_date(value, "%d.%m.%Y %H:%M"),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Turkish-locale number: grouped integer part, comma decimals, trailing
/// zeros trimmed.
fn format_number(n: f64) -> String {
    let grouped = group_digits(n, 2);
    let trimmed = grouped.trim_end_matches('0').trim_end_matches(',');
    trimmed.to_string()
}

/// `1234.5` with 2 decimals becomes `"1.234,50"`.
fn group_digits(n: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, ""));

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if n < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac_part}")
    }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "TRY" => "₺",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        other => other,
    }
}

fn format_date(value: &Value, format: &str) -> String {
    let Value::String(text) = value else {
        return EMPTY_CELL.to_string();
    };
    let parsed = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        });
    match parsed {
        // Zero-value dates from upstream serializers mean "no date".
        Ok(dt) if dt.date().year() > 1 => dt.format(format).to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_cell_renders_turkish_lira() {
        let column = ColumnDescriptor::new("amount", "Amount").kind(CellKind::Currency);
        assert_eq!(column.format_cell(&json!({"amount": 100})), "100,00 ₺");
        assert_eq!(column.format_cell(&json!({"amount": null})), "-");
        assert_eq!(column.format_cell(&json!({"amount": 1234.56})), "1.234,56 ₺");
    }

    #[test]
    fn currency_code_picks_the_symbol() {
        let column = ColumnDescriptor::new("amount", "Amount")
            .kind(CellKind::Currency)
            .currency("EUR");
        assert_eq!(column.format_cell(&json!({"amount": 9.9})), "9,90 €");
    }

    #[test]
    fn percentage_uses_prefix_and_comma_decimals() {
        let column = ColumnDescriptor::new("rate", "Rate").kind(CellKind::Percentage);
        assert_eq!(column.format_cell(&json!({"rate": 12.5})), "%12,5");
        assert_eq!(column.format_cell(&json!({"rate": 8})), "%8");
    }

    #[test]
    fn dates_render_day_first_with_placeholder_for_sentinels() {
        let column = ColumnDescriptor::new("due", "Due").kind(CellKind::Date);
        assert_eq!(column.format_cell(&json!({"due": "2021-03-24"})), "24.03.2021");
        assert_eq!(column.format_cell(&json!({"due": "0001-01-01T00:00:00"})), "-");
        assert_eq!(column.format_cell(&json!({"due": null})), "-");

        let stamped = ColumnDescriptor::new("at", "At").kind(CellKind::DateTime);
        assert_eq!(
            stamped.format_cell(&json!({"at": "2021-03-24T09:30:00"})),
            "24.03.2021 09:30"
        );
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let row = json!({"customer": {"name": "Acme", "city": {"code": 6}}});
        assert_eq!(value_at(&row, "customer.name"), Some(&json!("Acme")));
        assert_eq!(value_at(&row, "customer.city.code"), Some(&json!(6)));
        assert_eq!(value_at(&row, "customer.missing"), None);

        let column = ColumnDescriptor::new("customer.name", "Customer");
        assert_eq!(column.format_cell(&row), "Acme");
    }

    #[test]
    fn empty_text_renders_the_placeholder() {
        let column = ColumnDescriptor::new("name", "Name");
        assert_eq!(column.format_cell(&json!({"name": ""})), "-");
        assert_eq!(column.format_cell(&json!({})), "-");
    }
}
