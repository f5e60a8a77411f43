//! Stable sorting over dynamic row values.
//!
//! Rows are decorated with their original index and sorted by
//! `(comparator, index)`, so rows the comparator considers equal keep
//! their input order. Stability is a hard contract here: re-sorting by
//! the same key must not shuffle duplicates.

use std::cmp::Ordering;

use serde_json::Value;

use crate::table::column::value_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Sort `rows` with `cmp`, preserving input order among equal elements.
pub fn stable_sort<T, F>(rows: Vec<T>, cmp: F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut decorated: Vec<(usize, T)> = rows.into_iter().enumerate().collect();
    decorated.sort_by(|a, b| cmp(&a.1, &b.1).then_with(|| a.0.cmp(&b.0)));
    decorated.into_iter().map(|(_, row)| row).collect()
}

/// Build a row comparator for one column key and direction.
///
/// The key is a dotted path into the row object. Missing and null values
/// sort as minimal so they group together at one end.
pub fn comparator<'a>(
    direction: SortDirection,
    key: &'a str,
) -> impl Fn(&Value, &Value) -> Ordering + 'a {
    move |a, b| {
        let ordering = compare_values(value_at(a, key), value_at(b, key));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&y.as_f64().unwrap_or(f64::NEG_INFINITY)),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "b", "amount": 10}),
            json!({"id": 2, "name": "a", "amount": 10}),
            json!({"id": 3, "name": "c", "amount": 10}),
            json!({"id": 4, "name": "a", "amount": 5}),
        ]
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn duplicate_keys_keep_their_input_order() {
        let sorted = stable_sort(rows(), comparator(SortDirection::Ascending, "amount"));
        assert_eq!(ids(&sorted), vec![4, 1, 2, 3]);

        // Re-sorting by the same key is a no-op on the duplicates.
        let again = stable_sort(sorted, comparator(SortDirection::Ascending, "amount"));
        assert_eq!(ids(&again), vec![4, 1, 2, 3]);
    }

    #[test]
    fn descending_reverses_comparisons_not_ties() {
        let sorted = stable_sort(rows(), comparator(SortDirection::Descending, "name"));
        assert_eq!(ids(&sorted), vec![3, 1, 2, 4]);
    }

    #[test]
    fn missing_and_null_sort_as_minimal() {
        let rows = vec![
            json!({"id": 1, "amount": 3}),
            json!({"id": 2, "amount": null}),
            json!({"id": 3}),
            json!({"id": 4, "amount": 1}),
        ];
        let sorted = stable_sort(rows, comparator(SortDirection::Ascending, "amount"));
        assert_eq!(ids(&sorted), vec![2, 3, 4, 1]);
    }

    #[test]
    fn numbers_compare_numerically_not_lexically() {
        let rows = vec![json!({"n": 100}), json!({"n": 2}), json!({"n": 30.5})];
        let sorted = stable_sort(rows, comparator(SortDirection::Ascending, "n"));
        let values: Vec<f64> = sorted.iter().map(|r| r["n"].as_f64().unwrap()).collect();
        assert_eq!(values, vec![2.0, 30.5, 100.0]);
    }
}
