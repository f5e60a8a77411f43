//! Option lists, entry accessors and the loose value equality used to
//! resolve a stored value back to its option.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One selectable option: the value written to the form state and the
/// label shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Accessor pair that projects a raw entry object into an option.
///
/// Async search sources return arbitrary row objects; the accessors extract
/// the value to store and the label to display from each of them.
#[derive(Clone)]
pub struct EntryAccessors {
    pub value_of: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
    pub label_of: Arc<dyn Fn(&Value) -> String + Send + Sync>,
}

impl EntryAccessors {
    pub fn new(
        value_of: impl Fn(&Value) -> Value + Send + Sync + 'static,
        label_of: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            value_of: Arc::new(value_of),
            label_of: Arc::new(label_of),
        }
    }

    /// Accessors that read plain object fields by key.
    pub fn fields(value_key: &str, label_key: &str) -> Self {
        let value_key = value_key.to_string();
        let label_key = label_key.to_string();
        Self::new(
            move |entry| entry.get(&value_key).cloned().unwrap_or(Value::Null),
            move |entry| value_label(entry.get(&label_key).unwrap_or(&Value::Null)),
        )
    }

    pub fn project(&self, entry: &Value) -> SelectOption {
        SelectOption {
            value: (self.value_of)(entry),
            label: (self.label_of)(entry),
        }
    }
}

impl fmt::Debug for EntryAccessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryAccessors").finish_non_exhaustive()
    }
}

/// Asynchronous option source backing an async autocomplete field.
///
/// Returns raw entry objects; the field's [`EntryAccessors`] project them
/// into options. Failures are recoverable: the control logs and shows an
/// empty result set.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn search(&self, query: &str) -> color_eyre::Result<Vec<Value>>;
}

/// Loose equality between a stored value and a candidate option value.
///
/// Tried as strict equality, then string equality, then numeric equality,
/// in that order, to tolerate type drift between stored and option values.
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if value_label(a) == value_label(b) && !a.is_null() && !b.is_null() {
        return true;
    }
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => false,
    }
}

/// Plain display string for a value: strings unquoted, null empty.
#[must_use]
pub fn value_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Find the option matching the stored value, if any.
#[must_use]
pub fn find_option<'a>(options: &'a [SelectOption], stored: &Value) -> Option<&'a SelectOption> {
    if stored.is_null() {
        return None;
    }
    options.iter().find(|o| loose_eq(&o.value, stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_equality_wins() {
        assert!(loose_eq(&json!(5), &json!(5)));
        assert!(loose_eq(&json!("a"), &json!("a")));
    }

    #[test]
    fn string_and_numeric_fallbacks_tolerate_type_drift() {
        // number stored, string option
        assert!(loose_eq(&json!(5), &json!("5")));
        // string stored, number option
        assert!(loose_eq(&json!("5.0"), &json!(5)));
        assert!(!loose_eq(&json!("5"), &json!(6)));
        assert!(!loose_eq(&Value::Null, &json!("")));
    }

    #[test]
    fn find_option_resolves_drifted_values() {
        let options = vec![
            SelectOption::new(1, "One"),
            SelectOption::new(2, "Two"),
        ];
        assert_eq!(find_option(&options, &json!("2")).unwrap().label, "Two");
        assert!(find_option(&options, &Value::Null).is_none());
        assert!(find_option(&options, &json!(3)).is_none());
    }

    #[test]
    fn field_accessors_project_entries() {
        let accessors = EntryAccessors::fields("id", "title");
        let option = accessors.project(&json!({"id": 7, "title": "Invoice"}));
        assert_eq!(option.value, json!(7));
        assert_eq!(option.label, "Invoice");
    }
}
