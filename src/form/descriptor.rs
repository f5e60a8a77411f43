//! Field metadata extraction.
//!
//! Turns one declarative [`FieldNode`] into a normalized [`FieldDescriptor`].
//! Extraction is pure and recomputed whenever the schema changes; kinds
//! whose supporting data is missing fail fast, since that is a contract
//! violation by the page author, not a runtime condition.

use std::fmt;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use serde_json::Value;

use crate::form::options::{EntryAccessors, OptionSource, SelectOption};
use crate::form::schema::{CustomRender, FieldKind, FieldNode, ValueType};
use crate::ui::Result;

pub const FULL_WIDTH: u8 = 12;
pub const DEFAULT_MIN_SEARCH_LENGTH: usize = 3;

/// Normalized, read-only descriptor for one form field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub col: u8,
    pub mb: u16,
    pub default_value: Value,
    pub options: Vec<SelectOption>,
    pub entries: Option<EntryAccessors>,
    pub on_search: Option<Arc<dyn OptionSource>>,
    pub min_search_length: usize,
    pub disabled: bool,
    pub visible: bool,
    pub tooltip: Option<String>,
    pub max_length: Option<usize>,
    pub trim: bool,
    pub numeric_switch: bool,
    pub element: Option<CustomRender>,
}

impl FieldDescriptor {
    /// Extract the descriptor for one schema node.
    ///
    /// # Errors
    ///
    /// Fails when the resolved kind requires supporting metadata that is
    /// missing: option-backed kinds without `options`, async autocomplete
    /// without entry accessors, custom fields without a render function.
    pub fn extract(node: &FieldNode) -> Result<Self> {
        let kind = node.meta.field.unwrap_or_else(|| infer_kind(node.value_type));

        match kind {
            FieldKind::Select
            | FieldKind::MultiSelect
            | FieldKind::Radio
            | FieldKind::Autocomplete => {
                if node.meta.options.is_none() {
                    return Err(eyre!(
                        "field '{}' is declared as {kind:?} but has no options",
                        node.name
                    ));
                }
            }
            FieldKind::AsyncAutocomplete => {
                if node.meta.entries.is_none() {
                    return Err(eyre!(
                        "field '{}' is declared as async autocomplete but has no \
                         value/label accessors",
                        node.name
                    ));
                }
            }
            FieldKind::Custom => {
                if node.meta.element.is_none() {
                    return Err(eyre!(
                        "field '{}' is declared as custom but has no render function",
                        node.name
                    ));
                }
            }
            _ => {}
        }

        let default_value = node
            .meta
            .default
            .clone()
            .unwrap_or_else(|| implicit_default(kind, node));

        Ok(Self {
            name: node.name.clone(),
            kind,
            label: node
                .meta
                .label
                .clone()
                .unwrap_or_else(|| node.name.clone()),
            col: node.meta.col.unwrap_or(FULL_WIDTH).clamp(1, FULL_WIDTH),
            mb: node.meta.mb.unwrap_or(0),
            default_value,
            options: node.meta.options.clone().unwrap_or_default(),
            entries: node.meta.entries.clone(),
            on_search: node.meta.on_search.clone(),
            min_search_length: node
                .meta
                .min_search_length
                .unwrap_or(DEFAULT_MIN_SEARCH_LENGTH),
            disabled: node.meta.disabled,
            visible: node.meta.visible,
            tooltip: node.meta.tooltip.clone(),
            max_length: node.meta.max_length,
            trim: node.meta.trim,
            numeric_switch: node.meta.numeric_switch,
            element: node.meta.element.clone(),
        })
    }
}

// `on_search` and `element` hold closures, so the derive is unavailable.
impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("col", &self.col)
            .field("default_value", &self.default_value)
            .field("disabled", &self.disabled)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

/// Infer a sensible default kind from the node's primitive type.
const fn infer_kind(value_type: ValueType) -> FieldKind {
    match value_type {
        ValueType::String => FieldKind::Text,
        ValueType::Number => FieldKind::Numeric,
        ValueType::Boolean => FieldKind::Checkbox,
        ValueType::Date => FieldKind::Date,
    }
}

fn implicit_default(kind: FieldKind, node: &FieldNode) -> Value {
    match kind {
        FieldKind::Checkbox => Value::Bool(false),
        FieldKind::Switch => {
            if node.meta.numeric_switch {
                Value::from(0)
            } else {
                Value::Bool(false)
            }
        }
        FieldKind::MultiSelect => Value::Array(Vec::new()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::FieldNode;

    #[test]
    fn kind_is_inferred_from_value_type() {
        let text = FieldDescriptor::extract(&FieldNode::string("name")).unwrap();
        assert_eq!(text.kind, FieldKind::Text);
        assert_eq!(text.col, FULL_WIDTH);

        let numeric = FieldDescriptor::extract(&FieldNode::number("amount")).unwrap();
        assert_eq!(numeric.kind, FieldKind::Numeric);

        let checkbox = FieldDescriptor::extract(&FieldNode::boolean("active")).unwrap();
        assert_eq!(checkbox.kind, FieldKind::Checkbox);
        assert_eq!(checkbox.default_value, Value::Bool(false));
    }

    #[test]
    fn explicit_annotation_takes_precedence() {
        let node = FieldNode::string("status")
            .kind(FieldKind::Select)
            .options(vec![SelectOption::new(1, "Open")])
            .col(4);
        let descriptor = FieldDescriptor::extract(&node).unwrap();
        assert_eq!(descriptor.kind, FieldKind::Select);
        assert_eq!(descriptor.col, 4);
        assert_eq!(descriptor.options.len(), 1);
    }

    #[test]
    fn select_without_options_fails_fast() {
        let node = FieldNode::string("status").kind(FieldKind::Select);
        let err = FieldDescriptor::extract(&node).unwrap_err();
        assert!(err.to_string().contains("no options"));
    }

    #[test]
    fn async_autocomplete_without_accessors_fails_fast() {
        let node = FieldNode::string("customer").kind(FieldKind::AsyncAutocomplete);
        assert!(FieldDescriptor::extract(&node).is_err());
    }

    #[test]
    fn custom_without_element_fails_fast() {
        let node = FieldNode::string("chart").kind(FieldKind::Custom);
        assert!(FieldDescriptor::extract(&node).is_err());
    }

    #[test]
    fn debug_output_names_the_field() {
        let node = FieldNode::string("customer")
            .kind(FieldKind::AsyncAutocomplete)
            .entries(EntryAccessors::fields("code", "name"));
        let descriptor = FieldDescriptor::extract(&node).unwrap();
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("customer"));
        assert!(debug.contains("AsyncAutocomplete"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let node = FieldNode::number("amount").label("Amount").col(6);
        let a = FieldDescriptor::extract(&node).unwrap();
        let b = FieldDescriptor::extract(&node).unwrap();
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.col, b.col);
        assert_eq!(a.label, b.label);
    }
}
