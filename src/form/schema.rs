//! Declarative form schema.
//!
//! The plain parts of a schema (names, kinds, labels, layout, options)
//! round-trip through serde so page definitions can live in config files;
//! the function-valued parts (entry accessors, search sources, custom
//! renderers) are attached programmatically through the builder methods.

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Theme;
use crate::form::options::{EntryAccessors, OptionSource, SelectOption};
use crate::form::state::FormState;

/// Render function for [`FieldKind::Custom`] fields. The engine invokes it
/// with no additional binding.
pub type CustomRender = Arc<dyn Fn(&mut Frame<'_>, Rect, &FormState, &Theme) + Send + Sync>;

/// Primitive type of a field's value; the fallback for kind inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

/// Input control kind.
///
/// `Unknown` absorbs forward-incompatible kinds in deserialized schemas;
/// such fields render nothing rather than failing the whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Password,
    Numeric,
    Masked,
    Select,
    MultiSelect,
    Autocomplete,
    AsyncAutocomplete,
    Checkbox,
    Radio,
    Switch,
    Date,
    Hidden,
    Custom,
    #[serde(other)]
    Unknown,
}

/// Metadata bag attached to one schema field.
///
/// The engine is agnostic to validation semantics; it only reads this bag.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Explicit control kind; wins over inference from the value type.
    pub field: Option<FieldKind>,
    pub label: Option<String>,
    /// Grid span, 1..=12. Defaults to full width.
    pub col: Option<u8>,
    /// Bottom margin in rows.
    pub mb: Option<u16>,
    pub default: Option<Value>,
    pub options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub tooltip: Option<String>,
    pub max_length: Option<usize>,
    #[serde(default)]
    pub trim: bool,
    pub min_search_length: Option<usize>,
    /// Switch fields store 1/0 instead of true/false when set.
    #[serde(default)]
    pub numeric_switch: bool,
    #[serde(skip)]
    pub entries: Option<EntryAccessors>,
    #[serde(skip)]
    pub on_search: Option<Arc<dyn OptionSource>>,
    #[serde(skip)]
    pub element: Option<CustomRender>,
}

const fn default_visible() -> bool {
    true
}

/// One named field of a schema.
#[derive(Clone, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default, flatten)]
    pub meta: FieldMeta,
}

impl FieldNode {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            meta: FieldMeta {
                visible: true,
                ..FieldMeta::default()
            },
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Date)
    }

    #[must_use]
    pub const fn kind(mut self, kind: FieldKind) -> Self {
        self.meta.field = Some(kind);
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.meta.label = Some(label.into());
        self
    }

    #[must_use]
    pub const fn col(mut self, span: u8) -> Self {
        self.meta.col = Some(span);
        self
    }

    #[must_use]
    pub const fn mb(mut self, margin: u16) -> Self {
        self.meta.mb = Some(margin);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.meta.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.meta.options = Some(options);
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.meta.disabled = disabled;
        self
    }

    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.meta.visible = visible;
        self
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.meta.tooltip = Some(tooltip.into());
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.meta.max_length = Some(max);
        self
    }

    #[must_use]
    pub const fn trim(mut self) -> Self {
        self.meta.trim = true;
        self
    }

    #[must_use]
    pub const fn min_search_length(mut self, len: usize) -> Self {
        self.meta.min_search_length = Some(len);
        self
    }

    #[must_use]
    pub const fn numeric_switch(mut self) -> Self {
        self.meta.numeric_switch = true;
        self
    }

    #[must_use]
    pub fn entries(mut self, accessors: EntryAccessors) -> Self {
        self.meta.entries = Some(accessors);
        self
    }

    #[must_use]
    pub fn on_search(mut self, source: Arc<dyn OptionSource>) -> Self {
        self.meta.on_search = Some(source);
        self
    }

    #[must_use]
    pub fn element(
        mut self,
        render: impl Fn(&mut Frame<'_>, Rect, &FormState, &Theme) + Send + Sync + 'static,
    ) -> Self {
        self.meta.element = Some(Arc::new(render));
        self
    }
}

/// Ordered set of field declarations for one form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FormSchema {
    pub fields: Vec<FieldNode>,
}

impl FormSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, node: FieldNode) -> Self {
        self.fields.push(node);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_schema_deserializes_from_toml() {
        let schema: FormSchema = toml::from_str(
            r#"
            [[fields]]
            name = "title"
            type = "string"
            field = "text"
            label = "Title"
            col = 6
            max_length = 40

            [[fields]]
            name = "active"
            type = "boolean"
            "#,
        )
        .unwrap();
        assert_eq!(schema.fields.len(), 2);
        let title = schema.get("title").unwrap();
        assert_eq!(title.meta.field, Some(FieldKind::Text));
        assert_eq!(title.meta.col, Some(6));
        assert!(title.meta.visible);
        assert_eq!(schema.get("active").unwrap().value_type, ValueType::Boolean);
    }

    #[test]
    fn unrecognized_kind_degrades_to_unknown() {
        let schema: FormSchema = toml::from_str(
            r#"
            [[fields]]
            name = "future"
            field = "hologram-picker"
            "#,
        )
        .unwrap();
        assert_eq!(
            schema.get("future").unwrap().meta.field,
            Some(FieldKind::Unknown)
        );
    }
}
