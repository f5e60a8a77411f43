//! Shared form state container.
//!
//! Maps field name to current value and validation error. Owned by exactly
//! one mounted form and passed explicitly into every control; there is no
//! ambient lookup. Validation errors are supplied externally and only
//! displayed by controls - the engine never computes them.

use std::collections::HashMap;

use serde_json::Value;

use crate::form::descriptor::FieldDescriptor;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: HashMap<String, Value>,
    errors: HashMap<String, String>,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed values from the extracted field defaults.
    ///
    /// Descriptors carry the implicit defaults too (checkbox `false`,
    /// switch `0`/`false`, multi-select `[]`), so an untouched field
    /// still submits its documented value.
    #[must_use]
    pub fn from_descriptors(descriptors: &[FieldDescriptor]) -> Self {
        let mut state = Self::new();
        state.seed_defaults(descriptors);
        state
    }

    /// Insert the default for every field that has no value yet.
    pub fn seed_defaults(&mut self, descriptors: &[FieldDescriptor]) {
        for desc in descriptors {
            if !desc.default_value.is_null() && !self.values.contains_key(&desc.name) {
                self.values.insert(desc.name.clone(), desc.default_value.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        tracing::trace!(field = %name, "form value changed");
        self.values.insert(name, value);
    }

    pub fn clear(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Reset all values back to the field defaults and drop all errors.
    pub fn reset(&mut self, descriptors: &[FieldDescriptor]) {
        *self = Self::from_descriptors(descriptors);
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn set_error(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(name.into(), message.into());
    }

    pub fn clear_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All current values, for the submit handler.
    pub const fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::options::SelectOption;
    use crate::form::schema::{FieldKind, FieldNode, FormSchema};
    use serde_json::json;

    fn descriptors(schema: &FormSchema) -> Vec<FieldDescriptor> {
        schema
            .fields
            .iter()
            .map(|f| FieldDescriptor::extract(f).unwrap())
            .collect()
    }

    #[test]
    fn defaults_are_seeded_and_reset_restores_them() {
        let schema = FormSchema::new()
            .field(FieldNode::string("name").default_value("acme"))
            .field(FieldNode::string("note"));
        let descs = descriptors(&schema);
        let mut state = FormState::from_descriptors(&descs);
        assert_eq!(state.get("name"), &json!("acme"));
        assert_eq!(state.get("note"), &Value::Null);

        state.set("name", json!("other"));
        state.set_error("name", "required");
        state.reset(&descs);
        assert_eq!(state.get("name"), &json!("acme"));
        assert!(state.error("name").is_none());
    }

    #[test]
    fn untouched_fields_carry_their_implicit_defaults() {
        let schema = FormSchema::new()
            .field(FieldNode::boolean("active"))
            .field(FieldNode::number("flag").kind(FieldKind::Switch).numeric_switch())
            .field(
                FieldNode::string("tags")
                    .kind(FieldKind::MultiSelect)
                    .options(vec![SelectOption::new(1, "Red")]),
            );
        let state = FormState::from_descriptors(&descriptors(&schema));
        assert_eq!(state.get("active"), &json!(false));
        assert_eq!(state.get("flag"), &json!(0));
        assert_eq!(state.get("tags"), &json!([]));
    }

    #[test]
    fn seeding_never_overwrites_an_existing_value() {
        let schema = FormSchema::new().field(FieldNode::boolean("active"));
        let descs = descriptors(&schema);
        let mut state = FormState::new();
        state.set("active", json!(true));
        state.seed_defaults(&descs);
        assert_eq!(state.get("active"), &json!(true));
    }

    #[test]
    fn errors_are_per_field() {
        let mut state = FormState::new();
        state.set_error("iban", "invalid checksum");
        assert_eq!(state.error("iban"), Some("invalid checksum"));
        assert!(state.error("name").is_none());
        state.clear_error("iban");
        assert!(!state.has_errors());
    }
}
