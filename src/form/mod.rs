//! Schema-driven form engine.
//!
//! A [`FormSchema`] declares named fields with a metadata bag; the
//! [`FormRenderer`] extracts a [`FieldDescriptor`] per field, dispatches to
//! the matching control by kind, and lays the controls out in a 12-unit
//! grid. All controls bind to one [`FormState`], which the owning page
//! reads on submit.

pub mod controls;
mod descriptor;
mod options;
mod renderer;
mod schema;
mod state;

pub use controls::{Control, FormEvent};
pub use descriptor::FieldDescriptor;
pub use options::{EntryAccessors, OptionSource, SelectOption, loose_eq, value_label};
pub use renderer::FormRenderer;
pub use schema::{CustomRender, FieldKind, FieldMeta, FieldNode, FormSchema, ValueType};
pub use state::FormState;
