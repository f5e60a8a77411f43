//! Named-placeholder system for page-level render overrides.
//!
//! A page can override how a specific table column is rendered without
//! touching the generic engine: it registers a closure under the column id,
//! and the renderer delegates to it at render time. Bindings are resolved
//! per render pass and never persisted.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Cell;
use serde_json::Value;

use crate::Theme;

/// Renders one cell: receives the resolved cell value (if any), the full
/// row object, and the row's index within the visible page.
pub type CellRender = Box<dyn Fn(Option<&Value>, &Value, usize) -> Cell<'static> + Send>;

/// Renders the toolbar strip above the table.
pub type ToolbarRender = Box<dyn Fn(&mut Frame<'_>, Rect, &Theme) + Send>;

/// Slot bindings for one table instance, keyed by column id.
#[derive(Default)]
pub struct Slots {
    cells: HashMap<String, CellRender>,
    toolbar: Option<ToolbarRender>,
}

impl Slots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cell renderer for the column with the given id.
    #[must_use]
    pub fn cell(
        mut self,
        column_id: impl Into<String>,
        render: impl Fn(Option<&Value>, &Value, usize) -> Cell<'static> + Send + 'static,
    ) -> Self {
        self.cells.insert(column_id.into(), Box::new(render));
        self
    }

    /// Register the toolbar renderer.
    #[must_use]
    pub fn toolbar(
        mut self,
        render: impl Fn(&mut Frame<'_>, Rect, &Theme) + Send + 'static,
    ) -> Self {
        self.toolbar = Some(Box::new(render));
        self
    }

    pub fn cell_for(&self, column_id: &str) -> Option<&CellRender> {
        self.cells.get(column_id)
    }

    pub fn has_cell(&self, column_id: &str) -> bool {
        self.cells.contains_key(column_id)
    }

    pub const fn toolbar_render(&self) -> Option<&ToolbarRender> {
        self.toolbar.as_ref()
    }
}
