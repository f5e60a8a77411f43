//! Form renderer: schema in, bound control grid out.
//!
//! Iterates the schema's field set, extracts a descriptor per field and
//! dispatches to the matching control. Fields pack left-to-right into
//! 12-unit grid rows by their column span; invisible fields keep their
//! position in the control list (stable focus order) but consume no area.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::Theme;
use crate::form::controls::{Control, FormEvent, build_control};
use crate::form::descriptor::{FULL_WIDTH, FieldDescriptor};
use crate::form::schema::FormSchema;
use crate::form::state::FormState;
use crate::keymap::{FormAction, KeyResolver};
use crate::ui::{Component, Handled, Result};

pub struct FormRenderer {
    schema: FormSchema,
    descriptors: Vec<FieldDescriptor>,
    controls: Vec<Box<dyn Control>>,
    state: FormState,
    focused: usize,
    resolver: Arc<KeyResolver>,
}

impl FormRenderer {
    /// Build the renderer for a schema.
    ///
    /// # Errors
    ///
    /// Propagates descriptor extraction failures (configuration errors,
    /// e.g. a select field without options).
    pub fn new(schema: FormSchema, resolver: Arc<KeyResolver>) -> Result<Self> {
        let mut renderer = Self {
            schema: FormSchema::new(),
            descriptors: Vec::new(),
            controls: Vec::new(),
            state: FormState::new(),
            focused: 0,
            resolver,
        };
        renderer.set_schema(schema)?;
        Ok(renderer)
    }

    /// Replace the schema, recomputing all descriptors and controls.
    /// Current values survive; fields new to the schema get their
    /// defaults seeded.
    pub fn set_schema(&mut self, schema: FormSchema) -> Result<()> {
        let descriptors = schema
            .fields
            .iter()
            .map(FieldDescriptor::extract)
            .collect::<Result<Vec<_>>>()?;
        let controls = descriptors
            .iter()
            .map(build_control)
            .collect::<Result<Vec<_>>>()?;
        self.schema = schema;
        self.descriptors = descriptors;
        self.controls = controls;
        self.state.seed_defaults(&self.descriptors);
        self.focused = self.first_focusable().unwrap_or(0);
        Ok(())
    }

    pub const fn state(&self) -> &FormState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub const fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Reset all values to the field defaults.
    pub fn reset(&mut self) {
        self.state.reset(&self.descriptors);
    }

    pub fn focused_field(&self) -> Option<&str> {
        self.controls.get(self.focused).map(|c| c.name())
    }

    /// Move focus to the named field, if it is focusable.
    pub fn focus(&mut self, name: &str) {
        if let Some(i) = self
            .controls
            .iter()
            .position(|c| c.name() == name && c.focusable())
            && self.descriptors[i].visible
        {
            self.focused = i;
        }
    }

    fn is_focusable(&self, i: usize) -> bool {
        self.descriptors[i].visible && self.controls[i].focusable()
    }

    fn first_focusable(&self) -> Option<usize> {
        (0..self.controls.len()).find(|&i| self.is_focusable(i))
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.controls.len();
        if count == 0 {
            return;
        }
        let mut i = self.focused;
        for _ in 0..count {
            i = if forward { (i + 1) % count } else { (i + count - 1) % count };
            if self.is_focusable(i) {
                self.focused = i;
                return;
            }
        }
    }
}

impl Component for FormRenderer {
    type Output = FormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        if let Some(control) = self.controls.get_mut(self.focused)
            && self.descriptors[self.focused].visible
        {
            let handled = control.handle_key(key, &mut self.state, &self.resolver)?;
            if handled.is_consumed() {
                return Ok(handled);
            }
        }

        if self.resolver.matches_form(&key, FormAction::NextField) {
            self.move_focus(true);
            return Ok(Handled::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::PrevField) {
            self.move_focus(false);
            return Ok(Handled::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(FormEvent::Submitted.into());
        }
        if self.resolver.matches_form(&key, FormAction::Cancel) {
            return Ok(FormEvent::Cancelled.into());
        }

        Ok(Handled::Ignored)
    }

    fn on_tick(&mut self) {
        for control in &mut self.controls {
            control.on_tick(&self.state);
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) -> Result<()> {
        let mut y = area.y;

        for row in pack_rows(&self.descriptors) {
            let row_height = row
                .iter()
                .map(|&i| self.controls[i].height())
                .max()
                .unwrap_or(0);
            let row_margin = row.iter().map(|&i| self.descriptors[i].mb).max().unwrap_or(0);
            if row_height == 0 {
                continue;
            }
            if y + row_height > area.y + area.height {
                break;
            }

            let row_area = Rect::new(area.x, y, area.width, row_height);
            let mut constraints: Vec<Constraint> = row
                .iter()
                .map(|&i| Constraint::Ratio(u32::from(self.descriptors[i].col), u32::from(FULL_WIDTH)))
                .collect();
            constraints.push(Constraint::Min(0));
            let cells = Layout::horizontal(constraints).split(row_area);

            for (cell, &i) in cells.iter().zip(row.iter()) {
                let focused = i == self.focused;
                let height = self.controls[i].height().min(cell.height);
                let cell = Rect::new(cell.x, cell.y, cell.width, height);
                self.controls[i].render(frame, cell, &self.state, focused, theme);
            }

            y += row_height + row_margin;
        }

        Ok(())
    }
}

/// Pack visible fields into grid rows of at most 12 span units.
/// Invisible fields are dropped from layout but keep their indices.
fn pack_rows(descriptors: &[FieldDescriptor]) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used: u8 = 0;

    for (i, desc) in descriptors.iter().enumerate() {
        if !desc.visible {
            continue;
        }
        if used + desc.col > FULL_WIDTH && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(i);
        used += desc.col;
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}
