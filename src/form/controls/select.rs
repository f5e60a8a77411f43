//! Option-backed controls: select, multi-select and radio.
//!
//! The currently selected option is resolved from the stored value with
//! loose equality (strict, then string, then numeric) so a value that
//! drifted to a different primitive type still finds its option.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use serde_json::Value;

use crate::Theme;
use crate::form::controls::{Control, FormEvent, field_block};
use crate::form::descriptor::FieldDescriptor;
use crate::form::options::loose_eq;
use crate::form::state::FormState;
use crate::keymap::{KeyResolver, NavAction};
use crate::ui::{Handled, Result};

const DROPDOWN_ROWS: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectMode {
    Single,
    Multi,
    Radio,
}

pub struct SelectControl {
    desc: FieldDescriptor,
    mode: SelectMode,
    open: bool,
    cursor: usize,
}

impl SelectControl {
    pub const fn single(desc: FieldDescriptor) -> Self {
        Self::with_mode(desc, SelectMode::Single)
    }

    pub const fn multi(desc: FieldDescriptor) -> Self {
        Self::with_mode(desc, SelectMode::Multi)
    }

    pub const fn radio(desc: FieldDescriptor) -> Self {
        Self::with_mode(desc, SelectMode::Radio)
    }

    const fn with_mode(desc: FieldDescriptor, mode: SelectMode) -> Self {
        Self {
            desc,
            mode,
            open: false,
            cursor: 0,
        }
    }

    fn changed(&self, value: Value) -> Handled<FormEvent> {
        FormEvent::Changed {
            name: self.desc.name.clone(),
            value,
        }
        .into()
    }

    /// Indices of options selected by the stored value.
    fn selected_indices(&self, state: &FormState) -> Vec<usize> {
        let stored = state.get(&self.desc.name);
        let members: Vec<&Value> = match (self.mode, stored) {
            (SelectMode::Multi, Value::Array(items)) => items.iter().collect(),
            (SelectMode::Multi, _) => Vec::new(),
            (_, value) => vec![value],
        };
        self.desc
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| members.iter().any(|m| loose_eq(&o.value, m)))
            .map(|(i, _)| i)
            .collect()
    }

    fn choose(&mut self, state: &mut FormState) -> Handled<FormEvent> {
        let Some(option) = self.desc.options.get(self.cursor) else {
            return Handled::Consumed;
        };
        match self.mode {
            SelectMode::Single | SelectMode::Radio => {
                self.open = false;
                state.set(&self.desc.name, option.value.clone());
                self.changed(option.value.clone())
            }
            SelectMode::Multi => {
                let mut members = match state.get(&self.desc.name) {
                    Value::Array(items) => items.clone(),
                    _ => Vec::new(),
                };
                if let Some(pos) = members.iter().position(|m| loose_eq(m, &option.value)) {
                    members.remove(pos);
                } else {
                    members.push(option.value.clone());
                }
                let value = Value::Array(members);
                state.set(&self.desc.name, value.clone());
                self.changed(value)
            }
        }
    }

    fn display_text(&self, state: &FormState) -> String {
        let selected = self.selected_indices(state);
        if selected.is_empty() {
            return String::new();
        }
        selected
            .iter()
            .filter_map(|&i| self.desc.options.get(i))
            .map(|o| o.label.clone())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Control for SelectControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn height(&self) -> u16 {
        if self.open {
            3 + (self.desc.options.len() as u16).min(DROPDOWN_ROWS)
        } else {
            3
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        state: &mut FormState,
        resolver: &KeyResolver,
    ) -> Result<Handled<FormEvent>> {
        if self.desc.disabled {
            return Ok(Handled::Ignored);
        }

        if self.mode == SelectMode::Radio {
            // Radio renders all options inline; left/right moves the choice.
            let count = self.desc.options.len();
            if count == 0 {
                return Ok(Handled::Ignored);
            }
            let current = self.selected_indices(state).first().copied();
            let next = match key.code {
                KeyCode::Right => Some(current.map_or(0, |i| (i + 1) % count)),
                KeyCode::Left => Some(current.map_or(0, |i| (i + count - 1) % count)),
                _ => None,
            };
            if let Some(next) = next {
                self.cursor = next;
                return Ok(self.choose(state));
            }
            if resolver.matches_nav(&key, NavAction::Select) {
                self.cursor = current.unwrap_or(0);
                return Ok(self.choose(state));
            }
            return Ok(Handled::Ignored);
        }

        if self.open {
            if resolver.matches_nav(&key, NavAction::Down) {
                self.cursor = (self.cursor + 1).min(self.desc.options.len().saturating_sub(1));
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Up) {
                self.cursor = self.cursor.saturating_sub(1);
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Select) {
                return Ok(self.choose(state));
            }
            if key.code == KeyCode::Esc {
                self.open = false;
                return Ok(Handled::Consumed);
            }
            return Ok(Handled::Consumed);
        }

        if resolver.matches_nav(&key, NavAction::Select) || key.code == KeyCode::Down {
            self.open = true;
            self.cursor = self.selected_indices(state).first().copied().unwrap_or(0);
            return Ok(Handled::Consumed);
        }

        Ok(Handled::Ignored)
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        focused: bool,
        theme: &Theme,
    ) {
        if self.mode == SelectMode::Radio {
            let current = self.selected_indices(state);
            let mut spans: Vec<Span> = Vec::new();
            for (i, option) in self.desc.options.iter().enumerate() {
                let marker = if current.contains(&i) { "(•) " } else { "( ) " };
                let style = if current.contains(&i) {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                spans.push(Span::styled(format!("{marker}{}  ", option.label), style));
            }
            let block = field_block(&self.desc, state, focused, theme);
            frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
            return;
        }

        let display = self.display_text(state);
        let marker = if self.open { "▾" } else { "▸" };
        let line = Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(theme.subtext)),
            Span::styled(display, Style::default().fg(theme.text)),
        ]);
        let block = field_block(&self.desc, state, focused, theme);
        let inner_rows = area.height.saturating_sub(2);

        let mut lines = vec![line];
        if self.open {
            let selected = self.selected_indices(state);
            let visible = self.desc.options.len().min(DROPDOWN_ROWS as usize);
            let first = self
                .cursor
                .saturating_sub(visible.saturating_sub(1))
                .min(self.desc.options.len().saturating_sub(visible));
            for (i, option) in self
                .desc
                .options
                .iter()
                .enumerate()
                .skip(first)
                .take(visible.min(inner_rows.saturating_sub(1) as usize))
            {
                let is_cursor = i == self.cursor;
                let is_selected = selected.contains(&i);
                let check = match (self.mode, is_selected) {
                    (SelectMode::Multi, true) => "[x] ",
                    (SelectMode::Multi, false) => "[ ] ",
                    (_, true) => "• ",
                    (_, false) => "  ",
                };
                let mut style = Style::default().fg(theme.text);
                if is_cursor {
                    style = style.bg(theme.selection_bg()).add_modifier(Modifier::BOLD);
                }
                lines.push(Line::from(Span::styled(
                    format!("{check}{}", option.label),
                    style,
                )));
            }
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::descriptor::FieldDescriptor;
    use crate::form::options::{SelectOption, find_option};
    use crate::form::schema::{FieldKind, FieldNode};
    use serde_json::json;

    fn descriptor(kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor::extract(
            &FieldNode::string("status").kind(kind).options(vec![
                SelectOption::new(1, "Open"),
                SelectOption::new(2, "Closed"),
                SelectOption::new(3, "Archived"),
            ]),
        )
        .unwrap()
    }

    fn press(
        control: &mut SelectControl,
        state: &mut FormState,
        code: KeyCode,
    ) -> Handled<FormEvent> {
        let resolver = KeyResolver::default();
        control
            .handle_key(KeyEvent::from(code), state, &resolver)
            .unwrap()
    }

    #[test]
    fn single_select_writes_the_option_value() {
        let mut state = FormState::new();
        let mut c = SelectControl::single(descriptor(FieldKind::Select));
        press(&mut c, &mut state, KeyCode::Enter); // open
        press(&mut c, &mut state, KeyCode::Down);
        press(&mut c, &mut state, KeyCode::Enter); // choose "Closed"
        assert_eq!(state.get("status"), &json!(2));
        assert!(!c.open);
    }

    #[test]
    fn stored_string_value_resolves_to_numeric_option() {
        let mut state = FormState::new();
        state.set("status", json!("2"));
        let c = SelectControl::single(descriptor(FieldKind::Select));
        assert_eq!(c.selected_indices(&state), vec![1]);
        assert_eq!(c.display_text(&state), "Closed");
        assert!(find_option(&c.desc.options, state.get("status")).is_some());
    }

    #[test]
    fn multi_select_toggles_membership() {
        let mut state = FormState::new();
        let mut c = SelectControl::multi(descriptor(FieldKind::MultiSelect));
        press(&mut c, &mut state, KeyCode::Enter); // open
        press(&mut c, &mut state, KeyCode::Enter); // toggle "Open"
        press(&mut c, &mut state, KeyCode::Down);
        press(&mut c, &mut state, KeyCode::Enter); // toggle "Closed"
        assert_eq!(state.get("status"), &json!([1, 2]));
        press(&mut c, &mut state, KeyCode::Up);
        press(&mut c, &mut state, KeyCode::Enter); // untoggle "Open"
        assert_eq!(state.get("status"), &json!([2]));
    }

    #[test]
    fn radio_moves_with_arrows() {
        let mut state = FormState::new();
        let mut c = SelectControl::radio(descriptor(FieldKind::Radio));
        press(&mut c, &mut state, KeyCode::Right);
        assert_eq!(state.get("status"), &json!(1));
        press(&mut c, &mut state, KeyCode::Right);
        assert_eq!(state.get("status"), &json!(2));
        press(&mut c, &mut state, KeyCode::Left);
        assert_eq!(state.get("status"), &json!(1));
    }

    #[test]
    fn open_dropdown_grows_the_control() {
        let mut state = FormState::new();
        let mut c = SelectControl::single(descriptor(FieldKind::Select));
        assert_eq!(c.height(), 3);
        press(&mut c, &mut state, KeyCode::Enter);
        assert_eq!(c.height(), 6);
    }
}
