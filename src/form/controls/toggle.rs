//! Boolean controls: checkbox and switch.

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
use crate::form::state::FormState;
use crate::keymap::{KeyResolver, NavAction};
use crate::ui::{Handled, Result};

fn is_on(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn toggled_value(current: &Value, numeric: bool) -> Value {
    let next = !is_on(current);
    if numeric {
        Value::from(i32::from(next))
    } else {
        Value::Bool(next)
    }
}

pub struct CheckboxControl {
    desc: FieldDescriptor,
}

impl CheckboxControl {
    pub const fn new(desc: FieldDescriptor) -> Self {
        Self { desc }
    }
}

impl Control for CheckboxControl {
    fn name(&self) -> &str {
        &self.desc.name
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
        if resolver.matches_nav(&key, NavAction::Select) || key.code == KeyCode::Char(' ') {
            let value = toggled_value(state.get(&self.desc.name), false);
            state.set(&self.desc.name, value.clone());
            return Ok(FormEvent::Changed {
                name: self.desc.name.clone(),
                value,
            }
            .into());
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
        let on = is_on(state.get(&self.desc.name));
        let marker = if on { "[x]" } else { "[ ]" };
        let style = if on {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let block = field_block(&self.desc, state, focused, theme);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(marker.to_string(), style))).block(block),
            area,
        );
    }
}

/// Switch with an optional numeric-coded (1/0) storage variant.
pub struct SwitchControl {
    desc: FieldDescriptor,
}

impl SwitchControl {
    pub const fn new(desc: FieldDescriptor) -> Self {
        Self { desc }
    }
}

impl Control for SwitchControl {
    fn name(&self) -> &str {
        &self.desc.name
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
        if resolver.matches_nav(&key, NavAction::Select) || key.code == KeyCode::Char(' ') {
            let value = toggled_value(state.get(&self.desc.name), self.desc.numeric_switch);
            state.set(&self.desc.name, value.clone());
            return Ok(FormEvent::Changed {
                name: self.desc.name.clone(),
                value,
            }
            .into());
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
        let on = is_on(state.get(&self.desc.name));
        let (marker, style) = if on {
            (
                " ON ●",
                Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
            )
        } else {
            ("● OFF", Style::default().fg(theme.subtext))
        };
        let block = field_block(&self.desc, state, focused, theme);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(marker.to_string(), style))).block(block),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::{FieldKind, FieldNode};
    use serde_json::json;

    #[test]
    fn checkbox_toggles_booleans() {
        let desc = FieldDescriptor::extract(&FieldNode::boolean("active")).unwrap();
        let mut control = CheckboxControl::new(desc);
        let mut state = FormState::new();
        let resolver = KeyResolver::default();

        control
            .handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &resolver)
            .unwrap();
        assert_eq!(state.get("active"), &json!(true));
        control
            .handle_key(KeyEvent::from(KeyCode::Char(' ')), &mut state, &resolver)
            .unwrap();
        assert_eq!(state.get("active"), &json!(false));
    }

    #[test]
    fn numeric_switch_stores_one_and_zero() {
        let desc = FieldDescriptor::extract(
            &FieldNode::boolean("enabled")
                .kind(FieldKind::Switch)
                .numeric_switch(),
        )
        .unwrap();
        let mut control = SwitchControl::new(desc);
        let mut state = FormState::new();
        let resolver = KeyResolver::default();

        control
            .handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &resolver)
            .unwrap();
        assert_eq!(state.get("enabled"), &json!(1));
        control
            .handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &resolver)
            .unwrap();
        assert_eq!(state.get("enabled"), &json!(0));
    }

    #[test]
    fn switch_accepts_numeric_coded_current_values() {
        assert!(is_on(&json!(1)));
        assert!(!is_on(&json!(0)));
        assert!(is_on(&json!("true")));
        assert!(!is_on(&Value::Null));
    }
}
