//! Text-family controls: plain, password, numeric and masked input.
//!
//! The stored value is the string representation; transforms (trim, max
//! length, numeric/mask filtering) run on every change before the write,
//! so the store never holds a value the field would reject.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;

use crate::Theme;
use crate::form::controls::{Control, FormEvent, render_value_paragraph};
use crate::form::descriptor::FieldDescriptor;
use crate::form::options::value_label;
use crate::form::state::FormState;
use crate::keymap::KeyResolver;
use crate::ui::{Handled, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVariant {
    Plain,
    Password,
    Numeric,
    /// Uppercased alphanumeric input (IBAN-style reference fields).
    Masked,
}

pub struct TextControl {
    desc: FieldDescriptor,
    variant: TextVariant,
    cursor: usize,
}

impl TextControl {
    pub const fn new(desc: FieldDescriptor, variant: TextVariant) -> Self {
        Self {
            desc,
            variant,
            cursor: 0,
        }
    }

    fn current(&self, state: &FormState) -> String {
        value_label(state.get(&self.desc.name))
    }

    /// Apply the variant filter and the trim/max-length transforms.
    fn sanitize(&self, text: &str) -> String {
        let mut text: String = match self.variant {
            TextVariant::Plain | TextVariant::Password => text.to_string(),
            TextVariant::Numeric => sanitize_numeric(text),
            TextVariant::Masked => text
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        };
        if self.desc.trim {
            text = text.trim().to_string();
        }
        if let Some(max) = self.desc.max_length {
            // Numeric fields slice the decimal string representation
            // rather than rejecting the keystroke.
            text = text.chars().take(max).collect();
        }
        text
    }

    fn commit(&mut self, state: &mut FormState, text: String) -> Handled<FormEvent> {
        let text = self.sanitize(&text);
        self.cursor = self.cursor.min(text.len());
        state.set(&self.desc.name, Value::String(text.clone()));
        FormEvent::Changed {
            name: self.desc.name.clone(),
            value: Value::String(text),
        }
        .into()
    }

    fn prev_boundary(text: &str, from: usize) -> usize {
        text[..from]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(text: &str, from: usize) -> usize {
        text[from..]
            .chars()
            .next()
            .map_or(from, |c| from + c.len_utf8())
    }
}

impl Control for TextControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        state: &mut FormState,
        _resolver: &KeyResolver,
    ) -> Result<Handled<FormEvent>> {
        if self.desc.disabled {
            return Ok(Handled::Ignored);
        }

        let mut text = self.current(state);
        self.cursor = self.cursor.min(text.len());

        Ok(match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                text.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                self.commit(state, text)
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    let prev = Self::prev_boundary(&text, self.cursor);
                    text.remove(prev);
                    self.cursor = prev;
                    self.commit(state, text)
                } else {
                    Handled::Consumed
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor < text.len() {
                    text.remove(self.cursor);
                    self.commit(state, text)
                } else {
                    Handled::Consumed
                }
            }
            (KeyCode::Left, _) => {
                self.cursor = Self::prev_boundary(&text, self.cursor);
                Handled::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = Self::next_boundary(&text, self.cursor);
                Handled::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                Handled::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = text.len();
                Handled::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                self.commit(state, String::new())
            }
            _ => Handled::Ignored,
        })
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        focused: bool,
        theme: &Theme,
    ) {
        let text = self.current(state);
        let display = if self.variant == TextVariant::Password {
            "*".repeat(text.chars().count())
        } else {
            text
        };
        render_value_paragraph(
            frame,
            area,
            &self.desc,
            state,
            &display,
            self.cursor,
            focused,
            theme,
        );
    }
}

/// Keep digits, at most one decimal separator and a leading minus.
fn sanitize_numeric(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut seen_separator = false;
    for (i, c) in text.chars().enumerate() {
        match c {
            '0'..='9' => out.push(c),
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                out.push('.');
            }
            '-' if i == 0 => out.push('-'),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::{FieldKind, FieldNode};

    fn control(node: FieldNode, variant: TextVariant) -> TextControl {
        TextControl::new(FieldDescriptor::extract(&node).unwrap(), variant)
    }

    fn press(control: &mut TextControl, state: &mut FormState, code: KeyCode) {
        let resolver = KeyResolver::default();
        control
            .handle_key(KeyEvent::from(code), state, &resolver)
            .unwrap();
    }

    fn type_str(control: &mut TextControl, state: &mut FormState, text: &str) {
        for c in text.chars() {
            press(control, state, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_writes_through_to_the_store() {
        let mut state = FormState::new();
        let mut c = control(FieldNode::string("name"), TextVariant::Plain);
        type_str(&mut c, &mut state, "acme");
        assert_eq!(state.get("name"), &Value::String("acme".into()));
        press(&mut c, &mut state, KeyCode::Backspace);
        assert_eq!(state.get("name"), &Value::String("acm".into()));
    }

    #[test]
    fn numeric_filters_and_slices_to_max_length() {
        let mut state = FormState::new();
        let mut c = control(
            FieldNode::number("amount").kind(FieldKind::Numeric).max_length(5),
            TextVariant::Numeric,
        );
        type_str(&mut c, &mut state, "12x3,4567");
        // 'x' dropped, ',' normalized to '.', sliced to 5 chars
        assert_eq!(state.get("amount"), &Value::String("123.4".into()));
    }

    #[test]
    fn masked_uppercases_and_strips_non_alphanumerics() {
        let mut state = FormState::new();
        let mut c = control(
            FieldNode::string("iban").kind(FieldKind::Masked),
            TextVariant::Masked,
        );
        type_str(&mut c, &mut state, "tr12 0061");
        assert_eq!(state.get("iban"), &Value::String("TR120061".into()));
    }

    #[test]
    fn trim_runs_before_the_write() {
        let mut state = FormState::new();
        let mut c = control(FieldNode::string("code").trim(), TextVariant::Plain);
        type_str(&mut c, &mut state, "ab");
        press(&mut c, &mut state, KeyCode::Char(' '));
        assert_eq!(state.get("code"), &Value::String("ab".into()));
    }

    #[test]
    fn disabled_control_ignores_input() {
        let mut state = FormState::new();
        let mut c = control(FieldNode::string("ro").disabled(true), TextVariant::Plain);
        let resolver = KeyResolver::default();
        let handled = c
            .handle_key(KeyEvent::from(KeyCode::Char('x')), &mut state, &resolver)
            .unwrap();
        assert_eq!(handled, Handled::Ignored);
        assert_eq!(state.get("ro"), &Value::Null);
    }
}
