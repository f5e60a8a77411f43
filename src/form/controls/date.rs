//! Date input, `dd.MM.yyyy` display format.
//!
//! While editing, the store carries the raw typed text; it is normalized
//! to the ISO date (`yyyy-mm-dd`) only once all ten characters are in
//! place and parse. Normalizing any earlier would rewrite the text under
//! the cursor mid-keystroke (a four-digit year parses from its first
//! digit on).

use chrono::NaiveDate;
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

pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";
pub const STORE_FORMAT: &str = "%Y-%m-%d";

const COMPLETE_LEN: usize = "31.12.2024".len();

pub struct DateControl {
    desc: FieldDescriptor,
    cursor: usize,
}

impl DateControl {
    pub const fn new(desc: FieldDescriptor) -> Self {
        Self { desc, cursor: 0 }
    }

    fn display_text(&self, state: &FormState) -> String {
        let raw = value_label(state.get(&self.desc.name));
        NaiveDate::parse_from_str(&raw, STORE_FORMAT)
            .map_or(raw, |d| d.format(DISPLAY_FORMAT).to_string())
    }

    fn commit(&mut self, state: &mut FormState, text: String) -> Handled<FormEvent> {
        let value = if text.len() == COMPLETE_LEN {
            NaiveDate::parse_from_str(&text, DISPLAY_FORMAT).map_or_else(
                |_| Value::String(text),
                |d| Value::String(d.format(STORE_FORMAT).to_string()),
            )
        } else {
            Value::String(text)
        };
        state.set(&self.desc.name, value.clone());
        FormEvent::Changed {
            name: self.desc.name.clone(),
            value,
        }
        .into()
    }
}

impl Control for DateControl {
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

        let mut text = self.display_text(state);
        self.cursor = self.cursor.min(text.len());

        Ok(match (key.code, key.modifiers) {
            (KeyCode::Char(c @ ('0'..='9' | '.')), KeyModifiers::NONE) => {
                text.insert(self.cursor, c);
                self.cursor += 1;
                self.commit(state, text)
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    text.remove(self.cursor);
                    self.commit(state, text)
                } else {
                    Handled::Consumed
                }
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                Handled::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(text.len());
                Handled::Consumed
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
        let display = self.display_text(state);
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
