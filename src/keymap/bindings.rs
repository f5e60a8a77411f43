use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::keymap::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavBindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormBindings {
    pub next_field: KeyBinding,
    pub prev_field: KeyBinding,
    pub submit: KeyBinding,
    pub cancel: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBindings {
    pub toggle_row: KeyBinding,
    pub toggle_all: KeyBinding,
    pub clear_selection: KeyBinding,
    pub sort_column: KeyBinding,
    pub sort_reverse: KeyBinding,
    pub next_page: KeyBinding,
    pub prev_page: KeyBinding,
    pub page_size: KeyBinding,
    pub collapse: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeymapConfig {
    #[serde(default)]
    pub navigation: NavBindings,
    #[serde(default)]
    pub form: FormBindings,
    #[serde(default)]
    pub table: TableBindings,
}

impl Default for NavBindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for FormBindings {
    fn default() -> Self {
        Self {
            next_field: Key::new(KeyCode::Tab).into(),
            prev_field: Key::new(KeyCode::BackTab).into(),
            submit: Key::with_ctrl(KeyCode::Char('s')).into(),
            cancel: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for TableBindings {
    fn default() -> Self {
        Self {
            toggle_row: Key::new(KeyCode::Char(' ')).into(),
            toggle_all: Key::new(KeyCode::Char('a')).into(),
            clear_selection: Key::new(KeyCode::Char('u')).into(),
            sort_column: Key::new(KeyCode::Char('s')).into(),
            sort_reverse: Key::new(KeyCode::Char('o')).into(),
            next_page: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Right),
            ]),
            prev_page: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('p')),
                Key::new(KeyCode::Left),
            ]),
            page_size: Key::new(KeyCode::Char('r')).into(),
            collapse: Key::new(KeyCode::Char('x')).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_round_trips_through_toml() {
        let config = KeymapConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: KeymapConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.navigation.down, config.navigation.down);
        assert_eq!(parsed.table.toggle_row, config.table.toggle_row);
        assert_eq!(parsed.form.submit, config.form.submit);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: KeymapConfig = toml::from_str(
            r#"
            [table]
            toggle_row = "t"
            toggle_all = "A"
            clear_selection = "u"
            sort_column = "s"
            sort_reverse = "o"
            next_page = "n"
            prev_page = "p"
            page_size = "r"
            collapse = "x"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.table.toggle_row,
            Key::new(KeyCode::Char('t')).into()
        );
        assert_eq!(parsed.navigation.select, NavBindings::default().select);
    }
}
