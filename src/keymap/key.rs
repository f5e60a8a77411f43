use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                // Uppercase chars imply shift, so mask it out of the
                // modifier comparison and compare the chars themselves.
                let chars_match = a == b;
                let expected = self.modifiers & !KeyModifiers::SHIFT;
                let actual = event.modifiers & !KeyModifiers::SHIFT;
                chars_match && expected == actual
            }
            _ => self.code == event.code && self.modifiers == event.modifiers,
        }
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("shift".to_string());
        }

        let key_str = match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => "backtab".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pageup".to_string(),
            KeyCode::PageDown => "pagedown".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => "?".to_string(),
        };

        parts.push(key_str);
        parts.join("+")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('+').collect();

        let mut modifiers = KeyModifiers::NONE;
        let key_part = parts.last().copied().unwrap_or(s);

        for part in &parts[..parts.len().saturating_sub(1)] {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                other => return Err(format!("Unknown modifier: {other}")),
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            lower => {
                if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    KeyCode::F(n)
                } else if key_part.chars().count() == 1 {
                    // Preserve the original case for single chars.
                    KeyCode::Char(key_part.chars().next().unwrap_or(' '))
                } else {
                    return Err(format!("Unknown key: {key_part}"));
                }
            }
        };

        Ok(Self { code, modifiers })
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One logical action bound to one or more keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    keys: Vec<Key>,
}

impl KeyBinding {
    pub fn multiple(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| k.matches(event))
    }

    /// Human-readable form for help lines, e.g. `"j / down"`.
    pub fn display(&self) -> String {
        self.keys
            .iter()
            .map(Key::display)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self { keys: vec![key] }
    }
}

impl Serialize for KeyBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.keys.len() == 1 {
            self.keys[0].serialize(serializer)
        } else {
            self.keys.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for KeyBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(Key),
            Many(Vec<Key>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(key) => key.into(),
            OneOrMany::Many(keys) => Self { keys },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn parse_plain_and_modified_keys() {
        assert_eq!("s".parse::<Key>().unwrap(), Key::new(KeyCode::Char('s')));
        assert_eq!(
            "ctrl+s".parse::<Key>().unwrap(),
            Key::with_ctrl(KeyCode::Char('s'))
        );
        assert_eq!("space".parse::<Key>().unwrap(), Key::new(KeyCode::Char(' ')));
        assert_eq!("pagedown".parse::<Key>().unwrap(), Key::new(KeyCode::PageDown));
        assert!("hyper+x".parse::<Key>().is_err());
        assert!("notakey".parse::<Key>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for s in ["ctrl+s", "esc", "space", "backtab", "f5", "alt+enter"] {
            let key: Key = s.parse().unwrap();
            assert_eq!(key.display().parse::<Key>().unwrap(), key);
        }
    }

    #[test]
    fn uppercase_char_matches_with_shift_modifier() {
        let key = Key::new(KeyCode::Char('G'));
        assert!(key.matches(&event(KeyCode::Char('G'), KeyModifiers::SHIFT)));
        assert!(!key.matches(&event(KeyCode::Char('g'), KeyModifiers::NONE)));
    }

    #[test]
    fn binding_matches_any_of_its_keys() {
        let binding =
            KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]);
        assert!(binding.matches(&event(KeyCode::Down, KeyModifiers::NONE)));
        assert!(binding.matches(&event(KeyCode::Char('j'), KeyModifiers::NONE)));
        assert!(!binding.matches(&event(KeyCode::Char('k'), KeyModifiers::NONE)));
        assert_eq!(binding.display(), "j / down");
    }
}
