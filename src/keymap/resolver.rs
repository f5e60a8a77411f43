use crossterm::event::KeyEvent;
use std::sync::Arc;

use crate::keymap::actions::{FormAction, NavAction, TableAction};
use crate::keymap::bindings::KeymapConfig;

pub struct KeyResolver {
    pub keymap: Arc<KeymapConfig>,
}

impl KeyResolver {
    pub const fn new(keymap: Arc<KeymapConfig>) -> Self {
        Self { keymap }
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keymap.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keymap.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keymap.form;
        match action {
            FormAction::NextField => kb.next_field.matches(event),
            FormAction::PrevField => kb.prev_field.matches(event),
            FormAction::Submit => kb.submit.matches(event),
            FormAction::Cancel => kb.cancel.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keymap.form;
        match action {
            FormAction::NextField => kb.next_field.display(),
            FormAction::PrevField => kb.prev_field.display(),
            FormAction::Submit => kb.submit.display(),
            FormAction::Cancel => kb.cancel.display(),
        }
    }

    pub fn matches_table(&self, event: &KeyEvent, action: TableAction) -> bool {
        let kb = &self.keymap.table;
        match action {
            TableAction::ToggleRow => kb.toggle_row.matches(event),
            TableAction::ToggleAll => kb.toggle_all.matches(event),
            TableAction::ClearSelection => kb.clear_selection.matches(event),
            TableAction::SortColumn => kb.sort_column.matches(event),
            TableAction::SortReverse => kb.sort_reverse.matches(event),
            TableAction::NextPage => kb.next_page.matches(event),
            TableAction::PrevPage => kb.prev_page.matches(event),
            TableAction::PageSize => kb.page_size.matches(event),
            TableAction::Collapse => kb.collapse.matches(event),
        }
    }

    pub fn display_table(&self, action: TableAction) -> String {
        let kb = &self.keymap.table;
        match action {
            TableAction::ToggleRow => kb.toggle_row.display(),
            TableAction::ToggleAll => kb.toggle_all.display(),
            TableAction::ClearSelection => kb.clear_selection.display(),
            TableAction::SortColumn => kb.sort_column.display(),
            TableAction::SortReverse => kb.sort_reverse.display(),
            TableAction::NextPage => kb.next_page.display(),
            TableAction::PrevPage => kb.prev_page.display(),
            TableAction::PageSize => kb.page_size.display(),
            TableAction::Collapse => kb.collapse.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeymapConfig::default()))
    }
}
