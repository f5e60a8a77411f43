//! Autocomplete controls.
//!
//! [`AutocompleteControl`] filters a static option list locally with fuzzy
//! matching. [`AsyncAutocompleteControl`] dispatches debounced searches to
//! an [`OptionSource`] on a spawned task; every search captures its own
//! cancellation token and generation number, and only the most recently
//! started search may apply its result ("last started wins", not last
//! finished). Dropping the control cancels anything still in flight.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::Theme;
use crate::form::controls::{Control, FormEvent, field_block, value_line};
use crate::form::descriptor::FieldDescriptor;
use crate::form::options::{SelectOption, find_option, value_label};
use crate::form::state::FormState;
use crate::keymap::{KeyResolver, NavAction};
use crate::ui::{Handled, Result};

const DROPDOWN_ROWS: u16 = 6;
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Result of one search invocation, tagged with the generation that
/// started it.
struct SearchOutcome {
    generation: u64,
    entries: Vec<Value>,
}

/// Sync autocomplete over a static option list, filtered fuzzily.
pub struct AutocompleteControl {
    desc: FieldDescriptor,
    matcher: SkimMatcherV2,
    text: String,
    cursor: usize,
    open: bool,
    typing: bool,
    filtered: Vec<usize>,
    list_cursor: usize,
    last_value: Option<Value>,
}

impl AutocompleteControl {
    pub fn new(desc: FieldDescriptor) -> Self {
        let filtered = (0..desc.options.len()).collect();
        Self {
            desc,
            matcher: SkimMatcherV2::default(),
            text: String::new(),
            cursor: 0,
            open: false,
            typing: false,
            filtered,
            list_cursor: 0,
            last_value: None,
        }
    }

    fn refilter(&mut self) {
        let query = self.text.to_lowercase();
        self.filtered = self
            .desc
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| {
                query.is_empty() || self.matcher.fuzzy_match(&o.label, &query).is_some()
            })
            .map(|(i, _)| i)
            .collect();
        self.list_cursor = self.list_cursor.min(self.filtered.len().saturating_sub(1));
    }

    fn select_current(&mut self, state: &mut FormState) -> Handled<FormEvent> {
        let Some(&idx) = self.filtered.get(self.list_cursor) else {
            return Handled::Consumed;
        };
        let option = self.desc.options[idx].clone();
        state.set(&self.desc.name, option.value.clone());
        self.text = option.label;
        self.cursor = self.text.len();
        self.typing = false;
        self.open = false;
        self.last_value = Some(option.value.clone());
        FormEvent::Changed {
            name: self.desc.name.clone(),
            value: option.value,
        }
        .into()
    }
}

impl Control for AutocompleteControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn height(&self) -> u16 {
        if self.open {
            3 + (self.filtered.len() as u16).clamp(1, DROPDOWN_ROWS)
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

        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.text.insert(self.cursor.min(self.text.len()), c);
                self.cursor += c.len_utf8();
                self.typing = true;
                self.open = true;
                self.refilter();
                return Ok(Handled::Consumed);
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    let prev = self.text[..self.cursor]
                        .char_indices()
                        .next_back()
                        .map_or(0, |(i, _)| i);
                    self.text.remove(prev);
                    self.cursor = prev;
                    self.typing = true;
                    self.open = true;
                    self.refilter();
                }
                return Ok(Handled::Consumed);
            }
            _ => {}
        }

        if self.open {
            if resolver.matches_nav(&key, NavAction::Down) {
                self.list_cursor =
                    (self.list_cursor + 1).min(self.filtered.len().saturating_sub(1));
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Up) {
                self.list_cursor = self.list_cursor.saturating_sub(1);
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Select) {
                return Ok(self.select_current(state));
            }
            if key.code == KeyCode::Esc {
                self.open = false;
                return Ok(Handled::Consumed);
            }
            return Ok(Handled::Consumed);
        }

        if key.code == KeyCode::Down || resolver.matches_nav(&key, NavAction::Select) {
            self.open = true;
            self.refilter();
            return Ok(Handled::Consumed);
        }

        Ok(Handled::Ignored)
    }

    fn on_tick(&mut self, state: &FormState) {
        // Resync the visible text when the value changed under us and the
        // user is not mid-typing (e.g. a form reset).
        if self.typing {
            return;
        }
        let stored = state.get(&self.desc.name);
        if self.last_value.as_ref() == Some(stored) {
            return;
        }
        self.last_value = Some(stored.clone());
        self.text = find_option(&self.desc.options, stored)
            .map_or_else(|| value_label(stored), |o| o.label.clone());
        self.cursor = self.text.len();
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        focused: bool,
        theme: &Theme,
    ) {
        let block = field_block(&self.desc, state, focused, theme);
        let mut lines = vec![value_line(
            &self.text,
            self.cursor,
            focused,
            self.desc.disabled,
            theme,
        )];
        if self.open {
            render_dropdown_lines(
                &mut lines,
                self.filtered
                    .iter()
                    .filter_map(|&i| self.desc.options.get(i)),
                self.list_cursor,
                area,
                theme,
            );
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Async autocomplete bound to a remote option source.
pub struct AsyncAutocompleteControl {
    desc: FieldDescriptor,
    text: String,
    cursor: usize,
    /// Dropdown visibility.
    open: bool,
    /// True while the user is actively editing; suppresses external resync.
    typing: bool,
    /// True once the user has ever interacted; opening without prior
    /// interaction must not fire a search.
    interacted: bool,
    loading: bool,
    options: Vec<SelectOption>,
    list_cursor: usize,
    generation: u64,
    token: CancellationToken,
    debounce: Duration,
    results_tx: UnboundedSender<SearchOutcome>,
    results_rx: UnboundedReceiver<SearchOutcome>,
    last_value: Option<Value>,
}

impl AsyncAutocompleteControl {
    pub fn new(desc: FieldDescriptor) -> Self {
        let (results_tx, results_rx) = unbounded_channel();
        Self {
            desc,
            text: String::new(),
            cursor: 0,
            open: false,
            typing: false,
            interacted: false,
            loading: false,
            options: Vec::new(),
            list_cursor: 0,
            generation: 0,
            token: CancellationToken::new(),
            debounce: DEFAULT_DEBOUNCE,
            results_tx,
            results_rx,
            last_value: None,
        }
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Cancel the in-flight search and, if the query is long enough,
    /// dispatch a new debounced one under a fresh generation.
    fn schedule_search(&mut self) {
        self.token.cancel();
        self.generation += 1;

        if self.text.chars().count() < self.desc.min_search_length {
            self.loading = false;
            return;
        }
        let Some(source) = self.desc.on_search.clone() else {
            return;
        };

        self.token = CancellationToken::new();
        self.loading = true;

        let token = self.token.clone();
        let tx = self.results_tx.clone();
        let query = self.text.clone();
        let generation = self.generation;
        let debounce = self.debounce;
        let name = self.desc.name.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = sleep(debounce) => {}
            }
            let result = tokio::select! {
                () = token.cancelled() => return,
                result = source.search(&query) => result,
            };
            if token.is_cancelled() {
                return;
            }
            let entries = match result {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::error!(field = %name, %error, "autocomplete search failed");
                    Vec::new()
                }
            };
            let _ = tx.send(SearchOutcome {
                generation,
                entries,
            });
        });
    }

    fn apply_results(&mut self) {
        while let Ok(outcome) = self.results_rx.try_recv() {
            // A result from a superseded search must never overwrite a
            // later keystroke's result.
            if outcome.generation != self.generation {
                continue;
            }
            let Some(accessors) = &self.desc.entries else {
                continue;
            };
            self.options = outcome
                .entries
                .iter()
                .map(|entry| accessors.project(entry))
                .collect();
            self.list_cursor = 0;
            self.loading = false;
        }
    }

    fn select_current(&mut self, state: &mut FormState) -> Handled<FormEvent> {
        let Some(option) = self.options.get(self.list_cursor).cloned() else {
            return Handled::Consumed;
        };
        state.set(&self.desc.name, option.value.clone());
        self.text = option.label;
        self.cursor = self.text.len();
        self.typing = false;
        self.open = false;
        self.last_value = Some(option.value.clone());
        FormEvent::Changed {
            name: self.desc.name.clone(),
            value: option.value,
        }
        .into()
    }

    fn edit(&mut self, edit: impl FnOnce(&mut String, &mut usize)) {
        edit(&mut self.text, &mut self.cursor);
        self.typing = true;
        self.interacted = true;
        self.open = true;
        self.schedule_search();
    }
}

impl Control for AsyncAutocompleteControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn height(&self) -> u16 {
        if self.open {
            3 + (self.options.len() as u16).clamp(1, DROPDOWN_ROWS)
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

        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.edit(|text, cursor| {
                    text.insert((*cursor).min(text.len()), c);
                    *cursor += c.len_utf8();
                });
                return Ok(Handled::Consumed);
            }
            (KeyCode::Backspace, _) => {
                self.edit(|text, cursor| {
                    if *cursor > 0 {
                        let prev = text[..*cursor]
                            .char_indices()
                            .next_back()
                            .map_or(0, |(i, _)| i);
                        text.remove(prev);
                        *cursor = prev;
                    }
                });
                return Ok(Handled::Consumed);
            }
            _ => {}
        }

        if self.open {
            if resolver.matches_nav(&key, NavAction::Down) {
                self.list_cursor =
                    (self.list_cursor + 1).min(self.options.len().saturating_sub(1));
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Up) {
                self.list_cursor = self.list_cursor.saturating_sub(1);
                return Ok(Handled::Consumed);
            }
            if resolver.matches_nav(&key, NavAction::Select) {
                return Ok(self.select_current(state));
            }
            if key.code == KeyCode::Esc {
                self.open = false;
                return Ok(Handled::Consumed);
            }
            return Ok(Handled::Consumed);
        }

        if key.code == KeyCode::Down || resolver.matches_nav(&key, NavAction::Select) {
            self.open = true;
            // Opening on first focus is not an interaction; only a user who
            // already typed gets a re-search.
            if self.interacted
                && self.text.chars().count() >= self.desc.min_search_length
            {
                self.schedule_search();
            }
            return Ok(Handled::Consumed);
        }

        Ok(Handled::Ignored)
    }

    fn on_tick(&mut self, state: &FormState) {
        self.apply_results();

        if self.typing {
            return;
        }
        let stored = state.get(&self.desc.name);
        if self.last_value.as_ref() == Some(stored) {
            return;
        }
        self.last_value = Some(stored.clone());
        self.text = if stored.is_null() {
            String::new()
        } else {
            find_option(&self.options, stored)
                .map_or_else(|| value_label(stored), |o| o.label.clone())
        };
        self.cursor = self.text.len();
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        focused: bool,
        theme: &Theme,
    ) {
        let block = field_block(&self.desc, state, focused, theme);
        let mut first = value_line(&self.text, self.cursor, focused, self.desc.disabled, theme);
        if self.loading {
            first.push_span(Span::styled(
                "  searching…",
                Style::default().fg(theme.subtext),
            ));
        }
        let mut lines = vec![first];
        if self.open {
            render_dropdown_lines(
                &mut lines,
                self.options.iter(),
                self.list_cursor,
                area,
                theme,
            );
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Drop for AsyncAutocompleteControl {
    fn drop(&mut self) {
        // No stale callback may outlive the control.
        self.token.cancel();
    }
}

fn render_dropdown_lines<'a>(
    lines: &mut Vec<Line<'a>>,
    options: impl Iterator<Item = &'a SelectOption>,
    list_cursor: usize,
    area: Rect,
    theme: &Theme,
) {
    let inner_rows = area.height.saturating_sub(3) as usize;
    for (i, option) in options.take(inner_rows.min(DROPDOWN_ROWS as usize)).enumerate() {
        let mut style = Style::default().fg(theme.text);
        if i == list_cursor {
            style = style.bg(theme.selection_bg()).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(option.label.clone(), style)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::options::EntryAccessors;
    use crate::form::schema::{FieldKind, FieldNode};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl crate::form::OptionSource for CountingSource {
        async fn search(&self, query: &str) -> color_eyre::Result<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![json!({"id": 1, "name": format!("match for {query}")})])
        }
    }

    fn async_control(
        source: Option<Arc<dyn crate::form::OptionSource>>,
        min_len: usize,
    ) -> AsyncAutocompleteControl {
        let mut node = FieldNode::string("customer")
            .kind(FieldKind::AsyncAutocomplete)
            .entries(EntryAccessors::fields("id", "name"))
            .min_search_length(min_len);
        if let Some(source) = source {
            node = node.on_search(source);
        }
        AsyncAutocompleteControl::new(FieldDescriptor::extract(&node).unwrap())
            .with_debounce(Duration::from_millis(20))
    }

    fn type_str(control: &mut AsyncAutocompleteControl, state: &mut FormState, text: &str) {
        let resolver = KeyResolver::default();
        for c in text.chars() {
            control
                .handle_key(KeyEvent::from(KeyCode::Char(c)), state, &resolver)
                .unwrap();
        }
    }

    #[tokio::test]
    async fn stale_generation_result_is_discarded() {
        let mut control = async_control(None, 2);
        let state = FormState::new();

        // Two searches started; the second is current.
        control.generation = 2;
        let tx = control.results_tx.clone();
        tx.send(SearchOutcome {
            generation: 2,
            entries: vec![json!({"id": 2, "name": "abc result"})],
        })
        .unwrap();
        // The first search's result arrives late.
        tx.send(SearchOutcome {
            generation: 1,
            entries: vec![json!({"id": 1, "name": "ab result"})],
        })
        .unwrap();

        control.on_tick(&state);
        assert_eq!(control.options.len(), 1);
        assert_eq!(control.options[0].label, "abc result");
    }

    #[tokio::test]
    async fn typing_below_min_length_never_searches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut control = async_control(
            Some(Arc::new(CountingSource { calls: calls.clone() })),
            3,
        );
        let mut state = FormState::new();

        type_str(&mut control, &mut state, "ab");
        sleep(Duration::from_millis(120)).await;
        control.on_tick(&state);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(control.options.is_empty());
    }

    #[tokio::test]
    async fn debounced_typing_dispatches_exactly_one_search() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut control = async_control(
            Some(Arc::new(CountingSource { calls: calls.clone() })),
            3,
        );
        let mut state = FormState::new();

        // Each keystroke cancels the previous debounce window.
        type_str(&mut control, &mut state, "abcd");
        sleep(Duration::from_millis(200)).await;
        control.on_tick(&state);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(control.options.len(), 1);
        assert_eq!(control.options[0].label, "match for abcd");
    }

    #[tokio::test]
    async fn opening_without_interaction_does_not_search() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut control = async_control(
            Some(Arc::new(CountingSource { calls: calls.clone() })),
            1,
        );
        let mut state = FormState::new();
        let resolver = KeyResolver::default();

        control
            .handle_key(KeyEvent::from(KeyCode::Down), &mut state, &resolver)
            .unwrap();
        sleep(Duration::from_millis(100)).await;
        assert!(control.open);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn selecting_writes_value_and_shows_label() {
        let mut control = async_control(None, 2);
        let mut state = FormState::new();
        let resolver = KeyResolver::default();

        control.options = vec![SelectOption::new(7, "Acme Corp")];
        control.open = true;
        control.typing = true;
        let handled = control
            .handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &resolver)
            .unwrap();

        assert_eq!(state.get("customer"), &json!(7));
        assert_eq!(control.text, "Acme Corp");
        assert!(!control.typing);
        assert!(matches!(handled, Handled::Event(FormEvent::Changed { .. })));
    }

    #[tokio::test]
    async fn external_value_change_resyncs_visible_text() {
        let mut control = async_control(None, 2);
        let mut state = FormState::new();
        control.options = vec![SelectOption::new(7, "Acme Corp")];

        state.set("customer", json!(7));
        control.on_tick(&state);
        assert_eq!(control.text, "Acme Corp");

        // Clearing the value clears the text.
        state.set("customer", Value::Null);
        control.on_tick(&state);
        assert_eq!(control.text, "");
    }

    #[tokio::test]
    async fn external_change_while_typing_does_not_clobber_input() {
        let mut control = async_control(None, 1);
        let mut state = FormState::new();
        type_str(&mut control, &mut state, "acm");
        state.set("customer", json!(9));
        control.on_tick(&state);
        assert_eq!(control.text, "acm");
    }

    #[test]
    fn sync_autocomplete_filters_fuzzily_and_selects() {
        let desc = FieldDescriptor::extract(
            &FieldNode::string("city")
                .kind(FieldKind::Autocomplete)
                .options(vec![
                    SelectOption::new(1, "Istanbul"),
                    SelectOption::new(2, "Ankara"),
                    SelectOption::new(3, "Izmir"),
                ]),
        )
        .unwrap();
        let mut control = AutocompleteControl::new(desc);
        let mut state = FormState::new();
        let resolver = KeyResolver::default();

        for c in "ank".chars() {
            control
                .handle_key(KeyEvent::from(KeyCode::Char(c)), &mut state, &resolver)
                .unwrap();
        }
        assert_eq!(control.filtered, vec![1]);
        control
            .handle_key(KeyEvent::from(KeyCode::Enter), &mut state, &resolver)
            .unwrap();
        assert_eq!(state.get("city"), &json!(2));
        assert_eq!(control.text, "Ankara");
    }

    #[test]
    fn sync_autocomplete_resyncs_value_to_label() {
        let desc = FieldDescriptor::extract(
            &FieldNode::string("city")
                .kind(FieldKind::Autocomplete)
                .options(vec![SelectOption::new(1, "Istanbul")]),
        )
        .unwrap();
        let mut control = AutocompleteControl::new(desc);
        let mut state = FormState::new();

        state.set("city", json!("1"));
        control.on_tick(&state);
        assert_eq!(control.text, "Istanbul");

        state.set("city", Value::Null);
        control.on_tick(&state);
        assert_eq!(control.text, "");
    }
}
