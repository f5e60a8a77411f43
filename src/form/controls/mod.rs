//! Field control library.
//!
//! Each control binds one named slot of the shared [`FormState`]: it reads
//! the current value and error for its field and writes back on user
//! interaction. Dispatch from [`FieldKind`] to control is an exhaustive
//! match, so adding a kind without a control is a compile error.

mod autocomplete;
mod date;
mod select;
mod text;
mod toggle;

pub use autocomplete::{AsyncAutocompleteControl, AutocompleteControl};
pub use date::DateControl;
pub use select::SelectControl;
pub use text::{TextControl, TextVariant};
pub use toggle::{CheckboxControl, SwitchControl};

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;

use crate::Theme;
use crate::form::descriptor::FieldDescriptor;
use crate::form::schema::{CustomRender, FieldKind};
use crate::form::state::FormState;
use crate::keymap::KeyResolver;
use crate::ui::{Handled, Result};

/// Event emitted by controls and the form renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A field's stored value changed.
    Changed { name: String, value: Value },
    /// The submit binding was pressed.
    Submitted,
    /// The cancel binding was pressed.
    Cancelled,
}

/// One bound input control.
pub trait Control {
    /// The field name this control is bound to.
    fn name(&self) -> &str;

    /// Whether the control participates in focus traversal.
    fn focusable(&self) -> bool {
        true
    }

    /// Rows of screen the control currently needs (dropdowns grow this).
    fn height(&self) -> u16 {
        3
    }

    /// Handle a key event while focused.
    fn handle_key(
        &mut self,
        key: KeyEvent,
        state: &mut FormState,
        resolver: &KeyResolver,
    ) -> Result<Handled<FormEvent>>;

    /// Per-tick hook for async result application and value resync.
    fn on_tick(&mut self, state: &FormState) {
        _ = state;
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        focused: bool,
        theme: &Theme,
    );
}

/// Build the control for a descriptor.
///
/// Every kind maps here; `Hidden` and `Unknown` get a no-op binding so the
/// field keeps its grid slot and its value keeps flowing through
/// submission.
pub fn build_control(desc: &FieldDescriptor) -> Result<Box<dyn Control>> {
    Ok(match desc.kind {
        FieldKind::Text => Box::new(TextControl::new(desc.clone(), TextVariant::Plain)),
        FieldKind::Password => Box::new(TextControl::new(desc.clone(), TextVariant::Password)),
        FieldKind::Numeric => Box::new(TextControl::new(desc.clone(), TextVariant::Numeric)),
        FieldKind::Masked => Box::new(TextControl::new(desc.clone(), TextVariant::Masked)),
        FieldKind::Select => Box::new(SelectControl::single(desc.clone())),
        FieldKind::MultiSelect => Box::new(SelectControl::multi(desc.clone())),
        FieldKind::Radio => Box::new(SelectControl::radio(desc.clone())),
        FieldKind::Autocomplete => Box::new(AutocompleteControl::new(desc.clone())),
        FieldKind::AsyncAutocomplete => Box::new(AsyncAutocompleteControl::new(desc.clone())),
        FieldKind::Checkbox => Box::new(CheckboxControl::new(desc.clone())),
        FieldKind::Switch => Box::new(SwitchControl::new(desc.clone())),
        FieldKind::Date => Box::new(DateControl::new(desc.clone())),
        FieldKind::Hidden => Box::new(NoopControl::new(desc.clone())),
        FieldKind::Custom => Box::new(CustomControl::new(desc.clone())),
        FieldKind::Unknown => Box::new(NoopControl::new(desc.clone())),
    })
}

/// Binding with no visible control: hidden fields carry computed values
/// through submission, unknown kinds render nothing.
pub struct NoopControl {
    desc: FieldDescriptor,
}

impl NoopControl {
    pub const fn new(desc: FieldDescriptor) -> Self {
        Self { desc }
    }
}

impl Control for NoopControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn focusable(&self) -> bool {
        false
    }

    fn height(&self) -> u16 {
        0
    }

    fn handle_key(
        &mut self,
        _key: KeyEvent,
        _state: &mut FormState,
        _resolver: &KeyResolver,
    ) -> Result<Handled<FormEvent>> {
        Ok(Handled::Ignored)
    }

    fn render(
        &mut self,
        _frame: &mut Frame,
        _area: Rect,
        _state: &FormState,
        _focused: bool,
        _theme: &Theme,
    ) {
    }
}

/// Escape hatch: the descriptor supplies the render function and the
/// engine invokes it with no additional binding.
pub struct CustomControl {
    desc: FieldDescriptor,
    element: CustomRender,
}

impl CustomControl {
    /// Panics never: the extractor guarantees `element` is present for
    /// custom fields.
    pub fn new(desc: FieldDescriptor) -> Self {
        let element = desc
            .element
            .clone()
            .unwrap_or_else(|| std::sync::Arc::new(|_: &mut Frame, _, _: &FormState, _: &Theme| {}));
        Self { desc, element }
    }
}

impl Control for CustomControl {
    fn name(&self) -> &str {
        &self.desc.name
    }

    fn focusable(&self) -> bool {
        false
    }

    fn handle_key(
        &mut self,
        _key: KeyEvent,
        _state: &mut FormState,
        _resolver: &KeyResolver,
    ) -> Result<Handled<FormEvent>> {
        Ok(Handled::Ignored)
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &FormState,
        _focused: bool,
        theme: &Theme,
    ) {
        (self.element)(frame, area, state, theme);
    }
}

/// Shared bordered field chrome: label title, error or tooltip in the
/// bottom title, focus-colored border.
pub(crate) fn field_block<'a>(
    desc: &'a FieldDescriptor,
    state: &'a FormState,
    focused: bool,
    theme: &Theme,
) -> Block<'a> {
    let error = state.error(&desc.name);
    let border_color = if error.is_some() {
        theme.error
    } else if focused {
        theme.border_focus
    } else {
        theme.border
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(border_color))
        .title(desc.label.as_str())
        .title_style(Style::default().fg(theme.header).add_modifier(Modifier::BOLD));

    if let Some(error) = error {
        block = block.title_bottom(
            Line::from(Span::styled(error, Style::default().fg(theme.error))),
        );
    } else if focused && let Some(tooltip) = &desc.tooltip {
        block = block.title_bottom(
            Line::from(Span::styled(
                tooltip.as_str(),
                Style::default().fg(theme.subtext),
            )),
        );
    }

    block
}

/// Render a single-line value with a visible cursor when focused.
pub(crate) fn value_line<'a>(
    display: &'a str,
    cursor: usize,
    focused: bool,
    disabled: bool,
    theme: &Theme,
) -> Line<'a> {
    let input_style = if disabled {
        Style::default().fg(theme.overlay)
    } else {
        Style::default().fg(theme.text)
    };

    if !focused || disabled {
        return Line::from(Span::styled(display, input_style));
    }

    let cursor = cursor.min(display.len());
    let (before, after) = display.split_at(cursor);
    let cursor_char = after.chars().next().unwrap_or(' ');
    let rest: &str = after.get(cursor_char.len_utf8()..).unwrap_or("");

    let cursor_style = Style::default()
        .fg(theme.base)
        .bg(theme.text)
        .add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::styled(before, input_style),
        Span::styled(cursor_char.to_string(), cursor_style),
        Span::styled(rest, input_style),
    ])
}

pub(crate) fn render_value_paragraph(
    frame: &mut Frame,
    area: Rect,
    desc: &FieldDescriptor,
    state: &FormState,
    display: &str,
    cursor: usize,
    focused: bool,
    theme: &Theme,
) {
    let block = field_block(desc, state, focused, theme);
    let line = value_line(display, cursor, focused, desc.disabled, theme);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
