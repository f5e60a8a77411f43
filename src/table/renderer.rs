//! Generic data table component.
//!
//! Renders toolbar slot, header, body (skeleton, rows or not-found
//! overlay) and a pagination footer from a static column configuration
//! plus dynamic row data. Selection, sorting and paging live in the
//! owned [`TableState`]; every externally relevant change is surfaced as
//! a [`TableEvent`] so the owning page can react (or drive a server).

use std::sync::Arc;

use color_eyre::eyre::eyre;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use serde_json::Value;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::keymap::{Key, KeyResolver, NavAction, TableAction};
use crate::slot::Slots;
use crate::table::column::{ColumnDescriptor, value_at};
use crate::table::sort::SortDirection;
use crate::table::state::{DEFAULT_ROWS_PER_PAGE, TableState};
use crate::ui::{Component, Handled, Result};

const SKELETON_ROWS: usize = 5;

/// Paging contract. With a `total_count` the table treats paging as
/// server-driven: the footer shows server totals and page changes are
/// only forwarded upward, local data is never sliced past its length.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    pub enabled: bool,
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub total_count: Option<usize>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            rows_per_page_options: vec![10, 25, 50],
            total_count: None,
        }
    }
}

impl PagingConfig {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            rows_per_page_options: Vec::new(),
            total_count: None,
        }
    }
}

/// A key-bound action emitted with the full row under the cursor.
pub struct RowAction {
    pub id: String,
    pub label: String,
    pub key: Key,
}

impl RowAction {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, key: Key) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            key,
        }
    }
}

/// Detail lines for one collapsed row.
pub type CollapseRender = Box<dyn Fn(&Value) -> Vec<Line<'static>> + Send>;

/// Card-mode renderer: row, selected flag, theme.
pub type CardRender = Box<dyn Fn(&Value, bool, &Theme) -> Vec<Line<'static>> + Send>;

pub struct TableConfig {
    pub id: String,
    /// Dotted path of the unique row key field.
    pub row_id: String,
    pub columns: Vec<ColumnDescriptor>,
    pub checkbox: bool,
    pub single_select: bool,
    pub paging: PagingConfig,
    pub sorting: bool,
    pub not_found: String,
    pub row_actions: Vec<RowAction>,
}

impl TableConfig {
    #[must_use]
    pub fn new(id: impl Into<String>, row_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            row_id: row_id.into(),
            columns: Vec::new(),
            checkbox: false,
            single_select: false,
            paging: PagingConfig::default(),
            sorting: true,
            not_found: "No records found".to_string(),
            row_actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub const fn checkbox(mut self) -> Self {
        self.checkbox = true;
        self
    }

    #[must_use]
    pub const fn single_select(mut self) -> Self {
        self.single_select = true;
        self
    }

    #[must_use]
    pub fn paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }

    #[must_use]
    pub const fn no_sorting(mut self) -> Self {
        self.sorting = false;
        self
    }

    #[must_use]
    pub fn not_found(mut self, text: impl Into<String>) -> Self {
        self.not_found = text.into();
        self
    }

    #[must_use]
    pub fn row_action(mut self, action: RowAction) -> Self {
        self.row_actions.push(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// Full payloads of the selection after a toggle.
    SelectionChanged(Vec<Value>),
    /// The cursor row was activated (no selection configured).
    Activated(Value),
    PageChanged(usize),
    PageSizeChanged(usize),
    SortChanged {
        key: String,
        direction: SortDirection,
    },
    Action {
        id: String,
        row: Value,
    },
}

pub struct DataTable {
    config: TableConfig,
    data: Vec<Value>,
    state: TableState,
    slots: Slots,
    collapse: Option<CollapseRender>,
    card: Option<CardRender>,
    loading: bool,
    selection_enabled: bool,
    cursor: usize,
    /// Keys of rows whose detail region is open.
    open_details: Vec<Value>,
    throbber_state: ThrobberState,
    resolver: Arc<KeyResolver>,
}

impl DataTable {
    #[must_use]
    pub fn new(config: TableConfig, resolver: Arc<KeyResolver>) -> Self {
        let mut state = TableState::new(config.paging.rows_per_page);
        if config.single_select {
            state = state.single_select();
        }
        Self {
            config,
            data: Vec::new(),
            state,
            slots: Slots::new(),
            collapse: None,
            card: None,
            loading: false,
            selection_enabled: true,
            cursor: 0,
            open_details: Vec::new(),
            throbber_state: ThrobberState::default(),
            resolver,
        }
    }

    #[must_use]
    pub fn slots(mut self, slots: Slots) -> Self {
        self.slots = slots;
        self
    }

    #[must_use]
    pub fn collapse(mut self, render: impl Fn(&Value) -> Vec<Line<'static>> + Send + 'static) -> Self {
        self.collapse = Some(Box::new(render));
        self
    }

    #[must_use]
    pub fn card(mut self, render: impl Fn(&Value, bool, &Theme) -> Vec<Line<'static>> + Send + 'static) -> Self {
        self.card = Some(Box::new(render));
        self
    }

    pub fn set_data(&mut self, data: Vec<Value>) {
        self.data = data;
        self.cursor = 0;
        self.open_details.clear();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Externally disabling selection clears it.
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
        if !enabled {
            self.state.clear_selection();
        }
    }

    pub const fn state(&self) -> &TableState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }

    pub fn selected_rows(&self) -> Vec<Value> {
        self.state.selected_rows(&self.visible(), &self.config.row_id)
    }

    fn visible(&self) -> Vec<Value> {
        self.state.visible_rows(&self.data, self.config.paging.enabled)
    }

    fn row_key(&self, row: &Value) -> Option<Value> {
        value_at(row, &self.config.row_id).cloned()
    }

    const fn selectable(&self) -> bool {
        self.selection_enabled && (self.config.checkbox || self.config.single_select)
    }

    fn total_rows(&self) -> usize {
        self.config.paging.total_count.unwrap_or(self.data.len())
    }

    fn cursor_row(&self) -> Option<Value> {
        self.visible().get(self.cursor).cloned()
    }

    fn sortable_columns(&self) -> Vec<&ColumnDescriptor> {
        self.config
            .columns
            .iter()
            .filter(|c| !c.hidden && !c.sort_disabled && !c.is_slot)
            .collect()
    }

    fn toggle_cursor_row(&mut self) -> Handled<TableEvent> {
        let Some(row) = self.cursor_row() else {
            return Handled::Consumed;
        };
        if !self.selectable() {
            return TableEvent::Activated(row).into();
        }
        let Some(key) = self.row_key(&row) else {
            return Handled::Consumed;
        };
        self.state.toggle_row(key, &row);
        TableEvent::SelectionChanged(self.selected_rows()).into()
    }

    fn toggle_all_visible(&mut self) -> Handled<TableEvent> {
        if !self.selectable() || self.config.single_select {
            return Handled::Ignored;
        }
        let visible = self.visible();
        let pairs: Vec<(Value, &Value)> = visible
            .iter()
            .filter_map(|row| self.row_key(row).map(|k| (k, row)))
            .collect();
        self.state.toggle_all(pairs);
        TableEvent::SelectionChanged(self.selected_rows()).into()
    }

    /// Move the sort to the next sortable column, wrapping to unsorted.
    fn cycle_sort(&mut self) -> Handled<TableEvent> {
        if !self.config.sorting {
            return Handled::Ignored;
        }
        let sortable = self.sortable_columns();
        if sortable.is_empty() {
            return Handled::Ignored;
        }
        let current = self
            .state
            .sort()
            .and_then(|s| sortable.iter().position(|c| c.id == s.key));
        let next = match current {
            None => 0,
            Some(i) if i + 1 < sortable.len() => i + 1,
            Some(_) => {
                self.state.clear_sort();
                return Handled::Consumed;
            }
        };
        let key = sortable[next].id.clone();
        self.state.set_sort(&key);
        self.sort_event()
    }

    fn reverse_sort(&mut self) -> Handled<TableEvent> {
        if self.state.sort().is_none() {
            return Handled::Ignored;
        }
        self.state.reverse_sort();
        self.sort_event()
    }

    fn sort_event(&self) -> Handled<TableEvent> {
        self.state.sort().map_or(Handled::Consumed, |sort| {
            TableEvent::SortChanged {
                key: sort.key.clone(),
                direction: sort.direction,
            }
            .into()
        })
    }

    fn change_page(&mut self, forward: bool) -> Handled<TableEvent> {
        if !self.config.paging.enabled {
            return Handled::Ignored;
        }
        let pages = self.state.page_count(self.total_rows()).max(1);
        let page = self.state.page();
        let next = if forward {
            (page + 1).min(pages - 1)
        } else {
            page.saturating_sub(1)
        };
        if next == page {
            return Handled::Consumed;
        }
        self.state.set_page(next);
        self.cursor = 0;
        TableEvent::PageChanged(next).into()
    }

    fn cycle_page_size(&mut self) -> Handled<TableEvent> {
        let options = &self.config.paging.rows_per_page_options;
        if !self.config.paging.enabled || options.is_empty() {
            return Handled::Ignored;
        }
        let current = self.state.rows_per_page();
        let next = options
            .iter()
            .position(|&o| o == current)
            .map_or(options[0], |i| options[(i + 1) % options.len()]);
        self.state.set_rows_per_page(next);
        self.cursor = 0;
        TableEvent::PageSizeChanged(next).into()
    }

    fn toggle_detail(&mut self) -> Handled<TableEvent> {
        if self.collapse.is_none() {
            return Handled::Ignored;
        }
        let Some(key) = self.cursor_row().and_then(|row| self.row_key(&row)) else {
            return Handled::Consumed;
        };
        if let Some(pos) = self.open_details.iter().position(|k| k == &key) {
            self.open_details.remove(pos);
        } else {
            self.open_details.push(key);
        }
        Handled::Consumed
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.visible().len();
        if count == 0 {
            return;
        }
        let cursor = self.cursor as isize + delta;
        self.cursor = cursor.clamp(0, count as isize - 1) as usize;
    }

    fn header_row(&self, all_selected: bool, theme: &Theme) -> Row<'static> {
        let mut cells: Vec<Cell> = Vec::new();
        if self.selectable() {
            let marker = if self.config.single_select {
                "   "
            } else if all_selected {
                "[x]"
            } else {
                "[ ]"
            };
            cells.push(Cell::from(marker));
        }
        for column in self.config.columns.iter().filter(|c| !c.hidden) {
            let glyph = self
                .state
                .sort()
                .filter(|s| s.key == column.id)
                .map_or("", |s| s.direction.glyph());
            let label = if glyph.is_empty() {
                column.label.clone()
            } else {
                format!("{} {glyph}", column.label)
            };
            cells.push(Cell::from(label));
        }
        if !self.config.row_actions.is_empty() {
            cells.push(Cell::from("Actions"));
        }
        Row::new(cells).style(
            Style::default()
                .fg(theme.header)
                .add_modifier(Modifier::BOLD),
        )
    }

    fn data_row(
        &self,
        row: &Value,
        index: usize,
        theme: &Theme,
    ) -> Result<Row<'static>> {
        let key = self.row_key(row);
        let selected = key.as_ref().is_some_and(|k| self.state.is_selected(k));
        let mut cells: Vec<Cell> = Vec::new();

        if self.selectable() {
            let marker = match (self.config.single_select, selected) {
                (true, true) => "(•)",
                (true, false) => "( )",
                (false, true) => "[x]",
                (false, false) => "[ ]",
            };
            cells.push(Cell::from(marker));
        }

        for column in self.config.columns.iter().filter(|c| !c.hidden) {
            if column.is_slot {
                let render = self.slots.cell_for(&column.id).ok_or_else(|| {
                    eyre!(
                        "table '{}': column '{}' declares a slot but none is registered",
                        self.config.id,
                        column.id
                    )
                })?;
                cells.push(render(value_at(row, &column.id), row, index));
            } else {
                cells.push(Cell::from(column.format_cell(row)));
            }
        }

        if !self.config.row_actions.is_empty() {
            let labels = self
                .config
                .row_actions
                .iter()
                .map(|a| format!("{} {}", a.key.display(), a.label))
                .collect::<Vec<_>>()
                .join("  ");
            cells.push(Cell::from(labels));
        }

        let mut style = Style::default().fg(theme.text);
        if selected {
            style = style.fg(theme.accent);
        }
        if index == self.cursor {
            style = style.bg(theme.selection_bg()).add_modifier(Modifier::BOLD);
        }
        Ok(Row::new(cells).style(style))
    }

    fn column_count(&self) -> usize {
        let visible = self.config.columns.iter().filter(|c| !c.hidden).count();
        let selection = usize::from(self.selectable());
        let actions = usize::from(!self.config.row_actions.is_empty());
        visible + selection + actions
    }

    fn widths(&self) -> Vec<Constraint> {
        let mut widths = Vec::new();
        if self.selectable() {
            widths.push(Constraint::Length(3));
        }
        for column in self.config.columns.iter().filter(|c| !c.hidden) {
            widths.push(column.width.map_or(Constraint::Fill(1), Constraint::Length));
        }
        if !self.config.row_actions.is_empty() {
            widths.push(Constraint::Fill(1));
        }
        widths
    }

    fn skeleton_rows(&self, theme: &Theme) -> Vec<Row<'static>> {
        let style = Style::default().fg(theme.overlay);
        (0..SKELETON_ROWS)
            .map(|_| {
                Row::new(
                    (0..self.column_count())
                        .map(|_| Cell::from("░░░░░░"))
                        .collect::<Vec<_>>(),
                )
                .style(style)
            })
            .collect()
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let total = self.total_rows();
        let pages = self.state.page_count(total).max(1);
        let mut spans = vec![
            Span::styled(
                format!("page {}/{pages}", self.state.page() + 1),
                Style::default().fg(theme.text),
            ),
            Span::styled(
                format!("  {} rows/page  {total} total", self.state.rows_per_page()),
                Style::default().fg(theme.subtext),
            ),
        ];
        let hints = format!(
            "  {} next  {} prev",
            self.resolver.display_table(TableAction::NextPage),
            self.resolver.display_table(TableAction::PrevPage)
        );
        spans.push(Span::styled(hints, Style::default().fg(theme.overlay)));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_not_found(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(
                self.config.not_found.clone(),
                Style::default().fg(theme.subtext),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(card) = &self.card else { return };
        let visible = self.visible();
        let mut y = area.y;
        for (index, row) in visible.iter().enumerate() {
            let selected = self
                .row_key(row)
                .is_some_and(|k| self.state.is_selected(&k));
            let lines = card(row, selected, theme);
            let height = lines.len() as u16 + 2;
            if y + height > area.y + area.height {
                break;
            }
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border));
            if index == self.cursor {
                block = block.border_style(Style::default().fg(theme.border_focus));
            }
            let card_area = Rect::new(area.x, y, area.width, height);
            frame.render_widget(Paragraph::new(lines).block(block), card_area);
            y += height;
        }
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) -> Result<()> {
        let visible = self.visible();
        let all_selected = !visible.is_empty()
            && visible
                .iter()
                .filter_map(|row| self.row_key(row))
                .all(|k| self.state.is_selected(&k));
        let header = self.header_row(all_selected, theme);

        let rows: Vec<Row> = if self.loading {
            self.skeleton_rows(theme)
        } else {
            let mut rows = Vec::with_capacity(visible.len());
            for (index, row) in visible.iter().enumerate() {
                rows.push(self.data_row(row, index, theme)?);
                if let Some(collapse) = &self.collapse
                    && let Some(key) = self.row_key(row)
                    && self.open_details.contains(&key)
                {
                    let lines = collapse(row);
                    let height = lines.len() as u16;
                    let mut cells = vec![Cell::default(); self.column_count()];
                    if let Some(first) = cells.get_mut(usize::from(self.selectable())) {
                        *first = Cell::from(ratatui::text::Text::from(lines));
                    }
                    rows.push(
                        Row::new(cells)
                            .height(height)
                            .style(Style::default().fg(theme.subtext)),
                    );
                }
            }
            rows
        };

        let table = Table::new(rows, self.widths())
            .header(header)
            .column_spacing(1)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(theme.border)),
            );
        frame.render_widget(table, area);

        let inner = Rect::new(
            area.x + 1,
            area.y + 2,
            area.width.saturating_sub(2),
            area.height.saturating_sub(3),
        );
        if self.loading {
            let throbber = Throbber::default()
                .throbber_set(BRAILLE_SIX)
                .use_type(Spin)
                .label("loading")
                .throbber_style(Style::default().fg(theme.highlight));
            let spinner_area = Rect::new(inner.x, inner.y, inner.width.min(12), 1);
            frame.render_stateful_widget(throbber, spinner_area, &mut self.throbber_state);
        } else if visible.is_empty() {
            self.render_not_found(frame, inner, theme);
        }
        Ok(())
    }
}

impl Component for DataTable {
    type Output = TableEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        let r = Arc::clone(&self.resolver);

        if r.matches_nav(&key, NavAction::Down) {
            self.move_cursor(1);
            return Ok(Handled::Consumed);
        }
        if r.matches_nav(&key, NavAction::Up) {
            self.move_cursor(-1);
            return Ok(Handled::Consumed);
        }
        if r.matches_nav(&key, NavAction::Home) {
            self.cursor = 0;
            return Ok(Handled::Consumed);
        }
        if r.matches_nav(&key, NavAction::End) {
            self.cursor = self.visible().len().saturating_sub(1);
            return Ok(Handled::Consumed);
        }
        if r.matches_nav(&key, NavAction::Select) || r.matches_table(&key, TableAction::ToggleRow) {
            return Ok(self.toggle_cursor_row());
        }
        if r.matches_table(&key, TableAction::ToggleAll) {
            return Ok(self.toggle_all_visible());
        }
        if r.matches_table(&key, TableAction::ClearSelection) {
            if !self.state.has_selection() {
                return Ok(Handled::Ignored);
            }
            self.state.clear_selection();
            return Ok(TableEvent::SelectionChanged(Vec::new()).into());
        }
        if r.matches_table(&key, TableAction::SortColumn) {
            return Ok(self.cycle_sort());
        }
        if r.matches_table(&key, TableAction::SortReverse) {
            return Ok(self.reverse_sort());
        }
        if r.matches_table(&key, TableAction::NextPage)
            || r.matches_nav(&key, NavAction::PageDown)
        {
            return Ok(self.change_page(true));
        }
        if r.matches_table(&key, TableAction::PrevPage) || r.matches_nav(&key, NavAction::PageUp) {
            return Ok(self.change_page(false));
        }
        if r.matches_table(&key, TableAction::PageSize) {
            return Ok(self.cycle_page_size());
        }
        if r.matches_table(&key, TableAction::Collapse) {
            return Ok(self.toggle_detail());
        }

        if let Some(action) = self.config.row_actions.iter().find(|a| a.key.matches(&key))
            && let Some(row) = self.cursor_row()
        {
            return Ok(TableEvent::Action {
                id: action.id.clone(),
                row,
            }
            .into());
        }

        Ok(Handled::Ignored)
    }

    fn on_tick(&mut self) {
        if self.loading {
            self.throbber_state.calc_next();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) -> Result<()> {
        let toolbar_height = u16::from(self.slots.toolbar_render().is_some());
        let footer_height = u16::from(self.config.paging.enabled);
        let [toolbar_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(toolbar_height),
            Constraint::Fill(1),
            Constraint::Length(footer_height),
        ])
        .areas(area);

        if let Some(toolbar) = self.slots.toolbar_render() {
            toolbar(frame, toolbar_area, theme);
        }

        if self.card.is_some() && !self.loading && !self.visible().is_empty() {
            self.render_cards(frame, body_area, theme);
        } else {
            self.render_body(frame, body_area, theme)?;
        }

        if self.config.paging.enabled {
            self.render_footer(frame, footer_area, theme);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use serde_json::json;

    fn sample_config() -> TableConfig {
        TableConfig::new("orders", "id")
            .column(ColumnDescriptor::new("name", "Name"))
            .column(
                ColumnDescriptor::new("amount", "Amount")
                    .kind(crate::table::column::CellKind::Currency),
            )
            .checkbox()
    }

    fn sample_data() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "A", "amount": 100}),
            json!({"id": 2, "name": "B", "amount": null}),
        ]
    }

    fn table() -> DataTable {
        let mut t = DataTable::new(sample_config(), Arc::new(KeyResolver::default()));
        t.set_data(sample_data());
        t
    }

    #[test]
    fn toggling_a_row_emits_the_full_payload() {
        let mut t = table();
        let handled = t.handle_key(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert_eq!(
            handled,
            Handled::Event(TableEvent::SelectionChanged(vec![json!(
                {"id": 1, "name": "A", "amount": 100}
            )]))
        );
    }

    #[test]
    fn toggle_all_selects_then_clears_the_visible_page() {
        let mut t = table();
        t.handle_key(KeyEvent::from(KeyCode::Char('a'))).unwrap();
        assert_eq!(t.selected_rows().len(), 2);
        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('a'))).unwrap();
        assert_eq!(handled, Handled::Event(TableEvent::SelectionChanged(Vec::new())));
    }

    #[test]
    fn page_navigation_respects_bounds() {
        let mut config = sample_config();
        config.paging.rows_per_page = 1;
        let mut t = DataTable::new(config, Arc::new(KeyResolver::default()));
        t.set_data(sample_data());

        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('n'))).unwrap();
        assert_eq!(handled, Handled::Event(TableEvent::PageChanged(1)));
        // Already on the last page; consumed but no event.
        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('n'))).unwrap();
        assert_eq!(handled, Handled::Consumed);
    }

    #[test]
    fn disabling_selection_externally_clears_it() {
        let mut t = table();
        t.handle_key(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert!(t.state().has_selection());
        t.set_selection_enabled(false);
        assert!(!t.state().has_selection());
    }

    #[test]
    fn slot_column_without_registered_slot_is_an_error() {
        let config = TableConfig::new("orders", "id")
            .column(ColumnDescriptor::new("badge", "Badge").slot());
        let t = DataTable::new(config, Arc::new(KeyResolver::default()));
        let err = t
            .data_row(&json!({"id": 1}), 0, &Theme::catppuccin_mocha())
            .unwrap_err();
        assert!(err.to_string().contains("badge"));
    }

    #[test]
    fn registered_slot_receives_value_row_and_index() {
        let config = TableConfig::new("orders", "id")
            .column(ColumnDescriptor::new("name", "Name").slot());
        let t = DataTable::new(config, Arc::new(KeyResolver::default())).slots(
            Slots::new().cell("name", |value, row, index| {
                assert_eq!(value, Some(&json!("A")));
                assert_eq!(row["id"], json!(1));
                Cell::from(format!("#{index}"))
            }),
        );
        t.data_row(&json!({"id": 1, "name": "A"}), 0, &Theme::catppuccin_mocha())
            .unwrap();
    }

    #[test]
    fn sort_key_cycles_sortable_columns_and_emits() {
        let mut t = table();
        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('s'))).unwrap();
        assert_eq!(
            handled,
            Handled::Event(TableEvent::SortChanged {
                key: "name".to_string(),
                direction: SortDirection::Ascending,
            })
        );
        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('o'))).unwrap();
        assert_eq!(
            handled,
            Handled::Event(TableEvent::SortChanged {
                key: "name".to_string(),
                direction: SortDirection::Descending,
            })
        );
    }

    #[test]
    fn row_action_carries_the_cursor_row() {
        let config = sample_config().row_action(RowAction::new(
            "edit",
            "Edit",
            "e".parse().unwrap(),
        ));
        let mut t = DataTable::new(config, Arc::new(KeyResolver::default()));
        t.set_data(sample_data());
        let handled = t.handle_key(KeyEvent::from(KeyCode::Char('e'))).unwrap();
        assert_eq!(
            handled,
            Handled::Event(TableEvent::Action {
                id: "edit".to_string(),
                row: json!({"id": 1, "name": "A", "amount": 100}),
            })
        );
    }
}
