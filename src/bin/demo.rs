//! Demo page: a schema-driven form above a generic data table.
//!
//! Plays the role of a back-office page consuming the engine: it owns the
//! components, wires slots and an in-memory async search source, and runs
//! the tick/render event loop.

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use deskgrid::form::{
    EntryAccessors, FieldKind, FieldNode, FormEvent, FormRenderer, FormSchema, OptionSource,
    SelectOption,
};
use deskgrid::keymap::KeyResolver;
use deskgrid::slot::Slots;
use deskgrid::table::{
    CellKind, ColumnDescriptor, DataTable, PagingConfig, RowAction, TableConfig, TableEvent,
};
use deskgrid::theme::theme_from_name;
use deskgrid::tui::{Event, Tui};
use deskgrid::ui::{Component, Handled};
use deskgrid::Theme;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph};
use serde_json::{Value, json};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deskgrid-demo", about = "deskgrid form and table demo")]
struct Args {
    /// Theme name, e.g. "latte" or "mocha". Overrides the config file.
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting deskgrid demo");

    let args = Args::parse();

    let config = deskgrid::keymap::load()?;
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keymap.clone())));
    let theme = theme_from_name(args.theme.as_deref().unwrap_or(&config.theme.name));

    let mut app = DemoApp::new(resolver, theme)?;
    app.run().await
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("deskgrid").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "deskgrid.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    Ok(guard)
}

/// In-memory stand-in for a network-backed search endpoint.
struct CityDirectory;

#[async_trait]
impl OptionSource for CityDirectory {
    async fn search(&self, query: &str) -> Result<Vec<Value>> {
        // Simulated latency so debounce and cancellation are observable.
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        let cities = [
            (6, "Ankara"),
            (34, "Istanbul"),
            (35, "Izmir"),
            (16, "Bursa"),
            (7, "Antalya"),
        ];
        let query = query.to_lowercase();
        Ok(cities
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .map(|(code, name)| json!({"code": code, "name": name}))
            .collect())
    }
}

fn sample_schema() -> FormSchema {
    FormSchema::new()
        .field(
            FieldNode::string("title")
                .label("Title")
                .col(6)
                .max_length(40)
                .trim(),
        )
        .field(
            FieldNode::number("amount")
                .label("Amount")
                .col(6)
                .max_length(12),
        )
        .field(
            FieldNode::string("status")
                .kind(FieldKind::Select)
                .label("Status")
                .col(4)
                .options(vec![
                    SelectOption::new(1, "Open"),
                    SelectOption::new(2, "Closed"),
                    SelectOption::new(3, "Archived"),
                ])
                .default_value(1),
        )
        .field(
            FieldNode::string("city")
                .kind(FieldKind::AsyncAutocomplete)
                .label("City")
                .col(4)
                .min_search_length(2)
                .entries(EntryAccessors::fields("code", "name"))
                .on_search(Arc::new(CityDirectory)),
        )
        .field(
            FieldNode::boolean("active")
                .kind(FieldKind::Switch)
                .label("Active")
                .col(4)
                .numeric_switch(),
        )
        .field(FieldNode::date("due").label("Due date").col(4))
        .field(
            FieldNode::string("iban")
                .kind(FieldKind::Masked)
                .label("IBAN")
                .col(8)
                .max_length(26),
        )
        .field(FieldNode::string("origin").kind(FieldKind::Hidden).default_value("demo"))
}

fn sample_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Quarterly report", "customer": {"name": "Acme"},
               "amount": 1250.5, "rate": 12.5, "created": "2026-02-14"}),
        json!({"id": 2, "name": "Audit prep", "customer": {"name": "Globex"},
               "amount": null, "rate": 8, "created": "2026-03-01"}),
        json!({"id": 3, "name": "Onboarding", "customer": {"name": "Initech"},
               "amount": 300, "rate": 20, "created": "0001-01-01T00:00:00"}),
        json!({"id": 4, "name": "Renewal", "customer": {"name": "Acme"},
               "amount": 99.9, "rate": 5, "created": "2026-01-20"}),
        json!({"id": 5, "name": "Migration", "customer": {"name": "Umbrella"},
               "amount": 4800, "rate": 15, "created": "2026-04-02"}),
        json!({"id": 6, "name": "Cleanup", "customer": {"name": "Globex"},
               "amount": 75, "rate": 3, "created": "2026-04-18"}),
    ]
}

fn sample_table(resolver: Arc<KeyResolver>) -> DataTable {
    let config = TableConfig::new("orders", "id")
        .column(ColumnDescriptor::new("name", "Task"))
        .column(ColumnDescriptor::new("customer.name", "Customer"))
        .column(ColumnDescriptor::new("amount", "Amount").kind(CellKind::Currency).width(14))
        .column(ColumnDescriptor::new("rate", "Rate").kind(CellKind::Percentage).width(8))
        .column(ColumnDescriptor::new("created", "Created").kind(CellKind::Date).width(12))
        .column(ColumnDescriptor::new("badge", "Badge").slot().no_sort().width(8))
        .checkbox()
        .paging(PagingConfig {
            rows_per_page: 4,
            rows_per_page_options: vec![2, 4, 10],
            ..PagingConfig::default()
        })
        .row_action(RowAction::new("edit", "Edit", "e".parse().expect("valid key")));

    let slots = Slots::new()
        .cell("badge", |_value, row, _index| {
            let hot = deskgrid::table::value_at(row, "amount")
                .and_then(Value::as_f64)
                .is_some_and(|a| a > 1000.0);
            Cell::from(if hot { "★ big" } else { "" })
        })
        .toolbar(|frame, area, theme| {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "Orders",
                    Style::default().fg(theme.header),
                ))),
                area,
            );
        });

    let mut table = DataTable::new(config, resolver)
        .slots(slots)
        .collapse(|row| {
            vec![Line::from(format!(
                "  detail: {} for {}",
                row["name"].as_str().unwrap_or("-"),
                row["customer"]["name"].as_str().unwrap_or("-"),
            ))]
        });
    table.set_data(sample_rows());
    table
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pane {
    Form,
    Table,
}

struct DemoApp {
    form: FormRenderer,
    table: DataTable,
    pane: Pane,
    status: String,
    theme: Theme,
    should_quit: bool,
}

impl DemoApp {
    fn new(resolver: Arc<KeyResolver>, theme: Theme) -> Result<Self> {
        Ok(Self {
            form: FormRenderer::new(sample_schema(), Arc::clone(&resolver))?,
            table: sample_table(resolver),
            pane: Pane::Form,
            status: "F2 switches panes, q quits".to_string(),
            theme,
            should_quit: false,
        })
    }

    async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(60.0, 8.0)?;
        tui.enter()?;

        while !self.should_quit {
            let Some(event) = tui.next_event().await else {
                break;
            };
            match event {
                Event::Quit => self.should_quit = true,
                Event::Tick => {
                    self.form.on_tick();
                    self.table.on_tick();
                }
                Event::Render => self.draw(&mut tui)?,
                Event::Key(key) => self.handle_key(key)?,
                Event::Error(message) => self.status = message,
                Event::Init | Event::Resize(..) => {}
            }
        }

        tui.exit()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::F(2) {
            self.pane = match self.pane {
                Pane::Form => Pane::Table,
                Pane::Table => Pane::Form,
            };
            return Ok(());
        }

        let handled = match self.pane {
            Pane::Form => self.handle_form_key(key)?,
            Pane::Table => self.handle_table_key(key)?,
        };
        if !handled && key.code == KeyCode::Char('q') {
            self.should_quit = true;
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let handled = self.form.handle_key(key)?;
        match &handled {
            Handled::Event(FormEvent::Submitted) => {
                let values = serde_json::to_string(self.form.state().values())?;
                self.status = format!("submitted: {values}");
            }
            Handled::Event(FormEvent::Cancelled) => {
                self.form.reset();
                self.status = "form reset".to_string();
            }
            Handled::Event(FormEvent::Changed { name, value }) => {
                self.status = format!("{name} = {value}");
            }
            _ => {}
        }
        Ok(handled.is_consumed())
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Result<bool> {
        let handled = self.table.handle_key(key)?;
        match &handled {
            Handled::Event(TableEvent::SelectionChanged(rows)) => {
                self.status = format!("{} row(s) selected", rows.len());
            }
            Handled::Event(TableEvent::PageChanged(page)) => {
                self.status = format!("page {}", page + 1);
            }
            Handled::Event(TableEvent::PageSizeChanged(size)) => {
                self.status = format!("{size} rows per page");
            }
            Handled::Event(TableEvent::SortChanged { key, direction }) => {
                self.status = format!("sorted by {key} {direction:?}");
            }
            Handled::Event(TableEvent::Action { id, row }) => {
                self.status = format!("{id}: {}", row["name"].as_str().unwrap_or("-"));
            }
            Handled::Event(TableEvent::Activated(row)) => {
                self.status = format!("activated {}", row["id"]);
            }
            _ => {}
        }
        Ok(handled.is_consumed())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let theme = self.theme;
        // Split borrows: the closure needs the components, not all of self.
        let form = &mut self.form;
        let table = &mut self.table;
        let pane = self.pane;
        let status = self.status.clone();

        let mut render_error = None;
        tui.draw(|frame| {
            let [form_area, table_area, status_area] = Layout::vertical([
                Constraint::Length(13),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(frame.area());

            if let Err(e) = form.render(frame, form_area, &theme) {
                render_error = Some(e);
                return;
            }
            if let Err(e) = table.render(frame, table_area, &theme) {
                render_error = Some(e);
                return;
            }

            let focus = match pane {
                Pane::Form => "form",
                Pane::Table => "table",
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("[{focus}] "), Style::default().fg(theme.accent)),
                    Span::styled(status, Style::default().fg(theme.subtext)),
                ])),
                status_area,
            );
        })?;

        render_error.map_or(Ok(()), Err)
    }
}
