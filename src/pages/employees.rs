//! Employees list: fetch, table, delete with confirmation.

use std::sync::Arc;
use std::time::Duration;

use ratatui::layout::Constraint;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use tokio::time::Instant;
use tracing::{debug, error, info};
use tracing_error::SpanTrace;

use super::{LoadState, PageContext};
use crate::api::{ApiError, Employee};
use crate::domain::{AppConfig, Message};
use crate::table::{Column, RowKey, TablePresenter, TextCollator};
use crate::task::{TaskScope, hold_until};

pub const LOAD_ERROR: &str = "Could not load employees";
pub const DELETE_ERROR: &str = "Could not delete employee";

const RATING_BAR_WIDTH: usize = 10;

pub struct EmployeesPage {
    state: LoadState<Vec<Employee>>,
    table: TablePresenter<Employee, Message>,
    pending_delete: Option<Employee>,
    scope: TaskScope,
    min_display: Duration,
    items_per_page: usize,
    locale: String,
}

impl EmployeesPage {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            state: LoadState::loading(),
            table: new_table(config.items_per_page, &config.locale),
            pending_delete: None,
            scope: TaskScope::default(),
            min_display: config.min_loading(),
            items_per_page: config.items_per_page,
            locale: config.locale.clone(),
        }
    }

    pub fn state(&self) -> &LoadState<Vec<Employee>> {
        &self.state
    }

    /// Loaded employees, empty while loading or after a failure.
    pub fn employees(&self) -> &[Employee] {
        match &self.state {
            LoadState::Ready(employees) => employees,
            _ => &[],
        }
    }

    pub fn table(&self) -> &TablePresenter<Employee, Message> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TablePresenter<Employee, Message> {
        &mut self.table
    }

    pub fn pending_delete(&self) -> Option<&Employee> {
        self.pending_delete.as_ref()
    }

    /// Every visit starts unsorted on page 1 with the cursor on the first row.
    pub fn mount(&mut self, ctx: &PageContext) {
        self.table = new_table(self.items_per_page, &self.locale);
        self.fetch(ctx);
    }

    pub fn unmount(&mut self) {
        self.scope.cancel_all();
        self.pending_delete = None;
    }

    /// Loads the full list. Supersedes any fetch still in flight.
    pub fn fetch(&mut self, ctx: &PageContext) {
        let (generation, cancel) = self.scope.next_request();
        self.state = LoadState::loading();
        debug!("Fetching employees, generation {generation}");

        let api = Arc::clone(&ctx.api);
        let min_display = self.min_display;
        ctx.tasks.spawn(cancel, async move {
            let started = Instant::now();
            let result = api.list().await.map(|envelope| envelope.data);
            hold_until(started, min_display).await;
            Message::EmployeesLoaded { generation, result }
        });
    }

    /// Returns false when the result belongs to a superseded fetch.
    pub fn apply_loaded(&mut self, generation: u64, result: Result<Vec<Employee>, ApiError>) -> bool {
        if !self.scope.is_current(generation) {
            debug!("Dropping stale employee list, generation {generation}");
            return false;
        }
        match result {
            Ok(employees) => {
                info!("Loaded {} employees", employees.len());
                self.table.clamp_page(employees.len());
                self.state = LoadState::Ready(employees);
            }
            Err(e) => {
                error!(error = %e, span_trace = %SpanTrace::capture(), "Loading employees failed");
                self.state = LoadState::Failed(LOAD_ERROR.to_string());
            }
        }
        true
    }

    /// Opens the confirmation prompt. Employees without id cannot be deleted.
    pub fn request_delete(&mut self, employee: Employee) -> bool {
        if employee.id.is_none() {
            debug!("Ignoring delete of unsaved employee {}", employee.full_name());
            return false;
        }
        self.pending_delete = Some(employee);
        true
    }

    pub fn decline_delete(&mut self) {
        if let Some(employee) = self.pending_delete.take() {
            debug!("Delete of {:?} declined", employee.id);
        }
    }

    pub fn confirm_delete(&mut self, ctx: &PageContext) -> bool {
        let Some(id) = self.pending_delete.take().and_then(|e| e.id) else {
            return false;
        };
        info!("Deleting employee {id}");

        let api = Arc::clone(&ctx.api);
        ctx.tasks.spawn(self.scope.token(), async move {
            let result = api.delete(id).await.map(|_| ());
            Message::EmployeeDeleted { id, result }
        });
        true
    }

    /// Removes the deleted employee locally, no refetch. On failure the list
    /// is left as it was. Returns the status line text.
    pub fn apply_deleted(&mut self, id: i64, result: Result<(), ApiError>) -> Result<String, String> {
        match result {
            Ok(()) => {
                if let LoadState::Ready(employees) = &mut self.state {
                    employees.retain(|e| e.id != Some(id));
                    self.table.clamp_page(employees.len());
                }
                Ok(format!("Deleted employee {id}"))
            }
            Err(e) => {
                error!(error = %e, span_trace = %SpanTrace::capture(), "Deleting employee {id} failed");
                Err(DELETE_ERROR.to_string())
            }
        }
    }
}

fn new_table(items_per_page: usize, locale: &str) -> TablePresenter<Employee, Message> {
    TablePresenter::new(columns())
        .items_per_page(items_per_page)
        .collator(TextCollator::for_locale_or_root(locale))
        .row_key(RowKey::derive(row_key))
        .on_edit(|e: &Employee| Message::EditRequested(e.clone()))
        .on_delete(|e: &Employee| Message::DeleteRequested(e.clone()))
}

fn row_key(employee: &Employee) -> String {
    match employee.id {
        Some(id) => id.to_string(),
        None => format!(
            "{}-{}-{}",
            employee.first_name,
            employee.second_name.as_deref().unwrap_or_default(),
            employee.surname
        ),
    }
}

fn columns() -> Vec<Column<Employee>> {
    vec![
        Column::new("surname", "Employee", |e: &Employee| e.surname.as_str().into())
            .render_with(render_full_name)
            .width(Constraint::Fill(2)),
        Column::new("revenue", "Revenue", |e: &Employee| e.revenue.into())
            .render_with(|e: &Employee| render_rating(e.revenue)),
        Column::new("quality", "Quality", |e: &Employee| e.quality.into())
            .render_with(|e: &Employee| render_rating(e.quality)),
        Column::new("discipline", "Discipline", |e: &Employee| e.discipline.into())
            .render_with(|e: &Employee| render_rating(e.discipline)),
    ]
}

fn render_full_name(employee: &Employee) -> Line<'static> {
    let mut spans = vec![Span::from(employee.full_name()).bold()];
    if let Some(id) = employee.id {
        spans.push(Span::from(format!("  ID: {id}")).dark_gray());
    }
    Line::from(spans)
}

pub fn rating_color(value: f64) -> Color {
    if value >= 8.0 {
        Color::Rgb(22, 101, 52)
    } else if value >= 6.0 {
        Color::Rgb(180, 83, 9)
    } else if value >= 4.0 {
        Color::Rgb(146, 64, 14)
    } else {
        Color::Rgb(153, 27, 27)
    }
}

fn render_rating(value: f64) -> Line<'static> {
    let color = rating_color(value);
    let filled = value.clamp(0.0, 10.0).round() as usize;
    Line::from(vec![
        Span::styled(format!("{value:>4} "), Style::new().fg(color).bold()),
        Span::styled("█".repeat(filled), Style::new().fg(color)),
        Span::styled(
            "░".repeat(RATING_BAR_WIDTH - filled),
            Style::new().fg(Color::DarkGray),
        ),
    ])
}
