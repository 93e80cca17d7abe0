//! Single employee view, opened from the list's edit action.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error};
use tracing_error::SpanTrace;

use super::{LoadState, PageContext};
use crate::api::{ApiError, Employee};
use crate::domain::Message;
use crate::task::{TaskScope, hold_until};

pub const LOAD_ERROR: &str = "Could not load employee";

pub struct DetailPage {
    id: i64,
    state: LoadState<Employee>,
    scope: TaskScope,
    min_display: Duration,
}

impl DetailPage {
    pub fn new(id: i64, min_display: Duration) -> Self {
        Self {
            id,
            state: LoadState::loading(),
            scope: TaskScope::default(),
            min_display,
        }
    }

    pub fn state(&self) -> &LoadState<Employee> {
        &self.state
    }

    pub fn mount(&mut self, ctx: &PageContext) {
        self.fetch(ctx);
    }

    pub fn unmount(&mut self) {
        self.scope.cancel_all();
    }

    pub fn fetch(&mut self, ctx: &PageContext) {
        let (generation, cancel) = self.scope.next_request();
        self.state = LoadState::loading();
        let id = self.id;
        debug!("Fetching employee {id}, generation {generation}");

        let api = Arc::clone(&ctx.api);
        let min_display = self.min_display;
        ctx.tasks.spawn(cancel, async move {
            let started = Instant::now();
            let result = api.get(id).await.map(|envelope| envelope.data);
            hold_until(started, min_display).await;
            Message::EmployeeLoaded { generation, result }
        });
    }

    pub fn apply_loaded(&mut self, generation: u64, result: Result<Employee, ApiError>) -> bool {
        if !self.scope.is_current(generation) {
            debug!("Dropping stale employee {}, generation {generation}", self.id);
            return false;
        }
        self.state = match result {
            Ok(employee) => LoadState::Ready(employee),
            Err(e) => {
                error!(error = %e, span_trace = %SpanTrace::capture(), "Loading employee {} failed", self.id);
                LoadState::Failed(LOAD_ERROR.to_string())
            }
        };
        true
    }

    /// Field/value pairs of the loaded record.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let LoadState::Ready(employee) = &self.state else {
            return Vec::new();
        };
        vec![
            ("ID", employee.id.map(|id| id.to_string()).unwrap_or_default()),
            ("First name", employee.first_name.clone()),
            ("Second name", employee.second_name.clone().unwrap_or_default()),
            ("Surname", employee.surname.clone()),
            ("Revenue", employee.revenue.to_string()),
            ("Quality", employee.quality.to_string()),
            ("Discipline", employee.discipline.to_string()),
        ]
    }
}
