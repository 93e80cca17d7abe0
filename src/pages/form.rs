//! New employee form.

use std::sync::Arc;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, error, info};
use tracing_error::SpanTrace;

use super::PageContext;
use crate::api::{ApiError, Employee};
use crate::domain::Message;
use crate::inputter::{InputEvent, Inputter};
use crate::task::TaskScope;

pub const CREATE_ERROR: &str = "Could not create employee";

const FIRST_NAME: usize = 0;
const SECOND_NAME: usize = 1;
const SURNAME: usize = 2;
const REVENUE: usize = 3;
const QUALITY: usize = 4;
const DISCIPLINE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text { required: bool },
    Score,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    kind: FieldKind,
}

impl FormField {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            value: String::new(),
            kind,
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.kind, FieldKind::Text { required: false })
    }
}

pub struct FormPage {
    fields: Vec<FormField>,
    focus: usize,
    input: Inputter,
    error: Option<String>,
    submitting: bool,
    scope: TaskScope,
}

impl Default for FormPage {
    fn default() -> Self {
        Self::new()
    }
}

impl FormPage {
    pub fn new() -> Self {
        Self {
            fields: vec![
                FormField::new("First name", FieldKind::Text { required: true }),
                FormField::new("Second name", FieldKind::Text { required: false }),
                FormField::new("Surname", FieldKind::Text { required: true }),
                FormField::new("Revenue", FieldKind::Score),
                FormField::new("Quality", FieldKind::Score),
                FormField::new("Discipline", FieldKind::Score),
            ],
            focus: 0,
            input: Inputter::default(),
            error: None,
            submitting: false,
            scope: TaskScope::default(),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Cursor position inside the focused field, in characters.
    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn unmount(&mut self) {
        self.scope.cancel_all();
        self.submitting = false;
    }

    /// While a create request is in flight only Esc is handled.
    pub fn handle_key(&mut self, key: KeyEvent, ctx: &PageContext) -> Option<Message> {
        if self.submitting && key.code != KeyCode::Esc {
            return None;
        }
        match self.input.read(key) {
            InputEvent::Edited => {
                self.fields[self.focus].value = self.input.value().to_string();
                None
            }
            InputEvent::NextField => {
                self.move_focus(true);
                None
            }
            InputEvent::PrevField => {
                self.move_focus(false);
                None
            }
            InputEvent::Submitted => {
                self.submit(ctx);
                None
            }
            InputEvent::Cancelled => Some(Message::Back),
            InputEvent::Ignored => None,
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
        self.input.set(&self.fields[self.focus].value);
    }

    pub fn validate(&self) -> Result<Employee, String> {
        for field in &self.fields {
            if field.is_required() && field.value.trim().is_empty() {
                return Err(format!("{} is required", field.label));
            }
        }
        let second_name = self.fields[SECOND_NAME].value.trim();
        Ok(Employee {
            id: None,
            first_name: self.fields[FIRST_NAME].value.trim().to_string(),
            second_name: (!second_name.is_empty()).then(|| second_name.to_string()),
            surname: self.fields[SURNAME].value.trim().to_string(),
            revenue: self.score(REVENUE)?,
            quality: self.score(QUALITY)?,
            discipline: self.score(DISCIPLINE)?,
        })
    }

    fn score(&self, idx: usize) -> Result<f64, String> {
        let field = &self.fields[idx];
        match field.value.trim().replace(',', ".").parse::<f64>() {
            Ok(value) if (0.0..=10.0).contains(&value) => Ok(value),
            _ => Err(format!("{} must be a number between 0 and 10", field.label)),
        }
    }

    /// Validates and sends the create request. Returns false on invalid input.
    pub fn submit(&mut self, ctx: &PageContext) -> bool {
        let employee = match self.validate() {
            Ok(employee) => employee,
            Err(message) => {
                debug!("Form invalid: {message}");
                self.error = Some(message);
                return false;
            }
        };
        self.error = None;
        self.submitting = true;
        let (generation, cancel) = self.scope.next_request();
        info!("Creating employee {}", employee.full_name());

        let api = Arc::clone(&ctx.api);
        ctx.tasks.spawn(cancel, async move {
            let result = api.create(&employee).await.map(|_| ());
            Message::EmployeeCreated { generation, result }
        });
        true
    }

    /// `None` for a stale result, otherwise whether the employee was created.
    pub fn apply_created(&mut self, generation: u64, result: Result<(), ApiError>) -> Option<bool> {
        if !self.scope.is_current(generation) {
            return None;
        }
        self.submitting = false;
        self.input.set(&self.fields[self.focus].value);
        match result {
            Ok(()) => Some(true),
            Err(e) => {
                error!(error = %e, span_trace = %SpanTrace::capture(), "Creating employee failed");
                self.error = Some(format!("{CREATE_ERROR}: {e}"));
                Some(false)
            }
        }
    }
}
