use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ratatui::crossterm::event::KeyEvent;

use crate::api::{ApiError, Employee};
use crate::router::Route;
use crate::table::DEFAULT_ITEMS_PER_PAGE;
use crate::table::collate::DEFAULT_LOCALE;

pub const DEFAULT_MIN_LOADING_MS: u64 = 1500;

pub const HELP_TEXT: &str = "\
Navigation
  1 / 2 / 3        Home / Departments / Employees
  Esc, Backspace   Back / close popup
  q                Quit

Employees table
  Up/Down, k/j     Select row
  Left/Right, h/l  Focus column header
  s                Sort by focused column (again to reverse)
  PgDn/PgUp, ]/[   Next / previous page
  Home/End, g/G    First / last page
  p                Go to page number
  Enter, e         Open employee
  d, Del           Delete employee
  a                Add employee
  y                Copy row to clipboard
  r                Reload

New employee form
  Tab / Shift-Tab  Next / previous field
  Enter            Save
  Esc              Cancel";

/// Command line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct AppConfig {
    /// Base URL of the employees REST backend.
    #[arg(long, env = "STAFFVIEW_BASE_URL", default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Rows per table page.
    #[arg(long, env = "STAFFVIEW_ITEMS_PER_PAGE", default_value_t = DEFAULT_ITEMS_PER_PAGE)]
    pub items_per_page: usize,

    /// Locale used to order text columns, e.g. `ru`, `en` or `de-AT`.
    #[arg(long, env = "STAFFVIEW_LOCALE", default_value = DEFAULT_LOCALE)]
    pub locale: String,

    /// Minimum time the loading indicator stays up, in milliseconds.
    #[arg(long, env = "STAFFVIEW_MIN_LOADING_MS", default_value_t = DEFAULT_MIN_LOADING_MS)]
    pub min_loading_ms: u64,

    /// Key event poll interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub event_poll_time: u64,

    /// Route to open on start.
    #[arg(long, default_value = "/")]
    pub route: String,

    /// Log file, `~` and environment variables are expanded.
    #[arg(long, env = "STAFFVIEW_LOG_FILE", default_value = "~/.staffview.log")]
    pub log_file: String,

    /// Log filter directive, e.g. `debug` or `staffview=trace`. Falls back to RUST_LOG.
    #[arg(long, env = "STAFFVIEW_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    pub fn start_route(&self) -> Route {
        Route::parse(&self.route)
    }

    pub fn log_path(&self) -> Result<PathBuf, AppError> {
        shellexpand::full(&self.log_file)
            .map(|p| PathBuf::from(p.as_ref()))
            .map_err(|e| AppError::Config(format!("log file \"{}\": {e}", self.log_file)))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            locale: DEFAULT_LOCALE.to_string(),
            min_loading_ms: DEFAULT_MIN_LOADING_MS,
            event_poll_time: 100,
            route: "/".to_string(),
            log_file: "~/.staffview.log".to_string(),
            log_level: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// How key presses are interpreted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
    ConfirmDelete,
    /// Keys go to a text input unmapped.
    Text,
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Back,
    Navigate(Route),

    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Sort,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Opens the page number prompt.
    GoToPage,
    SetPage(usize),
    Edit,
    Delete,
    Add,
    Retry,
    CopyRow,
    Confirm,
    Decline,
    RawKey(KeyEvent),

    EditRequested(Employee),
    DeleteRequested(Employee),

    EmployeesLoaded {
        generation: u64,
        result: Result<Vec<Employee>, ApiError>,
    },
    EmployeeLoaded {
        generation: u64,
        result: Result<Employee, ApiError>,
    },
    EmployeeDeleted {
        id: i64,
        result: Result<(), ApiError>,
    },
    EmployeeCreated {
        generation: u64,
        result: Result<(), ApiError>,
    },
}
