//! Page controllers. Each page owns its data and its async tasks; the model
//! mounts a page when its route becomes current and unmounts it on leave.

use std::sync::Arc;
use std::time::Instant;

use crate::api::EmployeeApi;
use crate::task::Tasks;

pub mod detail;
pub mod employees;
pub mod form;

pub use detail::DetailPage;
pub use employees::EmployeesPage;
pub use form::FormPage;

/// What a page needs to start work.
#[derive(Clone)]
pub struct PageContext {
    pub api: Arc<dyn EmployeeApi>,
    pub tasks: Tasks,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading { started: Instant },
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loading() -> Self {
        LoadState::Loading {
            started: Instant::now(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }
}
