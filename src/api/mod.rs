//! REST client for the employees backend.
//!
//! Every call is a fresh round trip: no retry, no timeout, no caching.
//! Callers turn [`ApiError`]s into UI facing messages.

mod client;
mod error;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{EmployeeApi, RestClient};
pub use error::{ApiError, ErrorDetail};
pub use types::{Employee, Envelope};
