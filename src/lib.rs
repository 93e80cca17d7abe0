//! Terminal front end for the employees REST backend.

pub mod api;
pub mod controller;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod pages;
pub mod router;
pub mod table;
pub mod task;
pub mod ui;
