//! Employee directory web application: department and role catalogs, employee
//! assignment, and cookie-backed sessions.
//!
//! The binary in `crates/server` owns configuration, migrations and the
//! transport stack; this crate owns everything behind [`build_router`].

pub mod auth;
pub mod catalog;
pub mod employees;
pub mod error;
pub mod flash;
pub mod forms;
pub mod routes;
pub mod seed;
pub mod views;

pub use error::{AppError, AppResult};
pub use routes::{AppState, build_router};
