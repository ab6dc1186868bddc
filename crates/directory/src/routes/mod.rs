use std::sync::Arc;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;

use crate::{
    auth::AuthConfig,
    catalog::{Departments, Roles},
    error::AppError,
};

mod admin;
mod home;
mod session;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthConfig>) -> Self {
        Self { db, auth }
    }
}

/// Every page of the directory. Transport layers (tracing, request ids) are
/// added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::homepage))
        .route("/login", get(session::login_form).post(session::login))
        .route("/logout", get(session::logout))
        .route("/dashboard", get(home::dashboard))
        .route("/admin/dashboard", get(home::admin_dashboard))
        .merge(admin::catalog_routes::<Departments>())
        .merge(admin::catalog_routes::<Roles>())
        .route(
            "/employees",
            get(admin::list_employees).post(admin::list_employees),
        )
        .route(
            "/employees/assign/{id}",
            get(admin::assign_form).post(admin::assign),
        )
        .fallback(page_not_found)
        .with_state(state)
}

async fn page_not_found() -> AppError {
    AppError::NotFound {
        entity: "page",
        id: String::new(),
    }
}
