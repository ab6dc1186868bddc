use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};

use crate::{auth, forms::FormErrors, views};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("login required to reach {next}")]
    LoginRequired { next: String },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} name {name:?} already exists")]
    Duplicate { entity: &'static str, name: String },
    #[error("invalid form submission")]
    Validation(FormErrors),
    #[error("unreadable form body: {0}")]
    MalformedForm(#[from] FormRejection),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classifies a failed write. Only a unique-constraint violation becomes
    /// `Duplicate`; everything else stays a database fault.
    pub fn from_write(err: DbErr, entity: &'static str, name: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate {
                entity,
                name: name.to_string(),
            },
            _ => Self::Database(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedForm(rejection) => rejection.status(),
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::LoginRequired { next } => {
                Redirect::to(&auth::login_url(&next)).into_response()
            }
            AppError::Forbidden(reason) => {
                warn!(%reason, "request forbidden");
                views::error_page(status).into_response()
            }
            AppError::MalformedForm(rejection) => {
                warn!(reason = %rejection.body_text(), "form rejected");
                views::error_page(status).into_response()
            }
            AppError::Database(err) => {
                error!(error = %err, "database failure");
                views::error_page(status).into_response()
            }
            AppError::Internal(err) => {
                error!(error = ?err, "internal failure");
                views::error_page(status).into_response()
            }
            _ => views::error_page(status).into_response(),
        }
    }
}
