use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::AppState;
use crate::{
    auth::{self, RequestContext},
    employees,
    error::{AppError, AppResult},
    flash::{self, Flash},
    forms::{FormErrors, LoginForm},
    views,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn login_form(Query(query): Query<NextQuery>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    let (jar, flash) = flash::take(jar);
    let page = views::login_page(&form, &FormErrors::default(), flash.as_ref());
    (jar, page)
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    let form = LoginForm {
        username: form.username.trim().to_string(),
        ..form
    };
    if let Err(errors) = form.validate() {
        let errors = FormErrors::from(errors);
        return Ok(views::login_page(&blank_password(&form), &errors, None).into_response());
    }

    let employee = employees::find_by_username(&state.db, &form.username)
        .await?
        .filter(|e| auth::verify_password(&form.password, &e.password_hash));
    let Some(employee) = employee else {
        warn!(username = %form.username, "login rejected");
        let message = Flash::error(INVALID_CREDENTIALS);
        return Ok(views::login_page(&blank_password(&form), &FormErrors::default(), Some(&message))
            .into_response());
    };

    let token = auth::issue_token(employee.id, &state.auth)
        .map_err(|err| AppError::Internal(err.into()))?;
    let jar = jar.add(auth::session_cookie(token, &state.auth));
    info!(employee = employee.id, "employee logged in");

    let target = match auth::safe_next(form.next.as_deref()) {
        Some(next) => next.to_string(),
        None if employee.is_admin => "/admin/dashboard".to_string(),
        None => "/dashboard".to_string(),
    };
    Ok((jar, Redirect::to(&target)).into_response())
}

pub async fn logout(ctx: RequestContext, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = auth::clear_session(jar);
    let jar = flash::push(jar, Flash::success("You have successfully been logged out."));
    info!(employee = ctx.employee_id, "employee logged out");
    (jar, Redirect::to(auth::LOGIN_PATH))
}

fn blank_password(form: &LoginForm) -> LoginForm {
    LoginForm {
        password: String::new(),
        ..form.clone()
    }
}
