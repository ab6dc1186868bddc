use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;

use super::AppState;
use crate::{
    auth::{RequestContext, check_admin},
    employees,
    error::AppResult,
    flash, views,
};

pub async fn homepage() -> Html<String> {
    views::home_page()
}

pub async fn dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let (department, role) = employees::placement(&state.db, ctx.employee_id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        views::dashboard_page(
            &ctx,
            department.as_deref(),
            role.as_deref(),
            flash.as_ref(),
        ),
    ))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = check_admin(&ctx)?;
    let counts = employees::counts(&state.db, &admin).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, views::admin_dashboard_page(&ctx, &counts, flash.as_ref())))
}
