use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use super::AppState;
use crate::{
    auth::{RequestContext, check_admin},
    catalog::{self, Catalog, Departments, Roles},
    employees,
    error::{AppError, AppResult},
    flash::{self, Flash},
    forms::{AssignForm, EntryForm, FormErrors},
    views::{self, FormAction},
};

const EMPLOYEES_PATH: &str = "/employees";

/// List, add, edit and delete pages for one catalog kind.
pub fn catalog_routes<K: Catalog>() -> Router<AppState> {
    Router::new()
        .route(K::PATH, get(list::<K>).post(list::<K>))
        .route(
            &format!("{}/add", K::PATH),
            get(add_form::<K>).post(add::<K>),
        )
        .route(
            &format!("{}/edit/{{id}}", K::PATH),
            get(edit_form::<K>).post(edit::<K>),
        )
        .route(
            &format!("{}/delete/{{id}}", K::PATH),
            get(delete::<K>).post(delete::<K>),
        )
}

async fn list<K: Catalog>(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = check_admin(&ctx)?;
    let entries = catalog::list_entries::<K>(&state.db, &admin).await?;
    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        views::catalog_list_page::<K>(&ctx, &entries, flash.as_ref()),
    ))
}

async fn add_form<K: Catalog>(ctx: RequestContext) -> AppResult<Html<String>> {
    check_admin(&ctx)?;
    Ok(views::catalog_form_page::<K>(
        &ctx,
        FormAction::Add,
        &EntryForm::default(),
        &FormErrors::default(),
    ))
}

#[instrument(name = "catalog.add", skip_all, fields(kind = K::NOUN))]
async fn add<K: Catalog>(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    form: Result<Form<EntryForm>, FormRejection>,
) -> AppResult<Response> {
    let admin = check_admin(&ctx)?;
    let Form(form) = form?;
    let input = match form.clone().parse() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(
                views::catalog_form_page::<K>(&ctx, FormAction::Add, &form, &errors)
                    .into_response(),
            );
        }
    };
    let message = match catalog::add_entry::<K>(&state.db, &admin, input).await {
        Ok(_) => Flash::success(format!("You have successfully added a new {}.", K::NOUN)),
        Err(AppError::Duplicate { .. }) => {
            Flash::error(format!("Error: {} name already exists.", K::NOUN))
        }
        Err(err) => return Err(err),
    };
    Ok((flash::push(jar, message), Redirect::to(K::PATH)).into_response())
}

async fn edit_form<K: Catalog>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let admin = check_admin(&ctx)?;
    let entry = catalog::load_entry::<K>(&state.db, &admin, id).await?;
    Ok(views::catalog_form_page::<K>(
        &ctx,
        FormAction::Edit(id),
        &EntryForm::from(&entry),
        &FormErrors::default(),
    ))
}

#[instrument(name = "catalog.edit", skip_all, fields(kind = K::NOUN))]
async fn edit<K: Catalog>(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<i32>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> AppResult<Response> {
    let admin = check_admin(&ctx)?;
    catalog::load_entry::<K>(&state.db, &admin, id).await?;
    let Form(form) = form?;
    let input = match form.clone().parse() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(
                views::catalog_form_page::<K>(&ctx, FormAction::Edit(id), &form, &errors)
                    .into_response(),
            );
        }
    };
    let message = match catalog::edit_entry::<K>(&state.db, &admin, id, input).await {
        Ok(_) => Flash::success(format!("You have successfully edited the {}.", K::NOUN)),
        Err(AppError::Duplicate { .. }) => {
            Flash::error(format!("Error: {} name already exists.", K::NOUN))
        }
        Err(err) => return Err(err),
    };
    Ok((flash::push(jar, message), Redirect::to(K::PATH)).into_response())
}

#[instrument(name = "catalog.delete", skip_all, fields(kind = K::NOUN))]
async fn delete<K: Catalog>(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Redirect)> {
    let admin = check_admin(&ctx)?;
    catalog::delete_entry::<K>(&state.db, &admin, id).await?;
    let message = Flash::success(format!("You have successfully deleted the {}.", K::NOUN));
    Ok((flash::push(jar, message), Redirect::to(K::PATH)))
}

pub async fn list_employees(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let admin = check_admin(&ctx)?;
    let rows = employees::list_employees(&state.db, &admin).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, views::employee_list_page(&ctx, &rows, flash.as_ref())))
}

pub async fn assign_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let admin = check_admin(&ctx)?;
    let employee = employees::assignable_employee(&state.db, &admin, id).await?;
    let form = AssignForm::current(employee.department_id, employee.role_id);
    render_assign(&state, &ctx, &admin, &employee, &form, &FormErrors::default()).await
}

#[instrument(name = "employee.assign", skip_all)]
pub async fn assign(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<i32>,
    form: Result<Form<AssignForm>, FormRejection>,
) -> AppResult<Response> {
    let admin = check_admin(&ctx)?;
    let employee = employees::assignable_employee(&state.db, &admin, id).await?;
    let Form(form) = form?;
    let assignment = match form.parse() {
        Ok(assignment) => assignment,
        Err(errors) => {
            return render_assign(&state, &ctx, &admin, &employee, &form, &errors)
                .await
                .map(IntoResponse::into_response);
        }
    };
    match employees::assign(&state.db, &admin, id, assignment).await {
        Ok(_) => {
            let message = Flash::success("You have successfully assigned a department and role.");
            Ok((flash::push(jar, message), Redirect::to(EMPLOYEES_PATH)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            render_assign(&state, &ctx, &admin, &employee, &form, &errors)
                .await
                .map(IntoResponse::into_response)
        }
        Err(err) => Err(err),
    }
}

async fn render_assign(
    state: &AppState,
    ctx: &RequestContext,
    admin: &crate::auth::Admin,
    employee: &entity::employee::Model,
    form: &AssignForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let departments = catalog::list_entries::<Departments>(&state.db, admin).await?;
    let roles = catalog::list_entries::<Roles>(&state.db, admin).await?;
    Ok(views::assign_page(
        ctx,
        employee.id,
        &employee.username,
        &departments,
        &roles,
        form,
        errors,
    ))
}
