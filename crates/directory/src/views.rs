//! Server-rendered pages as plain HTML strings. Every interpolated value goes
//! through [`escape`].

use std::fmt::Write as _;

use axum::{http::StatusCode, response::Html};

use crate::{
    auth::RequestContext,
    catalog::{Catalog, CatalogEntry},
    employees::{DirectoryCounts, EmployeeRow},
    flash::Flash,
    forms::{AssignForm, EntryForm, FormErrors, LoginForm},
};

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(
    title: &str,
    ctx: Option<&RequestContext>,
    flash: Option<&Flash>,
    body: &str,
) -> Html<String> {
    let nav = match ctx {
        Some(ctx) if ctx.is_admin => format!(
            r#"<a href="/admin/dashboard">Dashboard</a> <a href="/departments">Departments</a> <a href="/roles">Roles</a> <a href="/employees">Employees</a> <a href="/logout">Logout</a> <span>Hi, {}!</span>"#,
            escape(&ctx.username)
        ),
        Some(ctx) => format!(
            r#"<a href="/dashboard">Dashboard</a> <a href="/logout">Logout</a> <span>Hi, {}!</span>"#,
            escape(&ctx.username)
        ),
        None => r#"<a href="/">Home</a> <a href="/login">Login</a>"#.to_string(),
    };
    let flash = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | Employee Directory</title></head>\n<body>\n<nav>{nav}</nav>\n{flash}\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    errors
        .for_field(field)
        .map(|msg| format!(r#"<span class="error">{}</span>"#, escape(msg)))
        .collect()
}

pub fn home_page() -> Html<String> {
    layout(
        "Home",
        None,
        None,
        "<h1>Employee Directory</h1>\n<p>Departments, roles and who belongs where.</p>",
    )
}

pub fn login_page(form: &LoginForm, errors: &FormErrors, flash: Option<&Flash>) -> Html<String> {
    let next = form
        .next
        .as_deref()
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Login</h1>
<form method="post" action="/login">
{next}
<label>Username <input name="username" value="{username}"></label>{username_errors}
<label>Password <input type="password" name="password"></label>{password_errors}
<button type="submit">Login</button>
</form>"#,
        username = escape(&form.username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    );
    layout("Login", None, flash, &body)
}

pub fn dashboard_page(
    ctx: &RequestContext,
    department: Option<&str>,
    role: Option<&str>,
    flash: Option<&Flash>,
) -> Html<String> {
    let body = format!(
        "<h1>Dashboard</h1>\n<p>Department: {}</p>\n<p>Role: {}</p>",
        escape(department.unwrap_or("-")),
        escape(role.unwrap_or("-")),
    );
    layout("Dashboard", Some(ctx), flash, &body)
}

pub fn admin_dashboard_page(
    ctx: &RequestContext,
    counts: &DirectoryCounts,
    flash: Option<&Flash>,
) -> Html<String> {
    let body = format!(
        "<h1>Admin Dashboard</h1>\n<ul>\n<li>Departments: {}</li>\n<li>Roles: {}</li>\n<li>Employees: {}</li>\n</ul>",
        counts.departments, counts.roles, counts.employees,
    );
    layout("Admin Dashboard", Some(ctx), flash, &body)
}

pub fn catalog_list_page<K: Catalog>(
    ctx: &RequestContext,
    entries: &[CatalogEntry],
    flash: Option<&Flash>,
) -> Html<String> {
    let mut body = format!("<h1>{}</h1>\n", K::TITLE);
    if entries.is_empty() {
        let _ = writeln!(body, "<p>No {} have been added.</p>", K::TITLE.to_lowercase());
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Description</th><th></th><th></th></tr>\n");
        for entry in entries {
            let _ = writeln!(
                body,
                r#"<tr><td>{}</td><td>{}</td><td><a href="{}">Edit</a></td><td><a href="{}">Delete</a></td></tr>"#,
                escape(&entry.name),
                escape(entry.description.as_deref().unwrap_or("")),
                K::edit_path(entry.id),
                K::delete_path(entry.id),
            );
        }
        body.push_str("</table>\n");
    }
    let _ = write!(body, r#"<a href="{}">Add {}</a>"#, K::add_path(), K::NOUN);
    layout(K::TITLE, Some(ctx), flash, &body)
}

#[derive(Clone, Copy, Debug)]
pub enum FormAction {
    Add,
    Edit(i32),
}

pub fn catalog_form_page<K: Catalog>(
    ctx: &RequestContext,
    action: FormAction,
    form: &EntryForm,
    errors: &FormErrors,
) -> Html<String> {
    let (verb, target) = match action {
        FormAction::Add => ("Add", K::add_path()),
        FormAction::Edit(id) => ("Edit", K::edit_path(id)),
    };
    let title = format!("{} {}", verb, capitalize(K::NOUN));
    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{target}">
<label>Name <input name="name" value="{name}"></label>{name_errors}
<label>Description <input name="description" value="{description}"></label>{description_errors}
<button type="submit">Submit</button>
</form>"#,
        title = escape(&title),
        name = escape(&form.name),
        name_errors = field_errors(errors, "name"),
        description = escape(form.description.as_deref().unwrap_or("")),
        description_errors = field_errors(errors, "description"),
    );
    layout(&title, Some(ctx), None, &body)
}

pub fn employee_list_page(
    ctx: &RequestContext,
    rows: &[EmployeeRow],
    flash: Option<&Flash>,
) -> Html<String> {
    let mut body = String::from(
        "<h1>Employees</h1>\n<table>\n<tr><th>Username</th><th>Department</th><th>Role</th><th></th></tr>\n",
    );
    for row in rows {
        let action = if row.is_admin {
            "<td>Admin</td>".to_string()
        } else {
            format!(
                r#"<td><a href="/employees/assign/{}">Assign</a></td>"#,
                row.id
            )
        };
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
            escape(&row.username),
            escape(row.department.as_deref().unwrap_or("-")),
            escape(row.role.as_deref().unwrap_or("-")),
            action,
        );
    }
    body.push_str("</table>");
    layout("Employees", Some(ctx), flash, &body)
}

fn select(name: &str, options: &[CatalogEntry], selected: &str) -> String {
    let mut out = format!(r#"<select name="{}">"#, name);
    for option in options {
        let id = option.id.to_string();
        let marker = if id == selected { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            id,
            marker,
            escape(&option.name)
        );
    }
    out.push_str("</select>");
    out
}

pub fn assign_page(
    ctx: &RequestContext,
    employee_id: i32,
    username: &str,
    departments: &[CatalogEntry],
    roles: &[CatalogEntry],
    form: &AssignForm,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        r#"<h1>Assign Department and Role</h1>
<p>Select a department and role to assign to <strong>{username}</strong>.</p>
<form method="post" action="/employees/assign/{employee_id}">
<label>Department {departments}</label>{department_errors}
<label>Role {roles}</label>{role_errors}
<button type="submit">Submit</button>
</form>"#,
        username = escape(username),
        departments = select("department", departments, form.department.trim()),
        department_errors = field_errors(errors, "department"),
        roles = select("role", roles, form.role.trim()),
        role_errors = field_errors(errors, "role"),
    );
    layout("Assign Employee", Some(ctx), None, &body)
}

pub fn error_page(status: StatusCode) -> (StatusCode, Html<String>) {
    let message = match status {
        StatusCode::FORBIDDEN => "You do not have sufficient permissions to access this page.",
        StatusCode::NOT_FOUND => "The page you're looking for doesn't exist.",
        StatusCode::CONFLICT => "That name is already taken.",
        StatusCode::BAD_REQUEST => "The submitted form was invalid.",
        status if status.is_client_error() => "The request could not be processed.",
        _ => "The server encountered an internal error.",
    };
    let code = status.as_u16();
    let body = format!("<h1>{code} Error</h1>\n<p>{message}</p>\n<a href=\"/\">Home</a>");
    (status, layout(&format!("{code} Error"), None, None, &body))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
