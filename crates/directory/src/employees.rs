use std::collections::HashMap;

use entity::{department, employee, role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

use crate::{
    auth::{self, Admin},
    catalog::{Catalog, Departments, Roles},
    error::{AppError, AppResult},
    forms::{self, Assignment},
};

/// One line of the employee listing, with references resolved to names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub department: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectoryCounts {
    pub departments: u64,
    pub roles: u64,
    pub employees: u64,
}

pub async fn list_employees(db: &DatabaseConnection, _admin: &Admin) -> AppResult<Vec<EmployeeRow>> {
    let employees = employee::Entity::find()
        .order_by_asc(employee::Column::Id)
        .all(db)
        .await?;
    let departments: HashMap<i32, String> = department::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();
    let roles: HashMap<i32, String> = role::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();
    Ok(employees
        .into_iter()
        .map(|e| EmployeeRow {
            department: e.department_id.and_then(|id| departments.get(&id).cloned()),
            role: e.role_id.and_then(|id| roles.get(&id).cloned()),
            id: e.id,
            username: e.username,
            is_admin: e.is_admin,
        })
        .collect())
}

/// Loads an employee that may receive an assignment. Admins are not assignable.
pub async fn assignable_employee(
    db: &DatabaseConnection,
    _admin: &Admin,
    id: i32,
) -> AppResult<employee::Model> {
    let employee = employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("employee", id))?;
    if employee.is_admin {
        return Err(AppError::forbidden(format!(
            "employee {} is an admin and cannot be assigned",
            id
        )));
    }
    Ok(employee)
}

/// Sets department and role together. Both references are checked inside the
/// same transaction that writes them.
pub async fn assign(
    db: &DatabaseConnection,
    admin: &Admin,
    id: i32,
    assignment: Assignment,
) -> AppResult<employee::Model> {
    let txn = db.begin().await?;
    let employee = employee::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("employee", id))?;
    if employee.is_admin {
        return Err(AppError::forbidden(format!(
            "employee {} is an admin and cannot be assigned",
            id
        )));
    }
    if department::Entity::find_by_id(assignment.department_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(forms::invalid_choice("department")));
    }
    if role::Entity::find_by_id(assignment.role_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(forms::invalid_choice("role")));
    }

    let mut active: employee::ActiveModel = employee.into();
    active.department_id = Set(Some(assignment.department_id));
    active.role_id = Set(Some(assignment.role_id));
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    info!(
        employee = id,
        department = assignment.department_id,
        role = assignment.role_id,
        by = admin.employee_id(),
        "employee assigned"
    );
    Ok(updated)
}

pub async fn counts(db: &DatabaseConnection, _admin: &Admin) -> AppResult<DirectoryCounts> {
    Ok(DirectoryCounts {
        departments: Departments::count(db).await?,
        roles: Roles::count(db).await?,
        employees: employee::Entity::find().count(db).await?,
    })
}

/// Department and role names of the given employee, for their own dashboard.
pub async fn placement(
    db: &DatabaseConnection,
    employee_id: i32,
) -> AppResult<(Option<String>, Option<String>)> {
    let employee = employee::Entity::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("employee", employee_id))?;
    let department = match employee.department_id {
        Some(id) => Departments::find(db, id).await?.map(|d| d.name),
        None => None,
    };
    let role = match employee.role_id {
        Some(id) => Roles::find(db, id).await?.map(|r| r.name),
        None => None,
    };
    Ok((department, role))
}

/// Creates an account with a freshly hashed password. Used by the operator CLI.
pub async fn provision_employee(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    is_admin: bool,
) -> AppResult<employee::Model> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(forms::FormErrors::single(
            "username",
            "Username and password are required.",
        )));
    }
    let password_hash = auth::hash_password(password)?;
    let txn = db.begin().await?;
    let model = employee::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        department_id: Set(None),
        role_id: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| AppError::from_write(err, "employee", username))?;
    txn.commit().await?;
    info!(employee = model.id, is_admin, "employee provisioned");
    Ok(model)
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> AppResult<Option<employee::Model>> {
    Ok(employee::Entity::find()
        .filter(employee::Column::Username.eq(username.trim()))
        .one(db)
        .await?)
}
