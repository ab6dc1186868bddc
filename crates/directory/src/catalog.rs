//! Departments and roles share one shape (`id`, unique `name`, optional
//! `description`) and one set of admin flows. [`Catalog`] abstracts the storage
//! of each kind; the functions below implement list/add/edit/delete once.

use async_trait::async_trait;
use entity::{department, employee, role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use tracing::info;

use crate::{
    auth::Admin,
    error::{AppError, AppResult},
    forms::CatalogInput,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<department::Model> for CatalogEntry {
    fn from(model: department::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

impl From<role::Model> for CatalogEntry {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    /// Lowercase noun used in messages, e.g. "department".
    const NOUN: &'static str;
    /// Page heading for the list view, e.g. "Departments".
    const TITLE: &'static str;
    /// Mount point of the list view; add/edit/delete hang off it.
    const PATH: &'static str;

    async fn all(db: &DatabaseConnection) -> Result<Vec<CatalogEntry>, DbErr>;

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<CatalogEntry>, DbErr>;

    async fn find_by_name(
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<Option<CatalogEntry>, DbErr>;

    async fn count(db: &DatabaseConnection) -> Result<u64, DbErr>;

    async fn insert(txn: &DatabaseTransaction, input: CatalogInput)
    -> Result<CatalogEntry, DbErr>;

    async fn update(
        txn: &DatabaseTransaction,
        id: i32,
        input: CatalogInput,
    ) -> Result<Option<CatalogEntry>, DbErr>;

    /// Removes the record after clearing every employee reference to it.
    /// Returns the number of employees released, or `None` when `id` is unknown.
    async fn remove(txn: &DatabaseTransaction, id: i32) -> Result<Option<u64>, DbErr>;

    fn add_path() -> String {
        format!("{}/add", Self::PATH)
    }

    fn edit_path(id: i32) -> String {
        format!("{}/edit/{}", Self::PATH, id)
    }

    fn delete_path(id: i32) -> String {
        format!("{}/delete/{}", Self::PATH, id)
    }
}

pub struct Departments;

pub struct Roles;

#[async_trait]
impl Catalog for Departments {
    const NOUN: &'static str = "department";
    const TITLE: &'static str = "Departments";
    const PATH: &'static str = "/departments";

    async fn all(db: &DatabaseConnection) -> Result<Vec<CatalogEntry>, DbErr> {
        let rows = department::Entity::find()
            .order_by_asc(department::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<CatalogEntry>, DbErr> {
        Ok(department::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into))
    }

    async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        department::Entity::find().count(db).await
    }

    async fn find_by_name(
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<Option<CatalogEntry>, DbErr> {
        Ok(department::Entity::find()
            .filter(department::Column::Name.eq(name))
            .one(db)
            .await?
            .map(Into::into))
    }

    async fn insert(
        txn: &DatabaseTransaction,
        input: CatalogInput,
    ) -> Result<CatalogEntry, DbErr> {
        let model = department::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn update(
        txn: &DatabaseTransaction,
        id: i32,
        input: CatalogInput,
    ) -> Result<Option<CatalogEntry>, DbErr> {
        let Some(model) = department::Entity::find_by_id(id).one(txn).await? else {
            return Ok(None);
        };
        let mut active: department::ActiveModel = model.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        Ok(Some(active.update(txn).await?.into()))
    }

    async fn remove(txn: &DatabaseTransaction, id: i32) -> Result<Option<u64>, DbErr> {
        if department::Entity::find_by_id(id).one(txn).await?.is_none() {
            return Ok(None);
        }
        let released = employee::Entity::update_many()
            .col_expr(employee::Column::DepartmentId, Expr::value(None::<i32>))
            .filter(employee::Column::DepartmentId.eq(id))
            .exec(txn)
            .await?
            .rows_affected;
        department::Entity::delete_by_id(id).exec(txn).await?;
        Ok(Some(released))
    }
}

#[async_trait]
impl Catalog for Roles {
    const NOUN: &'static str = "role";
    const TITLE: &'static str = "Roles";
    const PATH: &'static str = "/roles";

    async fn all(db: &DatabaseConnection) -> Result<Vec<CatalogEntry>, DbErr> {
        let rows = role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<CatalogEntry>, DbErr> {
        Ok(role::Entity::find_by_id(id).one(db).await?.map(Into::into))
    }

    async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        role::Entity::find().count(db).await
    }

    async fn find_by_name(
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<Option<CatalogEntry>, DbErr> {
        Ok(role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(db)
            .await?
            .map(Into::into))
    }

    async fn insert(
        txn: &DatabaseTransaction,
        input: CatalogInput,
    ) -> Result<CatalogEntry, DbErr> {
        let model = role::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(model.into())
    }

    async fn update(
        txn: &DatabaseTransaction,
        id: i32,
        input: CatalogInput,
    ) -> Result<Option<CatalogEntry>, DbErr> {
        let Some(model) = role::Entity::find_by_id(id).one(txn).await? else {
            return Ok(None);
        };
        let mut active: role::ActiveModel = model.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        Ok(Some(active.update(txn).await?.into()))
    }

    async fn remove(txn: &DatabaseTransaction, id: i32) -> Result<Option<u64>, DbErr> {
        if role::Entity::find_by_id(id).one(txn).await?.is_none() {
            return Ok(None);
        }
        let released = employee::Entity::update_many()
            .col_expr(employee::Column::RoleId, Expr::value(None::<i32>))
            .filter(employee::Column::RoleId.eq(id))
            .exec(txn)
            .await?
            .rows_affected;
        role::Entity::delete_by_id(id).exec(txn).await?;
        Ok(Some(released))
    }
}

pub async fn list_entries<K: Catalog>(
    db: &DatabaseConnection,
    _admin: &Admin,
) -> AppResult<Vec<CatalogEntry>> {
    Ok(K::all(db).await?)
}

pub async fn load_entry<K: Catalog>(
    db: &DatabaseConnection,
    _admin: &Admin,
    id: i32,
) -> AppResult<CatalogEntry> {
    K::find(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(K::NOUN, id))
}

pub async fn add_entry<K: Catalog>(
    db: &DatabaseConnection,
    admin: &Admin,
    input: CatalogInput,
) -> AppResult<CatalogEntry> {
    let name = input.name.clone();
    let txn = db.begin().await?;
    let entry = K::insert(&txn, input)
        .await
        .map_err(|err| AppError::from_write(err, K::NOUN, &name))?;
    txn.commit()
        .await
        .map_err(|err| AppError::from_write(err, K::NOUN, &name))?;
    info!(kind = K::NOUN, id = entry.id, by = admin.employee_id(), "catalog entry added");
    Ok(entry)
}

pub async fn edit_entry<K: Catalog>(
    db: &DatabaseConnection,
    admin: &Admin,
    id: i32,
    input: CatalogInput,
) -> AppResult<CatalogEntry> {
    let name = input.name.clone();
    let txn = db.begin().await?;
    let entry = K::update(&txn, id, input)
        .await
        .map_err(|err| AppError::from_write(err, K::NOUN, &name))?
        .ok_or_else(|| AppError::not_found(K::NOUN, id))?;
    txn.commit()
        .await
        .map_err(|err| AppError::from_write(err, K::NOUN, &name))?;
    info!(kind = K::NOUN, id, by = admin.employee_id(), "catalog entry edited");
    Ok(entry)
}

pub async fn delete_entry<K: Catalog>(
    db: &DatabaseConnection,
    admin: &Admin,
    id: i32,
) -> AppResult<()> {
    let txn = db.begin().await?;
    let released = K::remove(&txn, id)
        .await?
        .ok_or_else(|| AppError::not_found(K::NOUN, id))?;
    txn.commit().await?;
    info!(
        kind = K::NOUN,
        id,
        released,
        by = admin.employee_id(),
        "catalog entry deleted"
    );
    Ok(())
}
