use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, Departments, Roles},
    employees,
    error::{AppError, AppResult},
    forms::CatalogInput,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub departments_created: usize,
    pub roles_created: usize,
}

/// Provisions the first admin and a sample department and role. Records that
/// already exist are left untouched, so running it twice is harmless.
pub async fn seed_directory(
    db: &DatabaseConnection,
    admin_username: &str,
    admin_password: &str,
) -> AppResult<SeedReport> {
    let admin_created = match employees::find_by_username(db, admin_username).await? {
        Some(existing) => {
            if !existing.is_admin {
                warn!(
                    username = %existing.username,
                    "seed admin username belongs to a non-admin employee"
                );
            }
            false
        }
        None => {
            employees::provision_employee(db, admin_username, admin_password, true).await?;
            true
        }
    };
    let departments_created =
        usize::from(ensure_entry::<Departments>(db, "IT", "The IT Department").await?);
    let roles_created =
        usize::from(ensure_entry::<Roles>(db, "CEO", "Run the whole company").await?);

    let report = SeedReport {
        admin_created,
        departments_created,
        roles_created,
    };
    info!(?report, "directory seeded");
    Ok(report)
}

async fn ensure_entry<K: Catalog>(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
) -> AppResult<bool> {
    if K::find_by_name(db, name).await?.is_some() {
        return Ok(false);
    }
    let txn = db.begin().await?;
    K::insert(
        &txn,
        CatalogInput {
            name: name.to_string(),
            description: Some(description.to_string()),
        },
    )
    .await
    .map_err(|err| AppError::from_write(err, K::NOUN, name))?;
    txn.commit().await?;
    Ok(true)
}
