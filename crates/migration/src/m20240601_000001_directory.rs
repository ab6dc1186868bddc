use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    Username,
    PasswordHash,
    IsAdmin,
    DepartmentId,
    RoleId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Department::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Department::Name).string_len(60).not_null())
                    .col(ColumnDef::new(Department::Description).string_len(200))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_name")
                    .table(Department::Table)
                    .col(Department::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Role::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Role::Name).string_len(60).not_null())
                    .col(ColumnDef::new(Role::Description).string_len(200))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_name")
                    .table(Role::Table)
                    .col(Role::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employee::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employee::Username).string_len(60).not_null())
                    .col(ColumnDef::new(Employee::PasswordHash).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Employee::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Employee::DepartmentId).integer())
                    .col(ColumnDef::new(Employee::RoleId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_department")
                            .from(Employee::Table, Employee::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_role")
                            .from(Employee::Table, Employee::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_username")
                    .table(Employee::Table)
                    .col(Employee::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_department")
                    .table(Employee::Table)
                    .col(Employee::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_role")
                    .table(Employee::Table)
                    .col(Employee::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employee::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Department::Table).to_owned())
            .await?;
        Ok(())
    }
}
