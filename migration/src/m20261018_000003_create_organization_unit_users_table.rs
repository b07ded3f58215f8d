use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationUnitUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationUnitUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationUnitUsers::OrganizationUnitId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationUnitUsers::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationUnitUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_unit_users_organization_unit_id")
                            .from(
                                OrganizationUnitUsers::Table,
                                OrganizationUnitUsers::OrganizationUnitId,
                            )
                            .to(OrganizationUnits::Table, OrganizationUnits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_unit_users_user_id")
                            .from(OrganizationUnitUsers::Table, OrganizationUnitUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_unit_users_unit_user")
                    .table(OrganizationUnitUsers::Table)
                    .col(OrganizationUnitUsers::OrganizationUnitId)
                    .col(OrganizationUnitUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_unit_users_user_id")
                    .table(OrganizationUnitUsers::Table)
                    .col(OrganizationUnitUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationUnitUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganizationUnitUsers {
    Table,
    Id,
    OrganizationUnitId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganizationUnits {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
