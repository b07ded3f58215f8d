use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite は既存テーブルへの外部キー追加ができないため、テーブル定義内で宣言する
        manager
            .create_table(
                Table::create()
                    .table(OrganizationUnits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationUnits::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationUnits::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationUnits::UserId).uuid().not_null())
                    .col(ColumnDef::new(OrganizationUnits::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(OrganizationUnits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OrganizationUnits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_units_user_id")
                            .from(OrganizationUnits::Table, OrganizationUnits::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    // 子ユニットの付け替えはサービス層で行うので削除は拒否する
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_units_parent_id")
                            .from(OrganizationUnits::Table, OrganizationUnits::ParentId)
                            .to(OrganizationUnits::Table, OrganizationUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_units_parent_id")
                    .table(OrganizationUnits::Table)
                    .col(OrganizationUnits::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_units_user_id")
                    .table(OrganizationUnits::Table)
                    .col(OrganizationUnits::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_units_name")
                    .table(OrganizationUnits::Table)
                    .col(OrganizationUnits::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationUnits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganizationUnits {
    Table,
    Id,
    Name,
    UserId,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
