// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// ユーザーテーブル（組織ユニットの所有者・メンバー）
mod m20261018_000001_create_users_table;

// 組織ユニット階層
mod m20261018_000002_create_organization_units_table;
mod m20261018_000003_create_organization_unit_users_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 依存関係のないテーブル
            Box::new(m20261018_000001_create_users_table::Migration),
            // 2. usersテーブルに依存する自己参照テーブル
            Box::new(m20261018_000002_create_organization_units_table::Migration),
            // 3. 多対多の所属テーブル
            Box::new(m20261018_000003_create_organization_unit_users_table::Migration),
        ]
    }
}
