// src/main.rs
use migration::{Migrator, MigratorTrait};
use org_unit_backend::config::Config;
use org_unit_backend::db::create_db_pool;
use org_unit_backend::logging::init_tracing;
use org_unit_backend::repository::organization_unit_repository::{
    OrganizationUnitRepository, TreeStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    init_tracing();

    tracing::info!("Starting organization unit backend...");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    tracing::info!(schema = ?app_config.db_schema, "Configuration loaded");

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    // マイグレーションを適用
    Migrator::up(&db_pool, None).await?;
    tracing::info!("Migrations applied.");

    // 現在の組織ツリーを出力（深さ優先）
    let store = OrganizationUnitRepository;
    let mut stack: Vec<_> = store
        .roots(&db_pool)
        .await?
        .into_iter()
        .rev()
        .map(|unit| (unit, 0usize))
        .collect();
    let mut total = 0usize;

    while let Some((unit, depth)) = stack.pop() {
        total += 1;
        tracing::info!(
            unit_id = %unit.id,
            depth,
            "{}{}",
            "  ".repeat(depth),
            unit.name
        );

        let children = store.children(&db_pool, unit.id).await?;
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }

    tracing::info!(total_units = total, "Organization tree loaded.");

    Ok(())
}
