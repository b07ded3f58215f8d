// src/db.rs
use crate::config::Config;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_db_pool(config: &Config) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    // 接続オプションを設定
    opt.max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // スキーマ指定は PostgreSQL のみ
    if let Some(schema) = &config.db_schema {
        if !config.is_sqlite() {
            opt.set_schema_search_path(schema.clone());
        }
    }

    tracing::info!(
        max_connections = config.db_max_connections,
        schema = ?config.db_schema,
        "Connecting to database"
    );

    Database::connect(opt).await
}
