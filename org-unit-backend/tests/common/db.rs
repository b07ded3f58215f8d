//! インメモリSQLiteによるテスト用データベース

use migration::{Migrator, MigratorTrait};
use org_unit_backend::OrganizationUnitService;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    pub async fn new() -> Self {
        super::init_test_env();

        // インメモリDBは接続ごとに独立するため、接続は1本に固定する
        let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false); // テスト時のログ出力を減らす

        let connection = Database::connect(opt).await.unwrap();

        Migrator::up(&connection, None).await.unwrap();

        Self { connection }
    }

    pub fn service(&self) -> OrganizationUnitService {
        OrganizationUnitService::new(self.connection.clone())
    }
}
