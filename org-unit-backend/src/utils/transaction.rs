// org-unit-backend/src/utils/transaction.rs

//! トランザクション管理の統一化
//!
//! 変更系の操作（エンティティ書き込み・親子リンク・親のtouch）を
//! 単一トランザクションで確定またはロールバックする。

use crate::error::AppError;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 開始時刻付きのトランザクション
pub struct UnitOfWork {
    txn: DatabaseTransaction,
    started_at: Instant,
}

impl UnitOfWork {
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, AppError> {
        debug!("Starting database transaction");

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin transaction");
            AppError::InternalServerError("Failed to begin transaction".to_string())
        })?;

        Ok(Self {
            txn,
            started_at: Instant::now(),
        })
    }

    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// 操作結果に応じてコミットまたはロールバックする
    pub async fn finish<R>(self, result: Result<R, AppError>) -> Result<R, AppError> {
        match result {
            Ok(value) => {
                debug!("Transaction operation successful, committing");
                self.txn.commit().await.map_err(|e| {
                    error!(error = %e, "Failed to commit transaction");
                    AppError::Persistence("Failed to commit transaction".to_string())
                })?;

                info!(
                    duration_ms = self.started_at.elapsed().as_millis(),
                    "Transaction completed successfully"
                );

                Ok(value)
            }
            Err(app_error) => {
                warn!(error = %app_error, "Transaction operation failed, rolling back");

                if let Err(rollback_error) = self.txn.rollback().await {
                    error!(
                        original_error = %app_error,
                        rollback_error = %rollback_error,
                        "Failed to rollback transaction"
                    );
                    return Err(AppError::InternalServerError(
                        "Transaction failed and rollback also failed".to_string(),
                    ));
                }

                warn!(
                    duration_ms = self.started_at.elapsed().as_millis(),
                    "Transaction rolled back"
                );

                Err(app_error)
            }
        }
    }
}
