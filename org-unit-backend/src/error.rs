// src/error.rs

use sea_orm::DbErr;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// データ応答モードで使う HTTP 相当のステータスコード
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) => 404,
            AppError::DbErr(_) => 500,
            AppError::NotFound(_) => 404,
            AppError::ValidationErrors(_) => 422,
            AppError::BadRequest(_) => 400,
            AppError::Forbidden(_) => 403,
            AppError::Persistence(_) => 500,
            AppError::InternalServerError(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DbErr(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationErrors(_) => "validation_errors",
            AppError::BadRequest(_) => "bad_request",
            AppError::Forbidden(_) => "access_denied",
            AppError::Persistence(_) => "persistence_error",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }

    /// 呼び出し元へ返すステータスペイロードを組み立てる
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::DbErr(db_err) => {
                tracing::error!(error = ?db_err, "Database error"); // サーバーログには詳細を出す
                let message = match db_err {
                    DbErr::RecordNotFound(_) => "The requested resource was not found",
                    _ => "A database error occurred",
                };
                ErrorResponse::new(message, self.error_type())
            }
            AppError::NotFound(message)
            | AppError::BadRequest(message)
            | AppError::Forbidden(message) => ErrorResponse::new(message, self.error_type()),
            AppError::ValidationErrors(errors) => {
                let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
                for error in errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_default()
                            .push(message.to_string());
                    }
                }
                ErrorResponse {
                    validation_errors: Some(field_errors),
                    ..ErrorResponse::new("Validation failed", self.error_type())
                }
            }
            // 永続化・内部エラーは汎用メッセージのみ返す
            AppError::Persistence(message) => {
                tracing::error!(message = %message, "Persistence error");
                ErrorResponse::new(message, self.error_type())
            }
            AppError::InternalServerError(message) => {
                tracing::error!(message = %message, "Internal server error");
                ErrorResponse::new("An internal server error occurred", self.error_type())
            }
        }
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    pub error_type: String,
}

impl ErrorResponse {
    fn new(message: &str, error_type: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
            message: message.to_string(),
            validation_errors: None,
            error_type: error_type.to_string(),
        }
    }
}
