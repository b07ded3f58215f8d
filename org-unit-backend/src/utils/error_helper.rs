// org-unit-backend/src/utils/error_helper.rs

//! エラーハンドリングの統一化ヘルパー
//!
//! サービス層で共通して使用するエラー処理パターンを提供します。

use crate::error::AppError;
use tracing::{error, warn};
use validator::ValidationErrors;

// =============================================================================
// バリデーションエラー処理の統一
// =============================================================================

/// validatorのValidationErrorsをAppErrorに変換する統一処理
///
/// メッセージは `"field: message"` 形式で集約され、フィールド順に並ぶ。
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let mut field_errors: Vec<_> = validation_errors.field_errors().into_iter().collect();
    field_errors.sort_by(|(a, _), (b, _)| a.cmp(b));

    let errors: Vec<String> = field_errors
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Invalid value".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();

    AppError::ValidationErrors(errors)
}

/// 単一フィールドのバリデーションエラーを生成
pub fn validation_error(field: &str, message: &str) -> AppError {
    AppError::ValidationErrors(vec![format!("{}: {}", field, message)])
}

// =============================================================================
// ログ付きエラー変換パターン
// =============================================================================

/// 永続化エラーをログ付きで生成（呼び出し元には汎用メッセージのみ返す）
pub fn persistence_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "Persistence operation failed"
    );
    AppError::Persistence(user_message.to_string())
}

/// 権限エラーをログ付きで生成
pub fn access_denied(context: &str, message: &str) -> AppError {
    warn!(
        context = %context,
        message = %message,
        "Access denied"
    );
    AppError::Forbidden(message.to_string())
}

/// リソース未検出エラーを生成
pub fn not_found(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} {} not found", resource, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Draft {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(required(message = "Parent unit is required"))]
        parent_id: Option<u32>,
    }

    #[test]
    fn test_convert_validation_errors_aggregates_fields() {
        let draft = Draft {
            name: String::new(),
            parent_id: None,
        };
        let errors = draft.validate().unwrap_err();

        match convert_validation_errors(errors, "test") {
            AppError::ValidationErrors(messages) => {
                assert_eq!(
                    messages,
                    vec![
                        "name: Name is required".to_string(),
                        "parent_id: Parent unit is required".to_string(),
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_persistence_error_hides_details() {
        let error = persistence_error("unique violation", "test", "Failed to save");
        assert!(matches!(error, AppError::Persistence(ref m) if m == "Failed to save"));
    }
}
