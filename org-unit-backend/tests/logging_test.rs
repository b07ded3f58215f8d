use org_unit_backend::log_with_context;

#[tokio::test]
async fn test_structured_logging_macro() {
    // 構造化ログマクロの基本的な動作をテスト

    // コンテキストなしのログ
    log_with_context!(tracing::Level::INFO, "Test message without context");

    // コンテキスト付きのログ
    let unit_id = uuid::Uuid::new_v4();
    let parent_id = uuid::Uuid::new_v4();

    log_with_context!(
        tracing::Level::INFO,
        "Test message with context",
        "unit_id" => unit_id,
        "parent_id" => Some(parent_id),
        "operation" => "test"
    );

    // エラーレベルのログ
    log_with_context!(
        tracing::Level::ERROR,
        "Error occurred during test",
        "error" => "Test error",
        "unit_id" => unit_id
    );

    // 警告レベルのログ
    log_with_context!(
        tracing::Level::WARN,
        "Warning during test",
        "warning_type" => "test_warning"
    );

    // デバッグレベルのログ
    log_with_context!(
        tracing::Level::DEBUG,
        "Debug information",
        "debug_data" => "test_data"
    );

    // TRACEは出力対象外
    log_with_context!(tracing::Level::TRACE, "Ignored trace message");
}

#[test]
fn test_init_tracing_is_idempotent() {
    // 二重初期化してもパニックしない
    org_unit_backend::logging::init_tracing();
    org_unit_backend::logging::init_tracing();
}
