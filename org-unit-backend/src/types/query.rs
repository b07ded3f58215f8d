use serde::{Deserialize, Serialize};

/// ソートのクエリパラメータ（列名の検証は呼び出し側の許可リストで行う）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SortQuery {
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// ソート順序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
