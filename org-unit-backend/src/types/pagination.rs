use serde::{Deserialize, Deserializer, Serialize};

/// デフォルトページサイズ
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// 最大ページサイズ
pub const MAX_PAGE_SIZE: u32 = 100;
/// 最大ページ番号（オフセット計算が溢れない範囲）
pub const MAX_PAGE: u32 = 1_000_000;

/// 文字列または数値からu32をデシリアライズ
fn deserialize_u32_from_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u32),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse::<u32>().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// ページネーションのクエリパラメータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationQuery {
    #[serde(
        default = "PaginationQuery::first_page",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub page: u32,
    #[serde(
        default = "PaginationQuery::default_size",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub per_page: u32,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: Self::first_page(),
            per_page: Self::default_size(),
        }
    }
}

impl PaginationQuery {
    fn first_page() -> u32 {
        1
    }

    fn default_size() -> u32 {
        DEFAULT_PAGE_SIZE
    }

    /// 範囲に丸めた `(page, per_page)`。page は 1 始まり
    pub fn get_pagination(&self) -> (u64, u64) {
        let page = self.page.clamp(1, MAX_PAGE);
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE);
        (u64::from(page), u64::from(per_page))
    }

    /// 0 始まりのページ番号（paginator の `fetch_page` 用）
    pub fn page_index(&self) -> u64 {
        self.get_pagination().0.saturating_sub(1)
    }
}

/// ページネーション情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(per_page.max(1));

        Self {
            page,
            per_page,
            total_pages,
            total_count,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// ページネーション付きレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total_count: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(page, per_page, total_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamped() {
        let query = PaginationQuery {
            page: 0,
            per_page: 1_000,
        };
        assert_eq!(query.get_pagination(), (1, u64::from(MAX_PAGE_SIZE)));
        assert_eq!(query.page_index(), 0);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let query: PaginationQuery = serde_json::from_str(r#"{"page": "4294967295"}"#).unwrap();
        assert_eq!(
            query.get_pagination(),
            (u64::from(MAX_PAGE), u64::from(DEFAULT_PAGE_SIZE))
        );
        assert_eq!(query.page_index(), u64::from(MAX_PAGE) - 1);

        let query: PaginationQuery = serde_json::from_str(r#"{"page": 2147483648}"#).unwrap();
        assert_eq!(query.get_pagination().0, u64::from(MAX_PAGE));
    }

    #[test]
    fn test_pagination_from_string_values() {
        let query: PaginationQuery =
            serde_json::from_str(r#"{"page": "3", "per_page": "15"}"#).unwrap();
        assert_eq!(query.get_pagination(), (3, 15));

        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.get_pagination(), (1, u64::from(DEFAULT_PAGE_SIZE)));
    }

    #[test]
    fn test_pagination_meta() {
        let pagination = PaginationMeta::new(2, 10, 25);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(pagination.has_prev);

        let empty = PaginationMeta::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
