// org-unit-backend/src/api/dto/organization_unit_dto.rs

use crate::domain::organization_unit_model;
use crate::types::{PaginationQuery, SortOrder, SortQuery};
use crate::utils::validation::validate_not_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

/// 組織ユニット作成リクエスト（親ユニットの指定は必須）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationUnitDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(required(message = "Parent unit is required"))]
    pub parent_id: Option<Uuid>,

    #[validate(required(message = "Owning user is required"))]
    pub user_id: Option<Uuid>,
}

/// ルートユニット作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRootOrganizationUnitDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(required(message = "Owning user is required"))]
    pub user_id: Option<Uuid>,
}

/// 組織ユニット更新リクエスト
///
/// `parent_id` が現在の親と異なる場合はユニットを移動する。`None` は親を変更しない。
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizationUnitDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    pub parent_id: Option<Uuid>,

    pub user_id: Option<Uuid>,
}

/// 一覧取得クエリ
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrganizationUnitListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(flatten)]
    pub sort: SortQuery,
    /// 名前の部分一致
    pub search: Option<String>,
    pub parent_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// ソート可能な列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationUnitSortField {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl OrganizationUnitListQuery {
    /// 許可されていない列はデフォルト（名前の昇順）に倒す
    pub fn sort_field(&self) -> (OrganizationUnitSortField, SortOrder) {
        match self.sort.sort_by.as_deref() {
            Some("name") => (OrganizationUnitSortField::Name, self.sort.sort_order),
            Some("created_at") => (OrganizationUnitSortField::CreatedAt, self.sort.sort_order),
            Some("updated_at") => (OrganizationUnitSortField::UpdatedAt, self.sort.sort_order),
            _ => (OrganizationUnitSortField::Name, SortOrder::Asc),
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

// --- Response DTOs ---

/// 行ごとに評価された操作可否
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedActions {
    pub show: bool,
    pub update: bool,
    pub delete: bool,
}

/// 一覧の1行（親の名前・所有者名・メンバー数付き）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationUnitRow {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub parent_name: Option<String>,
    pub user_id: Uuid,
    pub owner_name: Option<String>,
    pub user_count: u64,
    pub actions: AllowedActions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationUnitRow {
    pub fn from_model(
        unit: organization_unit_model::Model,
        parent_name: Option<String>,
        owner_name: Option<String>,
        user_count: u64,
        actions: AllowedActions,
    ) -> Self {
        Self {
            id: unit.id,
            name: unit.name,
            parent_id: unit.parent_id,
            parent_name,
            user_id: unit.user_id,
            owner_name,
            user_count,
            actions,
            created_at: unit.created_at,
            updated_at: unit.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_validation() {
        let valid = CreateOrganizationUnitDto {
            name: "Engineering".to_string(),
            parent_id: Some(Uuid::new_v4()),
            user_id: Some(Uuid::new_v4()),
        };
        assert!(valid.validate().is_ok());

        let missing_fields = CreateOrganizationUnitDto {
            name: String::new(),
            parent_id: None,
            user_id: None,
        };
        let errors = missing_fields.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("parent_id"));
        assert!(fields.contains_key("user_id"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let blank = CreateRootOrganizationUnitDto {
            name: "   ".to_string(),
            user_id: Some(Uuid::new_v4()),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_update_dto_allows_partial_changes() {
        let rename_only = UpdateOrganizationUnitDto {
            name: Some("Platform".to_string()),
            ..Default::default()
        };
        assert!(rename_only.validate().is_ok());

        let too_long = UpdateOrganizationUnitDto {
            name: Some("x".repeat(256)),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_sort_field_falls_back_to_name() {
        let mut query = OrganizationUnitListQuery::default();
        assert_eq!(
            query.sort_field(),
            (OrganizationUnitSortField::Name, SortOrder::Asc)
        );

        query.sort = SortQuery {
            sort_by: Some("updated_at".to_string()),
            sort_order: SortOrder::Desc,
        };
        assert_eq!(
            query.sort_field(),
            (OrganizationUnitSortField::UpdatedAt, SortOrder::Desc)
        );

        query.sort.sort_by = Some("password".to_string());
        assert_eq!(
            query.sort_field(),
            (OrganizationUnitSortField::Name, SortOrder::Asc)
        );
    }

    #[test]
    fn test_search_term_ignores_whitespace() {
        let query = OrganizationUnitListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);

        let query = OrganizationUnitListQuery {
            search: Some(" eng ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some("eng"));
    }
}
