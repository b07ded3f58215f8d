// src/domain/user_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_unit_model::Entity")]
    OwnedOrganizationUnits,
    #[sea_orm(has_many = "super::organization_unit_user_model::Entity")]
    OrganizationUnitMemberships,
}

impl Related<super::organization_unit_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnedOrganizationUnits.def()
    }
}

impl Related<super::organization_unit_user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationUnitMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 一覧表示用の氏名
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = Model {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "Ada Lovelace");

        let user = Model {
            last_name: String::new(),
            ..user
        };
        assert_eq!(user.display_name(), "Ada");
    }
}
