// tests/common/test_data.rs

use org_unit_backend::api::dto::organization_unit_dto::{
    CreateOrganizationUnitDto, CreateRootOrganizationUnitDto,
};
use org_unit_backend::api::outcome::ResponseMode;
use org_unit_backend::domain::{organization_unit_model, user_model};
use org_unit_backend::repository::organization_unit_repository::{
    OrganizationUnitRepository, TreeStore,
};
use org_unit_backend::repository::user_repository::{CreateUser, UserRepository};
use org_unit_backend::service::access_control::Requester;
use org_unit_backend::OrganizationUnitService;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// テスト用ユーザーを作成（メールアドレスは一意）
pub async fn create_user(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> user_model::Model {
    UserRepository::create(
        db,
        CreateUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@example.com", first_name, Uuid::new_v4().simple()),
        },
    )
    .await
    .unwrap()
}

pub fn child_draft(name: &str, parent_id: Uuid, user_id: Uuid) -> CreateOrganizationUnitDto {
    CreateOrganizationUnitDto {
        name: name.to_string(),
        parent_id: Some(parent_id),
        user_id: Some(user_id),
    }
}

pub async fn create_root_unit(
    service: &OrganizationUnitService,
    owner: &user_model::Model,
    name: &str,
) -> organization_unit_model::Model {
    service
        .create_root(
            &Requester::admin(owner.id),
            CreateRootOrganizationUnitDto {
                name: name.to_string(),
                user_id: Some(owner.id),
            },
        )
        .await
        .unwrap()
}

pub async fn create_child_unit(
    service: &OrganizationUnitService,
    owner: &user_model::Model,
    parent: &organization_unit_model::Model,
    name: &str,
) -> organization_unit_model::Model {
    service
        .create(
            &Requester::admin(owner.id),
            child_draft(name, parent.id, owner.id),
            ResponseMode::Data,
        )
        .await
        .unwrap()
        .into_data()
        .unwrap()
}

/// DBから最新の状態を読み直す
pub async fn reload(db: &DatabaseConnection, id: Uuid) -> organization_unit_model::Model {
    OrganizationUnitRepository.find_or_fail(db, id).await.unwrap()
}
