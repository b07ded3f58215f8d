// org-unit-backend/src/repository/user_repository.rs

use crate::domain::user_model::{self, Entity as User};
use crate::types::truncated_now;
use sea_orm::DbErr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// ユーザー作成用の入力
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C>(conn: &C, id: Uuid) -> Result<Option<user_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        User::find_by_id(id).one(conn).await
    }

    pub async fn find_by_ids<C>(conn: &C, ids: &[Uuid]) -> Result<Vec<user_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        User::find()
            .filter(user_model::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await
    }

    pub async fn exists<C>(conn: &C, id: Uuid) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Self::find_by_id(conn, id).await?.is_some())
    }

    pub async fn create<C>(conn: &C, input: CreateUser) -> Result<user_model::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = truncated_now();
        let user = user_model::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email.to_lowercase()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user.insert(conn).await
    }
}
