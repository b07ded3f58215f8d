// org-unit-backend/src/repository/organization_unit_repository.rs

use crate::api::dto::organization_unit_dto::{OrganizationUnitListQuery, OrganizationUnitSortField};
use crate::domain::organization_unit_model::{self, Entity as OrganizationUnit};
use crate::domain::organization_unit_user_model::{self, Entity as OrganizationUnitUser};
use crate::error::{AppError, AppResult};
use crate::types::{advance_past, truncated_now, SortOrder};
use crate::utils::error_helper::not_found;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

/// 祖先をたどる際の上限（破損データでの無限ループ防止）
pub const MAX_ANCESTOR_DEPTH: usize = 256;

/// 組織ユニットの木構造を永続化するストア
///
/// すべての操作は接続を引数に取るため、トランザクション内でも実行できる。
#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn find<C>(&self, conn: &C, id: Uuid) -> AppResult<Option<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    async fn find_or_fail<C>(&self, conn: &C, id: Uuid) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        self.find(conn, id)
            .await?
            .ok_or_else(|| not_found("Organization unit", id))
    }

    async fn find_many<C>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    async fn create<C>(
        &self,
        conn: &C,
        unit: organization_unit_model::ActiveModel,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait;

    async fn update<C>(
        &self,
        conn: &C,
        unit: organization_unit_model::ActiveModel,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait;

    /// 削除した行数を返す
    async fn delete<C>(&self, conn: &C, id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait;

    /// `child` の親参照を `parent` に付け替える（親の子集合は親参照から導出される）
    async fn attach_child<C>(
        &self,
        conn: &C,
        parent: &organization_unit_model::Model,
        child: organization_unit_model::Model,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait;

    /// 親参照を外してルートにする
    async fn detach<C>(
        &self,
        conn: &C,
        child: organization_unit_model::Model,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait;

    /// 他の項目を変えずに `updated_at` を厳密に進める
    async fn touch<C>(&self, conn: &C, id: Uuid) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait;

    async fn children<C>(
        &self,
        conn: &C,
        parent_id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    async fn roots<C>(&self, conn: &C) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    /// 親から順にルートまでの祖先（自身は含まない）
    async fn ancestors<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    /// 自身からルートまでの系列を排他ロック付きで読む（PostgreSQL では `FOR UPDATE`）
    ///
    /// 移動の循環チェックに使う。並行する移動は系列の行ロックで直列化される。
    async fn lineage_for_update<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait;

    /// 検索・ソート・ページネーション付きの一覧と総件数
    async fn search<C>(
        &self,
        conn: &C,
        query: &OrganizationUnitListQuery,
    ) -> AppResult<(Vec<organization_unit_model::Model>, u64)>
    where
        C: ConnectionTrait;

    async fn member_counts<C>(&self, conn: &C, unit_ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>>
    where
        C: ConnectionTrait;

    /// 既に所属している場合は既存の行を返す
    async fn add_member<C>(
        &self,
        conn: &C,
        unit_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<organization_unit_user_model::Model>
    where
        C: ConnectionTrait;

    async fn remove_member<C>(&self, conn: &C, unit_id: Uuid, user_id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait;

    async fn remove_all_members<C>(&self, conn: &C, unit_id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait;
}

/// SeaORM による [`TreeStore`] 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationUnitRepository;

impl OrganizationUnitRepository {
    /// `id` から親参照をたどり `[自身, 親, ..., ルート]` を返す
    async fn walk_lineage<C>(
        conn: &C,
        id: Uuid,
        lock: bool,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        let mut lineage: Vec<organization_unit_model::Model> = Vec::new();
        let mut next_id = Some(id);

        while let Some(current_id) = next_id {
            if lineage.len() > MAX_ANCESTOR_DEPTH || lineage.iter().any(|u| u.id == current_id) {
                return Err(AppError::InternalServerError(format!(
                    "Organization unit hierarchy above {} is corrupted",
                    id
                )));
            }

            let mut select = OrganizationUnit::find_by_id(current_id);
            if lock {
                // SQLite ではロック句は出力されない
                select = select.lock_exclusive();
            }

            let unit = match select.one(conn).await? {
                Some(unit) => unit,
                None if lineage.is_empty() => return Err(not_found("Organization unit", id)),
                None => break,
            };
            next_id = unit.parent_id;
            lineage.push(unit);
        }

        Ok(lineage)
    }

    /// ソート適用ヘルパー
    fn apply_sorting(
        query: Select<OrganizationUnit>,
        list_query: &OrganizationUnitListQuery,
    ) -> Select<OrganizationUnit> {
        let (field, sort_order) = list_query.sort_field();
        let column = match field {
            OrganizationUnitSortField::Name => organization_unit_model::Column::Name,
            OrganizationUnitSortField::CreatedAt => organization_unit_model::Column::CreatedAt,
            OrganizationUnitSortField::UpdatedAt => organization_unit_model::Column::UpdatedAt,
        };
        let order = match sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        // 同値の行でもページ間で順序が揺れないようにIDで安定化
        query
            .order_by(column, order)
            .order_by(organization_unit_model::Column::Id, Order::Asc)
    }
}

#[async_trait]
impl TreeStore for OrganizationUnitRepository {
    async fn find<C>(&self, conn: &C, id: Uuid) -> AppResult<Option<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnit::find_by_id(id).one(conn).await?;
        Ok(result)
    }

    async fn find_many<C>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = OrganizationUnit::find()
            .filter(organization_unit_model::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(result)
    }

    async fn create<C>(
        &self,
        conn: &C,
        unit: organization_unit_model::ActiveModel,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        let result = unit.insert(conn).await?;
        Ok(result)
    }

    async fn update<C>(
        &self,
        conn: &C,
        unit: organization_unit_model::ActiveModel,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        let result = unit.update(conn).await?;
        Ok(result)
    }

    async fn delete<C>(&self, conn: &C, id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnit::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }

    async fn attach_child<C>(
        &self,
        conn: &C,
        parent: &organization_unit_model::Model,
        child: organization_unit_model::Model,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        if parent.id == child.id {
            return Err(AppError::ValidationErrors(vec![
                "parent_id: An organization unit cannot be its own parent".to_string(),
            ]));
        }

        let updated_at = advance_past(child.updated_at);
        let mut active_model: organization_unit_model::ActiveModel = child.into();
        active_model.parent_id = Set(Some(parent.id));
        active_model.updated_at = Set(updated_at);

        let result = active_model.update(conn).await?;
        Ok(result)
    }

    async fn detach<C>(
        &self,
        conn: &C,
        child: organization_unit_model::Model,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        let updated_at = advance_past(child.updated_at);
        let mut active_model: organization_unit_model::ActiveModel = child.into();
        active_model.parent_id = Set(None);
        active_model.updated_at = Set(updated_at);

        let result = active_model.update(conn).await?;
        Ok(result)
    }

    async fn touch<C>(&self, conn: &C, id: Uuid) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        let unit = self.find_or_fail(conn, id).await?;
        let updated_at = advance_past(unit.updated_at);

        let mut active_model: organization_unit_model::ActiveModel = unit.into();
        active_model.updated_at = Set(updated_at);

        let result = active_model.update(conn).await?;
        Ok(result)
    }

    async fn children<C>(
        &self,
        conn: &C,
        parent_id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnit::find()
            .filter(organization_unit_model::Column::ParentId.eq(parent_id))
            .order_by_asc(organization_unit_model::Column::Name)
            .order_by_asc(organization_unit_model::Column::Id)
            .all(conn)
            .await?;
        Ok(result)
    }

    async fn roots<C>(&self, conn: &C) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnit::find()
            .filter(organization_unit_model::Column::ParentId.is_null())
            .order_by_asc(organization_unit_model::Column::Name)
            .order_by_asc(organization_unit_model::Column::Id)
            .all(conn)
            .await?;
        Ok(result)
    }

    async fn ancestors<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        let mut lineage = Self::walk_lineage(conn, id, false).await?;
        lineage.remove(0);
        Ok(lineage)
    }

    async fn lineage_for_update<C>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Vec<organization_unit_model::Model>>
    where
        C: ConnectionTrait,
    {
        Self::walk_lineage(conn, id, true).await
    }

    async fn search<C>(
        &self,
        conn: &C,
        query: &OrganizationUnitListQuery,
    ) -> AppResult<(Vec<organization_unit_model::Model>, u64)>
    where
        C: ConnectionTrait,
    {
        let mut condition = Condition::all();

        // 検索条件の適用
        if let Some(search_term) = query.search_term() {
            condition = condition.add(organization_unit_model::Column::Name.contains(search_term));
        }
        if let Some(parent_id) = query.parent_id {
            condition = condition.add(organization_unit_model::Column::ParentId.eq(parent_id));
        }
        if let Some(user_id) = query.user_id {
            condition = condition.add(organization_unit_model::Column::UserId.eq(user_id));
        }

        let db_query = Self::apply_sorting(OrganizationUnit::find().filter(condition), query);

        // ページネーション
        let (_, per_page) = query.pagination.get_pagination();
        let paginator = db_query.paginate(conn, per_page);
        let total_count = paginator.num_items().await?;
        let units = paginator
            .fetch_page(query.pagination.page_index())
            .await?;

        Ok((units, total_count))
    }

    async fn member_counts<C>(&self, conn: &C, unit_ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>>
    where
        C: ConnectionTrait,
    {
        let mut counts: HashMap<Uuid, u64> = unit_ids.iter().map(|id| (*id, 0)).collect();
        if unit_ids.is_empty() {
            return Ok(counts);
        }

        let memberships = OrganizationUnitUser::find()
            .filter(
                organization_unit_user_model::Column::OrganizationUnitId
                    .is_in(unit_ids.iter().copied()),
            )
            .all(conn)
            .await?;

        for membership in memberships {
            *counts.entry(membership.organization_unit_id).or_insert(0) += 1;
        }

        Ok(counts)
    }

    async fn add_member<C>(
        &self,
        conn: &C,
        unit_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<organization_unit_user_model::Model>
    where
        C: ConnectionTrait,
    {
        let existing = OrganizationUnitUser::find()
            .filter(organization_unit_user_model::Column::OrganizationUnitId.eq(unit_id))
            .filter(organization_unit_user_model::Column::UserId.eq(user_id))
            .one(conn)
            .await?;
        if let Some(membership) = existing {
            return Ok(membership);
        }

        let membership = organization_unit_user_model::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_unit_id: Set(unit_id),
            user_id: Set(user_id),
            created_at: Set(truncated_now()),
        };
        let result = membership.insert(conn).await?;
        Ok(result)
    }

    async fn remove_member<C>(&self, conn: &C, unit_id: Uuid, user_id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnitUser::delete_many()
            .filter(organization_unit_user_model::Column::OrganizationUnitId.eq(unit_id))
            .filter(organization_unit_user_model::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn remove_all_members<C>(&self, conn: &C, unit_id: Uuid) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = OrganizationUnitUser::delete_many()
            .filter(organization_unit_user_model::Column::OrganizationUnitId.eq(unit_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
