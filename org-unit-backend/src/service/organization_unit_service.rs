// org-unit-backend/src/service/organization_unit_service.rs

use crate::api::dto::organization_unit_dto::{
    AllowedActions, CreateOrganizationUnitDto, CreateRootOrganizationUnitDto,
    OrganizationUnitListQuery, OrganizationUnitRow, UpdateOrganizationUnitDto,
};
use crate::api::outcome::{
    Outcome, ResponseMode, Route, View, CREATED_MESSAGE, DELETED_MESSAGE, UPDATED_MESSAGE,
};
use crate::domain::{organization_unit_model, organization_unit_user_model};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::organization_unit_repository::{OrganizationUnitRepository, TreeStore};
use crate::repository::user_repository::UserRepository;
use crate::service::access_control::{AccessControl, Operation, Requester, RoleBasedAccessControl};
use crate::types::{advance_past, truncated_now, PaginatedResponse, StatusResponse};
use crate::utils::error_helper::{
    access_denied, convert_validation_errors, not_found, persistence_error, validation_error,
};
use crate::utils::transaction::UnitOfWork;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

const OWNER_MISSING: &str = "Owning user does not exist";

/// 組織ユニットのCRUDと木構造の維持
///
/// 権限判定は [`AccessControl`]、永続化と親子リンクは [`TreeStore`] に委譲する。
/// 変更系の操作はすべて1つのトランザクション内で行われる。
pub struct OrganizationUnitService<S = OrganizationUnitRepository, A = RoleBasedAccessControl> {
    db: DatabaseConnection,
    store: S,
    access: A,
}

impl OrganizationUnitService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_collaborators(db, OrganizationUnitRepository, RoleBasedAccessControl)
    }
}

impl<S, A> OrganizationUnitService<S, A>
where
    S: TreeStore,
    A: AccessControl<organization_unit_model::Model>,
{
    pub fn with_collaborators(db: DatabaseConnection, store: S, access: A) -> Self {
        Self { db, store, access }
    }

    // --- 一覧 ---

    /// ページ単位の一覧（親の名前・所有者名・メンバー数・行ごとの操作可否付き）
    pub async fn list(
        &self,
        requester: &Requester,
        query: &OrganizationUnitListQuery,
        mode: ResponseMode,
    ) -> AppResult<Outcome<PaginatedResponse<OrganizationUnitRow>>> {
        if !self.access.can_list(requester) {
            return Err(access_denied(
                "organization_unit_service::list",
                "You are not allowed to list organization units",
            ));
        }

        if !mode.is_data() {
            return Ok(Outcome::Render(View::Index));
        }

        let (units, total_count) = self.store.search(&self.db, query).await?;

        let parent_ids: Vec<Uuid> = units.iter().filter_map(|unit| unit.parent_id).collect();
        let parent_names: HashMap<Uuid, String> = self
            .store
            .find_many(&self.db, &parent_ids)
            .await?
            .into_iter()
            .map(|parent| (parent.id, parent.name))
            .collect();

        let owner_ids: Vec<Uuid> = units.iter().map(|unit| unit.user_id).collect();
        let owner_names: HashMap<Uuid, String> = UserRepository::find_by_ids(&self.db, &owner_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user.display_name()))
            .collect();

        let unit_ids: Vec<Uuid> = units.iter().map(|unit| unit.id).collect();
        let member_counts = self.store.member_counts(&self.db, &unit_ids).await?;

        let rows: Vec<OrganizationUnitRow> = units
            .into_iter()
            .map(|unit| {
                let actions = AllowedActions {
                    show: self.access.can_show(requester, &unit),
                    update: self.access.can_update(requester, &unit),
                    delete: self.access.can_delete(requester, &unit),
                };
                let parent_name = unit
                    .parent_id
                    .and_then(|parent_id| parent_names.get(&parent_id).cloned());
                let owner_name = owner_names.get(&unit.user_id).cloned();
                let user_count = member_counts.get(&unit.id).copied().unwrap_or(0);

                OrganizationUnitRow::from_model(unit, parent_name, owner_name, user_count, actions)
            })
            .collect();

        let (page, per_page) = query.pagination.get_pagination();

        log_with_context!(
            tracing::Level::DEBUG,
            "Organization units listed",
            "requester_id" => requester.user_id,
            "page" => page,
            "total_count" => total_count
        );

        Ok(Outcome::Data(PaginatedResponse::new(
            rows,
            page,
            per_page,
            total_count,
        )))
    }

    // --- 作成 ---

    /// 作成フォームの表示（描画専用）
    pub async fn create_form(&self, requester: &Requester, mode: ResponseMode) -> AppResult<View> {
        if mode.is_data() {
            return Err(AppError::BadRequest(
                "The create form is only available in render mode".to_string(),
            ));
        }

        if !self.access.can_create(requester) {
            return Err(access_denied(
                "organization_unit_service::create_form",
                "You are not allowed to create organization units",
            ));
        }

        Ok(View::CreateForm)
    }

    /// 既存ユニットの子としてユニットを作成し、親の `updated_at` を進める
    pub async fn create(
        &self,
        requester: &Requester,
        draft: CreateOrganizationUnitDto,
        mode: ResponseMode,
    ) -> AppResult<Outcome<organization_unit_model::Model>> {
        const CONTEXT: &str = "organization_unit_service::create";

        log_with_context!(
            tracing::Level::DEBUG,
            "Creating organization unit",
            "requester_id" => requester.user_id,
            "parent_id" => draft.parent_id
        );

        if !self.access.can_create(requester) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to create organization units",
            ));
        }

        draft
            .validate()
            .map_err(|e| convert_validation_errors(e, CONTEXT))?;
        let (Some(parent_id), Some(user_id)) = (draft.parent_id, draft.user_id) else {
            return Err(validation_error("parent_id", "Parent unit is required"));
        };

        let uow = UnitOfWork::begin(&self.db).await?;
        let result = self
            .create_child_in(uow.txn(), draft.name.trim(), parent_id, user_id)
            .await;
        let unit = uow.finish(result).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Organization unit created",
            "unit_id" => unit.id,
            "parent_id" => unit.parent_id,
            "requester_id" => requester.user_id
        );

        Ok(Outcome::select(mode, unit, |_| {
            View::redirect(Route::Index, CREATED_MESSAGE)
        }))
    }

    async fn create_child_in<C>(
        &self,
        conn: &C,
        name: &str,
        parent_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        const CONTEXT: &str = "organization_unit_service::create";

        Self::ensure_user_exists(conn, user_id, OWNER_MISSING).await?;
        let parent = self.store.find_or_fail(conn, parent_id).await?;

        let unit = self
            .store
            .create(conn, Self::new_active_model(name, user_id))
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to create organization unit"))?;

        let unit = self
            .store
            .attach_child(conn, &parent, unit)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to link organization unit"))?;

        self.store
            .touch(conn, parent.id)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to update parent unit"))?;

        Ok(unit)
    }

    /// 親を持たないルートユニットを作成する
    pub async fn create_root(
        &self,
        requester: &Requester,
        draft: CreateRootOrganizationUnitDto,
    ) -> AppResult<organization_unit_model::Model> {
        const CONTEXT: &str = "organization_unit_service::create_root";

        if !self.access.can_create(requester) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to create organization units",
            ));
        }

        draft
            .validate()
            .map_err(|e| convert_validation_errors(e, CONTEXT))?;
        let Some(user_id) = draft.user_id else {
            return Err(validation_error("user_id", "Owning user is required"));
        };

        let uow = UnitOfWork::begin(&self.db).await?;
        let result = async {
            Self::ensure_user_exists(uow.txn(), user_id, OWNER_MISSING).await?;
            self.store
                .create(uow.txn(), Self::new_active_model(draft.name.trim(), user_id))
                .await
                .map_err(|e| persistence_error(e, CONTEXT, "Failed to create organization unit"))
        }
        .await;
        let unit = uow.finish(result).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Root organization unit created",
            "unit_id" => unit.id,
            "requester_id" => requester.user_id
        );

        Ok(unit)
    }

    // --- 参照 ---

    pub async fn show(
        &self,
        requester: &Requester,
        id: Uuid,
        mode: ResponseMode,
    ) -> AppResult<Outcome<organization_unit_model::Model>> {
        let unit = self.store.find_or_fail(&self.db, id).await?;

        if !self.access.can_show(requester, &unit) {
            return Err(access_denied(
                "organization_unit_service::show",
                "You are not allowed to view this organization unit",
            ));
        }

        Ok(Outcome::select(mode, unit, |unit| View::Show { unit }))
    }

    /// 編集フォームの表示
    ///
    /// 描画専用の操作のため、データモードでは `BadRequest` になる。
    /// 対象が存在しない場合は `View::Edit { unit: None }` を返す。
    pub async fn edit(
        &self,
        requester: &Requester,
        id: Uuid,
        mode: ResponseMode,
    ) -> AppResult<View> {
        let unit = self.store.find(&self.db, id).await?;

        if mode.is_data() {
            return Err(AppError::BadRequest(
                "The edit form is only available in render mode".to_string(),
            ));
        }

        if !self
            .access
            .can(requester, Operation::Update, unit.as_ref())
        {
            return Err(access_denied(
                "organization_unit_service::edit",
                "You are not allowed to update this organization unit",
            ));
        }

        Ok(View::Edit { unit })
    }

    // --- 更新 ---

    /// 属性を更新し、親が変わった場合はユニットを移動して新しい親の `updated_at` を進める
    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        draft: UpdateOrganizationUnitDto,
        mode: ResponseMode,
    ) -> AppResult<Outcome<organization_unit_model::Model>> {
        const CONTEXT: &str = "organization_unit_service::update";

        log_with_context!(
            tracing::Level::DEBUG,
            "Updating organization unit",
            "unit_id" => id,
            "requester_id" => requester.user_id,
            "parent_id" => draft.parent_id
        );

        let unit = self.store.find_or_fail(&self.db, id).await?;

        if !self.access.can_update(requester, &unit) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to update this organization unit",
            ));
        }

        draft
            .validate()
            .map_err(|e| convert_validation_errors(e, CONTEXT))?;

        let uow = UnitOfWork::begin(&self.db).await?;
        let result = self.update_in(uow.txn(), id, draft).await;
        let (unit, moved) = uow.finish(result).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Organization unit updated",
            "unit_id" => unit.id,
            "parent_id" => unit.parent_id,
            "moved" => moved,
            "requester_id" => requester.user_id
        );

        Ok(Outcome::select(mode, unit, |unit| View::Redirect {
            to: Route::Edit(unit.id),
            notice: UPDATED_MESSAGE.to_string(),
            clear_old_input: true,
        }))
    }

    async fn update_in<C>(
        &self,
        conn: &C,
        id: Uuid,
        draft: UpdateOrganizationUnitDto,
    ) -> AppResult<(organization_unit_model::Model, bool)>
    where
        C: ConnectionTrait,
    {
        const CONTEXT: &str = "organization_unit_service::update";

        let current = self.store.find_or_fail(conn, id).await?;

        if let Some(user_id) = draft.user_id {
            Self::ensure_user_exists(conn, user_id, OWNER_MISSING).await?;
        }

        // 親の比較は属性を書き込む前の値で行う
        let new_parent = match draft.parent_id {
            Some(parent_id) if current.parent_id != Some(parent_id) => {
                Some(self.resolve_move_target(conn, &current, parent_id).await?)
            }
            _ => None,
        };

        let updated_at = advance_past(current.updated_at);
        let mut active_model: organization_unit_model::ActiveModel = current.into();
        if let Some(name) = draft.name {
            active_model.name = Set(name.trim().to_string());
        }
        if let Some(user_id) = draft.user_id {
            active_model.user_id = Set(user_id);
        }
        active_model.updated_at = Set(updated_at);

        let mut unit = self
            .store
            .update(conn, active_model)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to update organization unit"))?;

        let moved = new_parent.is_some();
        if let Some(parent) = new_parent {
            unit = self
                .store
                .attach_child(conn, &parent, unit)
                .await
                .map_err(|e| persistence_error(e, CONTEXT, "Failed to move organization unit"))?;

            self.store
                .touch(conn, parent.id)
                .await
                .map_err(|e| persistence_error(e, CONTEXT, "Failed to update parent unit"))?;
        }

        Ok((unit, moved))
    }

    /// 移動先の親を取得し、循環が生じないことを確認する
    async fn resolve_move_target<C>(
        &self,
        conn: &C,
        unit: &organization_unit_model::Model,
        parent_id: Uuid,
    ) -> AppResult<organization_unit_model::Model>
    where
        C: ConnectionTrait,
    {
        if parent_id == unit.id {
            return Err(validation_error(
                "parent_id",
                "An organization unit cannot be its own parent",
            ));
        }

        // 移動先の系列を行ロックしてから循環を判定する
        let lineage = self.store.lineage_for_update(conn, parent_id).await?;
        if lineage.iter().any(|ancestor| ancestor.id == unit.id) {
            return Err(validation_error(
                "parent_id",
                "An organization unit cannot be moved under its own descendant",
            ));
        }

        let Some(parent) = lineage.into_iter().next() else {
            return Err(not_found("Organization unit", parent_id));
        };

        Ok(parent)
    }

    // --- 削除 ---

    /// ユニットを削除する
    ///
    /// 子ユニットは削除対象の親へ付け替えられ（ルートの場合は子がルートになる）、
    /// メンバーシップは削除される。
    pub async fn destroy(
        &self,
        requester: &Requester,
        id: Uuid,
        mode: ResponseMode,
    ) -> AppResult<Outcome<StatusResponse>> {
        const CONTEXT: &str = "organization_unit_service::destroy";

        let unit = self.store.find_or_fail(&self.db, id).await?;

        if !self.access.can_delete(requester, &unit) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to delete this organization unit",
            ));
        }

        let uow = UnitOfWork::begin(&self.db).await?;
        let result = self.destroy_in(uow.txn(), id).await;
        let reparented = uow.finish(result).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Organization unit deleted",
            "unit_id" => id,
            "reparented_children" => reparented,
            "requester_id" => requester.user_id
        );

        Ok(Outcome::select(
            mode,
            StatusResponse::success(DELETED_MESSAGE),
            |_| View::redirect(Route::Index, DELETED_MESSAGE),
        ))
    }

    async fn destroy_in<C>(&self, conn: &C, id: Uuid) -> AppResult<usize>
    where
        C: ConnectionTrait,
    {
        const CONTEXT: &str = "organization_unit_service::destroy";

        let unit = self.store.find_or_fail(conn, id).await?;
        let children = self.store.children(conn, unit.id).await?;
        let new_parent = match unit.parent_id {
            Some(parent_id) => self.store.find(conn, parent_id).await?,
            None => None,
        };

        // 子ユニットの付け替え
        let reparented = children.len();
        for child in children {
            let result = match &new_parent {
                Some(parent) => self.store.attach_child(conn, parent, child).await,
                None => self.store.detach(conn, child).await,
            };
            result.map_err(|e| persistence_error(e, CONTEXT, "Failed to reparent child units"))?;
        }

        self.store
            .remove_all_members(conn, unit.id)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to remove unit members"))?;

        let deleted = self
            .store
            .delete(conn, unit.id)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to delete organization unit"))?;
        if deleted == 0 {
            return Err(AppError::Persistence(
                "Failed to delete organization unit".to_string(),
            ));
        }

        // 子を受け取った親を更新
        if let Some(parent) = new_parent.as_ref().filter(|_| reparented > 0) {
            self.store
                .touch(conn, parent.id)
                .await
                .map_err(|e| persistence_error(e, CONTEXT, "Failed to update parent unit"))?;
        }

        Ok(reparented)
    }

    // --- メンバー管理 ---

    pub async fn add_member(
        &self,
        requester: &Requester,
        unit_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<organization_unit_user_model::Model> {
        const CONTEXT: &str = "organization_unit_service::add_member";

        let unit = self.store.find_or_fail(&self.db, unit_id).await?;

        if !self.access.can_update(requester, &unit) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to manage members of this organization unit",
            ));
        }

        let uow = UnitOfWork::begin(&self.db).await?;
        let result = async {
            Self::ensure_user_exists(uow.txn(), user_id, "User does not exist").await?;
            self.store
                .add_member(uow.txn(), unit_id, user_id)
                .await
                .map_err(|e| persistence_error(e, CONTEXT, "Failed to add unit member"))
        }
        .await;
        let membership = uow.finish(result).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Member added to organization unit",
            "unit_id" => unit_id,
            "user_id" => user_id,
            "requester_id" => requester.user_id
        );

        Ok(membership)
    }

    pub async fn remove_member(
        &self,
        requester: &Requester,
        unit_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<StatusResponse> {
        const CONTEXT: &str = "organization_unit_service::remove_member";

        let unit = self.store.find_or_fail(&self.db, unit_id).await?;

        if !self.access.can_update(requester, &unit) {
            return Err(access_denied(
                CONTEXT,
                "You are not allowed to manage members of this organization unit",
            ));
        }

        let removed = self
            .store
            .remove_member(&self.db, unit_id, user_id)
            .await
            .map_err(|e| persistence_error(e, CONTEXT, "Failed to remove unit member"))?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of organization unit {}",
                user_id, unit_id
            )));
        }

        log_with_context!(
            tracing::Level::INFO,
            "Member removed from organization unit",
            "unit_id" => unit_id,
            "user_id" => user_id,
            "requester_id" => requester.user_id
        );

        Ok(StatusResponse::success("Member removed successfully."))
    }

    // --- ヘルパー ---

    async fn ensure_user_exists<C>(conn: &C, user_id: Uuid, message: &str) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        if UserRepository::exists(conn, user_id).await? {
            Ok(())
        } else {
            Err(validation_error("user_id", message))
        }
    }

    fn new_active_model(name: &str, user_id: Uuid) -> organization_unit_model::ActiveModel {
        let now = truncated_now();
        organization_unit_model::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            user_id: Set(user_id),
            parent_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
