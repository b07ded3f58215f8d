// org-unit-backend/src/service/access_control.rs

//! 権限チェック。
//!
//! 操作ごと・エンティティごとの真偽判定を [`AccessControl`] に集約する。
//! `entity` が `None` の場合はクラスレベル（一覧・作成など）の判定になる。

use crate::domain::organization_unit_model;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Create,
    Show,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Show => "show",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequesterRole {
    Admin,
    Member,
    Viewer,
}

/// 操作を要求しているユーザー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: RequesterRole,
}

impl Requester {
    pub fn new(user_id: Uuid, role: RequesterRole) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, RequesterRole::Admin)
    }

    pub fn member(user_id: Uuid) -> Self {
        Self::new(user_id, RequesterRole::Member)
    }

    pub fn viewer(user_id: Uuid) -> Self {
        Self::new(user_id, RequesterRole::Viewer)
    }
}

/// 所有者を持つエンティティ
pub trait OwnedEntity {
    fn owner_id(&self) -> Uuid;
}

impl OwnedEntity for organization_unit_model::Model {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

pub trait AccessControl<E>: Send + Sync {
    fn can(&self, requester: &Requester, operation: Operation, entity: Option<&E>) -> bool;

    fn can_list(&self, requester: &Requester) -> bool {
        self.can(requester, Operation::List, None)
    }

    fn can_create(&self, requester: &Requester) -> bool {
        self.can(requester, Operation::Create, None)
    }

    fn can_show(&self, requester: &Requester, entity: &E) -> bool {
        self.can(requester, Operation::Show, Some(entity))
    }

    fn can_update(&self, requester: &Requester, entity: &E) -> bool {
        self.can(requester, Operation::Update, Some(entity))
    }

    fn can_delete(&self, requester: &Requester, entity: &E) -> bool {
        self.can(requester, Operation::Delete, Some(entity))
    }
}

/// ロールと所有関係に基づくデフォルトの権限ポリシー
///
/// - Admin: すべて許可
/// - Member: 一覧・参照・作成は許可、更新・削除は自分が所有するものだけ
/// - Viewer: 一覧・参照のみ
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleBasedAccessControl;

impl<E: OwnedEntity> AccessControl<E> for RoleBasedAccessControl {
    fn can(&self, requester: &Requester, operation: Operation, entity: Option<&E>) -> bool {
        match requester.role {
            RequesterRole::Admin => true,
            RequesterRole::Member => match operation {
                Operation::List | Operation::Show | Operation::Create => true,
                Operation::Update | Operation::Delete => {
                    entity.is_some_and(|e| e.owner_id() == requester.user_id)
                }
            },
            RequesterRole::Viewer => matches!(operation, Operation::List | Operation::Show),
        }
    }
}
