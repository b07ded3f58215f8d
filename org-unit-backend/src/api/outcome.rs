//! 応答モード（データ / 描画）と操作結果の型。
//!
//! 各操作は呼び出し元が指定した [`ResponseMode`] に従い、機械可読なペイロード
//! ([`Outcome::Data`]) か、描画側に渡す意図 ([`Outcome::Render`]) のどちらかを返す。

use crate::domain::organization_unit_model;
use serde::Serialize;
use uuid::Uuid;

pub const CREATED_MESSAGE: &str = "Organization unit created successfully.";
pub const UPDATED_MESSAGE: &str = "Organization unit updated successfully.";
pub const DELETED_MESSAGE: &str = "Organization unit deleted successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// 機械可読なペイロードを返す
    Data,
    /// ビューの描画・リダイレクトを返す
    Render,
}

impl ResponseMode {
    pub fn is_data(self) -> bool {
        matches!(self, ResponseMode::Data)
    }
}

/// 描画モードでのリダイレクト先
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "id", rename_all = "snake_case")]
pub enum Route {
    Index,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Index,
    CreateForm,
    Show {
        unit: organization_unit_model::Model,
    },
    /// 対象が存在しない場合も描画側に判断を委ねる
    Edit {
        unit: Option<organization_unit_model::Model>,
    },
    Redirect {
        to: Route,
        notice: String,
        /// 直前の入力値キャッシュを破棄するか
        clear_old_input: bool,
    },
}

impl View {
    pub fn redirect(to: Route, notice: &str) -> Self {
        View::Redirect {
            to,
            notice: notice.to_string(),
            clear_old_input: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Data(T),
    Render(View),
}

impl<T> Outcome<T> {
    /// モードに応じてペイロードか描画意図を選ぶ
    pub fn select(mode: ResponseMode, data: T, view: impl FnOnce(T) -> View) -> Self {
        match mode {
            ResponseMode::Data => Outcome::Data(data),
            ResponseMode::Render => Outcome::Render(view(data)),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Data(data) => Some(data),
            Outcome::Render(_) => None,
        }
    }

    pub fn into_view(self) -> Option<View> {
        match self {
            Outcome::Data(_) => None,
            Outcome::Render(view) => Some(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_mode() {
        let data = Outcome::select(ResponseMode::Data, 42, |_| View::Index);
        assert_eq!(data.into_data(), Some(42));

        let render = Outcome::select(ResponseMode::Render, 42, |_| View::Index);
        assert_eq!(render.into_view(), Some(View::Index));
    }

    #[test]
    fn test_redirect_serialization() {
        let id = Uuid::nil();
        let view = View::Redirect {
            to: Route::Edit(id),
            notice: UPDATED_MESSAGE.to_string(),
            clear_old_input: true,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "redirect");
        assert_eq!(json["to"]["route"], "edit");
        assert_eq!(json["clear_old_input"], true);
    }
}
