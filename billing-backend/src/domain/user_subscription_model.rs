// src/domain/user_subscription_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// ユーザーが契約しているプランのインスタンス
///
/// (user, service) ごとに `status = true` のレコードは高々1件。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub user_id: i64,

    pub plan_id: i64,

    /// アクティブかどうか
    pub status: bool,

    /// 自動更新フラグ
    pub renewal: bool,

    pub activation: bool,

    pub start: DateTime<Utc>,

    pub end: DateTime<Utc>,

    pub trial: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user_model::Entity",
        from = "Column::UserId",
        to = "crate::domain::user_model::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "crate::domain::subscription_plan_model::Entity",
        from = "Column::PlanId",
        to = "crate::domain::subscription_plan_model::Column::Id"
    )]
    Plan,

    #[sea_orm(has_one = "crate::domain::access_code_model::Entity")]
    AccessCode,
}

impl Related<crate::domain::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::domain::subscription_plan_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<crate::domain::access_code_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `now` 時点で期限切れかどうか
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }
}
