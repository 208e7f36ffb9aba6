// src/domain/subscription_plan_model.rs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// カタログ上のサブスクリプションプラン（価格・期間・キャッシュバック）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    pub availability: bool,

    pub price: i64,

    /// 契約期間（日数）
    pub period: i32,

    pub cashback: i64,

    pub service_id: i64,

    #[sea_orm(nullable)]
    pub trial_period_days: Option<i32>,

    #[sea_orm(nullable)]
    pub trial_period_cost: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::service_model::Entity",
        from = "Column::ServiceId",
        to = "crate::domain::service_model::Column::Id"
    )]
    Service,

    #[sea_orm(has_many = "crate::domain::user_subscription_model::Entity")]
    UserSubscriptions,
}

impl Related<crate::domain::service_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<crate::domain::user_subscription_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSubscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// トライアル条件（費用と日数のペア）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPeriod {
    pub period_cost: i64,
    pub period_days: i32,
}

impl Model {
    /// 1契約期間の長さ
    pub fn period_duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.period))
    }

    /// 日数と費用の両方が設定されている場合のみトライアルありとみなす
    pub fn trial(&self) -> Option<TrialPeriod> {
        match (self.trial_period_days, self.trial_period_cost) {
            (Some(period_days), Some(period_cost)) => Some(TrialPeriod {
                period_cost,
                period_days,
            }),
            _ => None,
        }
    }
}
