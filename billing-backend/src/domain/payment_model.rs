// src/domain/payment_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// レシート番号のプレフィックス（例: R000001）
pub const RECEIPT_PREFIX: &str = "R";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub amount: i64,

    pub date: DateTime<Utc>,

    #[sea_orm(unique)]
    pub receipt: String,

    #[sea_orm(nullable)]
    pub document_id: Option<i64>,

    pub cashback_applied_id: i64,

    pub plan_id: i64,

    pub account_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::account_model::Entity",
        from = "Column::AccountId",
        to = "crate::domain::account_model::Column::Id"
    )]
    Account,

    #[sea_orm(
        belongs_to = "crate::domain::subscription_plan_model::Entity",
        from = "Column::PlanId",
        to = "crate::domain::subscription_plan_model::Column::Id"
    )]
    Plan,

    #[sea_orm(
        belongs_to = "crate::domain::cashback_applied_model::Entity",
        from = "Column::CashbackAppliedId",
        to = "crate::domain::cashback_applied_model::Column::Id"
    )]
    CashbackApplied,

    #[sea_orm(
        belongs_to = "crate::domain::document_model::Entity",
        from = "Column::DocumentId",
        to = "crate::domain::document_model::Column::Id"
    )]
    Document,
}

impl Related<crate::domain::account_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<crate::domain::subscription_plan_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<crate::domain::cashback_applied_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashbackApplied.def()
    }
}

impl Related<crate::domain::document_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
