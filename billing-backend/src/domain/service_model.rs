// src/domain/service_model.rs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// サブスクリプションを提供する外部サービス
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    pub image: String,

    pub description: String,

    pub website: String,

    pub availability: bool,

    pub popularity: i32,

    pub category_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::category_model::Entity",
        from = "Column::CategoryId",
        to = "crate::domain::category_model::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "crate::domain::subscription_plan_model::Entity")]
    SubscriptionPlans,
}

impl Related<crate::domain::category_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<crate::domain::subscription_plan_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubscriptionPlans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
