// src/domain/access_code_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub user_subscription_id: i64,

    pub name: String,

    pub end_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user_subscription_model::Entity",
        from = "Column::UserSubscriptionId",
        to = "crate::domain::user_subscription_model::Column::Id"
    )]
    UserSubscription,
}

impl Related<crate::domain::user_subscription_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSubscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
