// src/domain/cashback_applied_model.rs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cashback_applied")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub amount: i64,

    pub applied_status: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::domain::payment_model::Entity")]
    Payments,
}

impl Related<crate::domain::payment_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
