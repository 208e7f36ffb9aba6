// src/repository/catalog_repository.rs

use crate::domain::category_model::{
    self, ActiveModel as CategoryActiveModel, Entity as CategoryEntity,
};
use crate::domain::service_model::{self, ActiveModel as ServiceActiveModel, Entity as ServiceEntity};
use crate::domain::subscription_plan_model::{
    self, ActiveModel as PlanActiveModel, Entity as PlanEntity,
};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter, QueryOrder, Set};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DbConn,
}

impl CatalogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // --- プラン ---

    pub async fn find_plan_by_id(
        &self,
        id: i64,
    ) -> Result<Option<subscription_plan_model::Model>, DbErr> {
        PlanEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn create_plan(
        &self,
        create_plan: CreatePlan,
    ) -> Result<subscription_plan_model::Model, DbErr> {
        let new_plan = PlanActiveModel {
            name: Set(create_plan.name),
            availability: Set(create_plan.availability),
            price: Set(create_plan.price),
            period: Set(create_plan.period),
            cashback: Set(create_plan.cashback),
            service_id: Set(create_plan.service_id),
            trial_period_days: Set(create_plan.trial_period_days),
            trial_period_cost: Set(create_plan.trial_period_cost),
            ..Default::default()
        };

        new_plan.insert(&self.db).await
    }

    // --- サービス ---

    pub async fn create_service(
        &self,
        create_service: CreateService,
    ) -> Result<service_model::Model, DbErr> {
        let new_service = ServiceActiveModel {
            name: Set(create_service.name),
            image: Set(create_service.image),
            description: Set(create_service.description),
            website: Set(create_service.website),
            availability: Set(true),
            popularity: Set(0),
            category_id: Set(create_service.category_id),
            ..Default::default()
        };

        new_service.insert(&self.db).await
    }

    pub async fn create_category(&self, name: &str) -> Result<category_model::Model, DbErr> {
        let new_category = CategoryActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        new_category.insert(&self.db).await
    }

    /// サービスごとに最安の購入可能プランを取得
    ///
    /// 購入不可のサービス・プランは除外する。結果はサービスID順。
    pub async fn find_available_services(&self) -> Result<Vec<AvailableServicePlan>, DbErr> {
        let plans_with_service = PlanEntity::find()
            .filter(subscription_plan_model::Column::Availability.eq(true))
            .find_also_related(ServiceEntity)
            .filter(service_model::Column::Availability.eq(true))
            .order_by_asc(subscription_plan_model::Column::Id)
            .all(&self.db)
            .await?;

        let mut cheapest: BTreeMap<i64, (service_model::Model, subscription_plan_model::Model)> =
            BTreeMap::new();
        for (plan, service) in plans_with_service {
            let Some(service) = service else { continue };
            match cheapest.get(&service.id) {
                Some((_, current)) if current.price <= plan.price => {}
                _ => {
                    cheapest.insert(service.id, (service, plan));
                }
            }
        }

        let category_ids: Vec<i64> = cheapest.values().map(|(s, _)| s.category_id).collect();
        let categories: HashMap<i64, category_model::Model> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category_model::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(cheapest
            .into_values()
            .map(|(service, plan)| AvailableServicePlan {
                category: categories.get(&service.category_id).cloned(),
                service,
                plan,
            })
            .collect())
    }
}

/// サービスと、その最安プラン
#[derive(Debug, Clone)]
pub struct AvailableServicePlan {
    pub service: service_model::Model,
    pub category: Option<category_model::Model>,
    pub plan: subscription_plan_model::Model,
}

/// プラン作成用構造体
#[derive(Debug, Clone)]
pub struct CreatePlan {
    pub name: String,
    pub availability: bool,
    pub price: i64,
    pub period: i32,
    pub cashback: i64,
    pub service_id: i64,
    pub trial_period_days: Option<i32>,
    pub trial_period_cost: Option<i64>,
}

/// サービス作成用構造体
#[derive(Debug, Clone)]
pub struct CreateService {
    pub name: String,
    pub image: String,
    pub description: String,
    pub website: String,
    pub category_id: i64,
}
