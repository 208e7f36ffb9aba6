// src/api/dto/catalog_dto.rs

use serde::{Deserialize, Serialize};

use crate::domain::service_model;
use crate::repository::catalog_repository::AvailableServicePlan;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummaryDto {
    pub id: i64,
    pub name: String,
    pub image: String,
}

impl From<&service_model::Model> for ServiceSummaryDto {
    fn from(service: &service_model::Model) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            image: service.image.clone(),
        }
    }
}

/// 購入可能なサービスと最安プラン
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableServiceDto {
    pub service_id: i64,
    pub service_name: String,
    pub image: String,
    pub plan_id: i64,
    pub min_subscription_cost: i64,
    pub period: i32,
    pub cashback: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_period_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_period_cost: Option<i64>,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub popularity: i32,
}

impl From<AvailableServicePlan> for AvailableServiceDto {
    fn from(item: AvailableServicePlan) -> Self {
        let trial = item.plan.trial();
        Self {
            service_id: item.service.id,
            service_name: item.service.name,
            image: item.service.image,
            plan_id: item.plan.id,
            min_subscription_cost: item.plan.price,
            period: item.plan.period,
            cashback: item.plan.cashback,
            trial_period_days: trial.map(|t| t.period_days),
            trial_period_cost: trial.map(|t| t.period_cost),
            category_id: item.service.category_id,
            category_name: item.category.map(|c| c.name),
            popularity: item.service.popularity,
        }
    }
}

/// サービス規約
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesDto {
    pub name: String,
    pub text: String,
}

impl From<crate::domain::document_model::Model> for RulesDto {
    fn from(document: crate::domain::document_model::Model) -> Self {
        Self {
            name: document.name,
            text: document.text,
        }
    }
}
