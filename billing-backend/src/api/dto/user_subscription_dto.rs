// src/api/dto/user_subscription_dto.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::catalog_dto::ServiceSummaryDto;
use crate::domain::access_code_model;
use crate::domain::subscription_plan_model::{self, TrialPeriod};
use crate::repository::user_subscription_repository::UserSubscriptionDetails;

// --- Request DTOs ---

/// プラン購入リクエスト
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PurchaseSubscriptionRequest {
    #[validate(range(min = 1, message = "subscription_id must be a positive integer"))]
    pub subscription_id: i64,

    #[validate(range(min = 1, message = "account_id must be a positive integer"))]
    pub account_id: i64,
}

/// 自動更新フラグ変更リクエスト
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateRenewalRequest {
    pub renewal: bool,
}

// --- Response DTOs ---

/// 契約に紐づくプラン情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDto {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub period: i32,
    pub cashback: i64,
    pub trial: Option<TrialPeriod>,
    pub service: ServiceSummaryDto,
}

impl PlanDto {
    pub fn new(
        plan: &subscription_plan_model::Model,
        service: &crate::domain::service_model::Model,
    ) -> Self {
        Self {
            id: plan.id,
            name: plan.name.clone(),
            price: plan.price,
            period: plan.period,
            cashback: plan.cashback,
            trial: plan.trial(),
            service: ServiceSummaryDto::from(service),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCodeDto {
    pub name: String,
    pub end_date: DateTime<Utc>,
}

impl From<access_code_model::Model> for AccessCodeDto {
    fn from(code: access_code_model::Model) -> Self {
        Self {
            name: code.name,
            end_date: code.end_date,
        }
    }
}

/// ユーザーの契約
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscriptionDto {
    pub id: i64,
    pub status: bool,
    pub renewal: bool,
    pub end: DateTime<Utc>,
    pub trial: bool,
    pub user_subscription: PlanDto,
    pub access_code: Option<AccessCodeDto>,
}

impl From<UserSubscriptionDetails> for UserSubscriptionDto {
    fn from(details: UserSubscriptionDetails) -> Self {
        let plan = PlanDto::new(&details.plan, &details.service);
        let subscription = details.subscription;
        Self {
            id: subscription.id,
            status: subscription.status,
            renewal: subscription.renewal,
            end: subscription.end,
            trial: subscription.trial,
            user_subscription: plan,
            access_code: details.access_code.map(AccessCodeDto::from),
        }
    }
}

/// メインページ表示用の契約
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainPageSubscriptionDto {
    pub id: i64,
    pub status: bool,
    pub activation: bool,
    pub renewal: bool,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub trial: bool,
    pub subscription: PlanDto,
}

/// `{"user_subscription": {...}}` 形式でラップする
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainPageItemDto {
    pub user_subscription: MainPageSubscriptionDto,
}

impl From<UserSubscriptionDetails> for MainPageItemDto {
    fn from(details: UserSubscriptionDetails) -> Self {
        let plan = PlanDto::new(&details.plan, &details.service);
        let subscription = details.subscription;
        Self {
            user_subscription: MainPageSubscriptionDto {
                id: subscription.id,
                status: subscription.status,
                activation: subscription.activation,
                renewal: subscription.renewal,
                start: subscription.start,
                end: subscription.end,
                trial: subscription.trial,
                subscription: plan,
            },
        }
    }
}

/// 今後の支払い予定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPlanItemDto {
    pub user_subscription_id: i64,
    pub user_subscription_cost: i64,
    pub service: ServiceSummaryDto,
    /// 次回支払日（契約終了日）
    pub end: DateTime<Utc>,
    pub renewal: bool,
}

impl From<UserSubscriptionDetails> for PaymentPlanItemDto {
    fn from(details: UserSubscriptionDetails) -> Self {
        Self {
            user_subscription_id: details.subscription.id,
            user_subscription_cost: details.plan.price,
            service: ServiceSummaryDto::from(&details.service),
            end: details.subscription.end,
            renewal: details.subscription.renewal,
        }
    }
}
