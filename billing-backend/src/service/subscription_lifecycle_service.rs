// src/service/subscription_lifecycle_service.rs

//! サブスクリプションの購入・更新・プラン変更
//!
//! 購入リクエスト1件を1トランザクションで処理する。ユーザー行と口座行を
//! `FOR UPDATE` でロックするため、同一ユーザーの購入は直列化され、
//! 残高の二重引き落としや (user, service) あたり複数のアクティブ契約は発生しない。

use crate::db::DbPool;
use crate::domain::subscription_plan_model;
use crate::domain::user_subscription_model;
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::account_repository::AccountRepository;
use crate::repository::catalog_repository::CatalogRepository;
use crate::repository::payment_repository::{NewPayment, PaymentRepository};
use crate::repository::user_repository::UserRepository;
use crate::repository::user_subscription_repository::{
    NewUserSubscription, UserSubscriptionDetails, UserSubscriptionRepository,
};
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::sync::Arc;

/// 購入リクエスト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub user_id: i64,
    pub plan_id: i64,
    pub account_id: i64,
}

/// 購入時の状態遷移
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// アクティブな契約なし: 新規作成
    Create,
    /// 同一プランの契約あり: 期限延長
    Renew(user_subscription_model::Model),
    /// 同一サービスの別プランの契約あり: 旧契約を終了して新規作成
    Switch(user_subscription_model::Model),
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Create => "create",
            Transition::Renew(_) => "renew",
            Transition::Switch(_) => "switch",
        }
    }
}

/// 同一サービスのアクティブな契約から遷移を決める
pub fn decide_transition(
    plan_id: i64,
    mut active: Vec<user_subscription_model::Model>,
) -> AppResult<Transition> {
    if active.len() > 1 {
        let ids: Vec<i64> = active.iter().map(|s| s.id).collect();
        return Err(AppError::DataIntegrity(format!(
            "Multiple active subscriptions for the same service: {:?}",
            ids
        )));
    }

    Ok(match active.pop() {
        None => Transition::Create,
        Some(existing) if existing.plan_id == plan_id => Transition::Renew(existing),
        Some(existing) => Transition::Switch(existing),
    })
}

/// 引き落とし後の残高。不足していれば `InsufficientFunds`
pub fn debit(balance: i64, price: i64) -> AppResult<i64> {
    match balance.checked_sub(price) {
        Some(new_balance) if new_balance >= 0 => Ok(new_balance),
        Some(_) => Err(AppError::InsufficientFunds { balance, price }),
        None => Err(AppError::DataIntegrity(format!(
            "Balance arithmetic overflowed (balance {}, price {})",
            balance, price
        ))),
    }
}

/// 新規契約の期間
pub fn new_subscription_window(
    plan: &subscription_plan_model::Model,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + plan.period_duration())
}

#[derive(Clone)]
pub struct SubscriptionLifecycleService {
    db: DbPool,
    catalog_repo: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
}

impl SubscriptionLifecycleService {
    pub fn new(db: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog_repo: Arc::new(CatalogRepository::new(db.clone())),
            db,
            clock,
        }
    }

    /// プランを購入する（新規・更新・プラン変更）
    pub async fn purchase(&self, request: PurchaseRequest) -> AppResult<UserSubscriptionDetails> {
        let plan = self
            .catalog_repo
            .find_plan_by_id(request.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

        if !plan.availability {
            return Err(AppError::BadRequest(format!(
                "Subscription plan {} is not available for purchase",
                plan.id
            )));
        }

        let txn = self.db.begin().await?;
        let now = self.clock.now();

        // ユーザー → 口座の順でロックする
        UserRepository::lock_by_id(&txn, request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let account = AccountRepository::lock_by_id(&txn, request.account_id)
            .await?
            .filter(|account| account.is_owned_by(request.user_id))
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let new_balance = match debit(account.balance, plan.price) {
            Ok(balance) => balance,
            Err(e) => {
                log_with_context!(
                    tracing::Level::INFO,
                    "Purchase rejected: insufficient funds",
                    "user_id" => request.user_id,
                    "account_id" => account.id,
                    "plan_id" => plan.id,
                    "balance" => account.balance,
                    "price" => plan.price,
                );
                return Err(e);
            }
        };

        let active = UserSubscriptionRepository::lock_active_for_service(
            &txn,
            request.user_id,
            plan.service_id,
        )
        .await?;

        let transition = match decide_transition(plan.id, active) {
            Ok(transition) => transition,
            Err(e) => {
                log_with_context!(
                    tracing::Level::ERROR,
                    "Purchase aborted: inconsistent subscription state",
                    "user_id" => request.user_id,
                    "service_id" => plan.service_id,
                    "error" => e.to_string(),
                );
                return Err(e);
            }
        };
        let transition_name = transition.name();

        // 残高の更新は契約の書き込みより先に行う
        AccountRepository::update_balance(&txn, account, new_balance).await?;

        let subscription = match transition {
            Transition::Create => create_subscription(&txn, request, &plan, now).await?,
            Transition::Renew(existing) => {
                let new_end = existing.end + plan.period_duration();
                UserSubscriptionRepository::extend(&txn, existing, new_end).await?
            }
            Transition::Switch(previous) => {
                let previous_id = previous.id;
                UserSubscriptionRepository::deactivate(&txn, previous, now).await?;
                tracing::debug!(previous_id, "Previous subscription deactivated");
                create_subscription(&txn, request, &plan, now).await?
            }
        };

        let payment = PaymentRepository::record(
            &txn,
            NewPayment {
                amount: plan.price,
                cashback: plan.cashback,
                date: now,
                plan_id: plan.id,
                account_id: request.account_id,
            },
        )
        .await?;

        let details = UserSubscriptionRepository::load_details_with(&txn, vec![subscription])
            .await?
            .pop()
            .ok_or_else(|| {
                AppError::InternalServerError("Purchased subscription could not be loaded".to_string())
            })?;

        txn.commit().await?;

        log_with_context!(
            tracing::Level::INFO,
            "Subscription purchased",
            "transition" => transition_name,
            "user_id" => request.user_id,
            "user_subscription_id" => details.subscription.id,
            "plan_id" => plan.id,
            "account_id" => request.account_id,
            "new_balance" => new_balance,
            "end" => details.subscription.end,
            "receipt" => &payment.receipt,
        );

        Ok(details)
    }
}

async fn create_subscription<C>(
    conn: &C,
    request: PurchaseRequest,
    plan: &subscription_plan_model::Model,
    now: DateTime<Utc>,
) -> AppResult<user_subscription_model::Model>
where
    C: ConnectionTrait,
{
    let (start, end) = new_subscription_window(plan, now);
    let subscription = UserSubscriptionRepository::create(
        conn,
        NewUserSubscription {
            user_id: request.user_id,
            plan_id: plan.id,
            start,
            end,
        },
    )
    .await?;
    Ok(subscription)
}
