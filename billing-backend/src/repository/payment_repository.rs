// src/repository/payment_repository.rs

use crate::domain::account_model::{self, Entity as AccountEntity};
use crate::domain::cashback_applied_model::{
    self, ActiveModel as CashbackAppliedActiveModel, Entity as CashbackAppliedEntity,
};
use crate::domain::payment_model::{
    self, ActiveModel as PaymentActiveModel, Entity as PaymentEntity, RECEIPT_PREFIX,
};
use crate::domain::service_model::{self, Entity as ServiceEntity};
use crate::domain::subscription_plan_model::{self, Entity as PlanEntity};
use crate::error::AppResult;
use crate::repository::document_repository::DocumentRepository;
use crate::utils::numbering::{lock_numbering, next_number, NumberingLock};
use crate::utils::period::DateRange;
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::{
    ConnectionTrait, DbConn, DbErr, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DbConn,
}

/// 支払い検索条件
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub service_id: Option<i64>,
    pub period: Option<DateRange>,
}

impl PaymentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<payment_model::Model>, DbErr> {
        PaymentEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_account_id(
        &self,
        account_id: i64,
    ) -> Result<Vec<payment_model::Model>, DbErr> {
        self.find_by_account_ids(vec![account_id], PaymentFilter::default())
            .await
    }

    /// 口座群の支払いを新しい順に取得
    pub async fn find_by_account_ids(
        &self,
        account_ids: Vec<i64>,
        filter: PaymentFilter,
    ) -> Result<Vec<payment_model::Model>, DbErr> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            PaymentEntity::find().filter(payment_model::Column::AccountId.is_in(account_ids));

        if let Some(service_id) = filter.service_id {
            query = query
                .join(JoinType::InnerJoin, payment_model::Relation::Plan.def())
                .filter(subscription_plan_model::Column::ServiceId.eq(service_id));
        }

        if let Some(period) = filter.period {
            query = query
                .filter(payment_model::Column::Date.gte(period.start))
                .filter(payment_model::Column::Date.lt(period.end_exclusive));
        }

        query
            .order_by_desc(payment_model::Column::Date)
            .order_by_desc(payment_model::Column::Id)
            .all(&self.db)
            .await
    }

    /// プラン・サービス・口座・キャッシュバックをまとめて読み込む
    pub async fn load_details(
        &self,
        payments: Vec<payment_model::Model>,
    ) -> Result<Vec<PaymentDetails>, DbErr> {
        if payments.is_empty() {
            return Ok(Vec::new());
        }

        let plan_ids: Vec<i64> = payments.iter().map(|p| p.plan_id).collect();
        let account_ids: Vec<i64> = payments.iter().map(|p| p.account_id).collect();
        let cashback_ids: Vec<i64> = payments.iter().map(|p| p.cashback_applied_id).collect();

        let plans: HashMap<i64, (subscription_plan_model::Model, Option<service_model::Model>)> =
            PlanEntity::find()
                .filter(subscription_plan_model::Column::Id.is_in(plan_ids))
                .find_also_related(ServiceEntity)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|(plan, service)| (plan.id, (plan, service)))
                .collect();

        let accounts: HashMap<i64, account_model::Model> = AccountEntity::find()
            .filter(account_model::Column::Id.is_in(account_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let cashbacks: HashMap<i64, cashback_applied_model::Model> = CashbackAppliedEntity::find()
            .filter(cashback_applied_model::Column::Id.is_in(cashback_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        payments
            .into_iter()
            .map(|payment| {
                let (plan, service) = plans.get(&payment.plan_id).cloned().ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "subscription plan {} for payment {}",
                        payment.plan_id, payment.id
                    ))
                })?;
                let service = service.ok_or_else(|| {
                    DbErr::RecordNotFound(format!("service {} for plan {}", plan.service_id, plan.id))
                })?;
                let account = accounts.get(&payment.account_id).cloned().ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "account {} for payment {}",
                        payment.account_id, payment.id
                    ))
                })?;
                let cashback = cashbacks.get(&payment.cashback_applied_id).cloned();

                Ok(PaymentDetails {
                    payment,
                    plan,
                    service,
                    account,
                    cashback,
                })
            })
            .collect()
    }

    // --- トランザクション内で使用する操作 ---

    /// キャッシュバックと支払いを記録する
    ///
    /// レシート番号はアドバイザリロック下で採番するため、トランザクション内で呼び出すこと。
    pub async fn record<C>(conn: &C, new_payment: NewPayment) -> AppResult<payment_model::Model>
    where
        C: ConnectionTrait,
    {
        let cashback = CashbackAppliedActiveModel {
            amount: Set(new_payment.cashback),
            applied_status: Set(false),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        lock_numbering(conn, NumberingLock::Receipt).await?;
        let last = PaymentEntity::find()
            .order_by_desc(payment_model::Column::Id)
            .one(conn)
            .await?;
        let receipt = next_number(RECEIPT_PREFIX, last.as_ref().map(|p| p.receipt.as_str()))?;

        let document = DocumentRepository::latest(conn).await?;

        let payment = PaymentActiveModel {
            amount: Set(new_payment.amount),
            date: Set(new_payment.date),
            receipt: Set(receipt),
            document_id: Set(document.map(|d| d.id)),
            cashback_applied_id: Set(cashback.id),
            plan_id: Set(new_payment.plan_id),
            account_id: Set(new_payment.account_id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(payment)
    }
}

/// 支払い記録用構造体
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: i64,
    pub cashback: i64,
    pub date: DateTime<Utc>,
    pub plan_id: i64,
    pub account_id: i64,
}

/// 支払いと関連データ
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub payment: payment_model::Model,
    pub plan: subscription_plan_model::Model,
    pub service: service_model::Model,
    pub account: account_model::Model,
    pub cashback: Option<cashback_applied_model::Model>,
}
