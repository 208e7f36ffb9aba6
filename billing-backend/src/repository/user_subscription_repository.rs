// src/repository/user_subscription_repository.rs

use crate::domain::access_code_model::{
    self, ActiveModel as AccessCodeActiveModel, Entity as AccessCodeEntity,
};
use crate::domain::service_model::{self, Entity as ServiceEntity};
use crate::domain::subscription_plan_model::{self, Entity as PlanEntity};
use crate::domain::user_subscription_model::{
    self, ActiveModel as UserSubscriptionActiveModel, Entity as UserSubscriptionEntity,
};
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ConnectionTrait, DbConn, DbErr, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct UserSubscriptionRepository {
    db: DbConn,
}

/// ユーザーサブスクリプション一覧の絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Active,
    Inactive,
}

/// 一覧の並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionOrder {
    /// 非アクティブ → アクティブ
    Status,
    EndAsc,
    EndDesc,
}

impl UserSubscriptionRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // --- 参照系 ---

    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<user_subscription_model::Model>, DbErr> {
        UserSubscriptionEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_user(
        &self,
        user_id: i64,
        status: StatusFilter,
        order: SubscriptionOrder,
    ) -> Result<Vec<user_subscription_model::Model>, DbErr> {
        let mut query = UserSubscriptionEntity::find()
            .filter(user_subscription_model::Column::UserId.eq(user_id));

        query = match status {
            StatusFilter::All => query,
            StatusFilter::Active => query.filter(user_subscription_model::Column::Status.eq(true)),
            StatusFilter::Inactive => {
                query.filter(user_subscription_model::Column::Status.eq(false))
            }
        };

        query = match order {
            SubscriptionOrder::Status => query
                .order_by_asc(user_subscription_model::Column::Status)
                .order_by_asc(user_subscription_model::Column::Id),
            SubscriptionOrder::EndAsc => query.order_by_asc(user_subscription_model::Column::End),
            SubscriptionOrder::EndDesc => {
                query.order_by_desc(user_subscription_model::Column::End)
            }
        };

        query.all(&self.db).await
    }

    /// 指定サービスに対するユーザーのサブスクリプション（アクティブ優先、最新順で1件）
    pub async fn find_by_user_and_service(
        &self,
        user_id: i64,
        service_id: i64,
    ) -> Result<Option<user_subscription_model::Model>, DbErr> {
        UserSubscriptionEntity::find()
            .join(JoinType::InnerJoin, user_subscription_model::Relation::Plan.def())
            .filter(user_subscription_model::Column::UserId.eq(user_id))
            .filter(subscription_plan_model::Column::ServiceId.eq(service_id))
            .order_by_desc(user_subscription_model::Column::Status)
            .order_by_desc(user_subscription_model::Column::Id)
            .one(&self.db)
            .await
    }

    /// プラン・サービス・アクセスコードをまとめて読み込む
    pub async fn load_details(
        &self,
        subscriptions: Vec<user_subscription_model::Model>,
    ) -> Result<Vec<UserSubscriptionDetails>, DbErr> {
        Self::load_details_with(&self.db, subscriptions).await
    }

    pub async fn set_renewal(
        &self,
        subscription: user_subscription_model::Model,
        renewal: bool,
    ) -> Result<user_subscription_model::Model, DbErr> {
        let mut active_model: UserSubscriptionActiveModel = subscription.into();
        active_model.renewal = Set(renewal);
        active_model.update(&self.db).await
    }

    pub async fn create_access_code(
        &self,
        user_subscription_id: i64,
        name: &str,
        end_date: DateTime<Utc>,
    ) -> Result<access_code_model::Model, DbErr> {
        let new_code = AccessCodeActiveModel {
            user_subscription_id: Set(user_subscription_id),
            name: Set(name.to_string()),
            end_date: Set(end_date),
            ..Default::default()
        };

        new_code.insert(&self.db).await
    }

    // --- 期限切れスイープ ---

    /// `end < now` のアクティブなサブスクリプション
    pub async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<user_subscription_model::Model>, DbErr> {
        UserSubscriptionEntity::find()
            .filter(user_subscription_model::Column::Status.eq(true))
            .filter(user_subscription_model::Column::End.lt(now))
            .order_by_asc(user_subscription_model::Column::Id)
            .all(&self.db)
            .await
    }

    /// まだ期限切れのままであれば非アクティブにする
    ///
    /// 同時に更新（`end` の延長）されたレコードは条件に一致せず、false を返す。
    pub async fn deactivate_if_expired(&self, id: i64, now: DateTime<Utc>) -> Result<bool, DbErr> {
        let result = UserSubscriptionEntity::update_many()
            .col_expr(user_subscription_model::Column::Status, Expr::value(false))
            .filter(user_subscription_model::Column::Id.eq(id))
            .filter(user_subscription_model::Column::Status.eq(true))
            .filter(user_subscription_model::Column::End.lt(now))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    // --- トランザクション内で使用する操作 ---

    /// 指定サービスに対するユーザーのアクティブなサブスクリプションをロックして取得
    pub async fn lock_active_for_service<C>(
        conn: &C,
        user_id: i64,
        service_id: i64,
    ) -> Result<Vec<user_subscription_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        // サブクエリのプラン行はロックしない
        let service_plans = Query::select()
            .column(subscription_plan_model::Column::Id)
            .from(PlanEntity)
            .and_where(subscription_plan_model::Column::ServiceId.eq(service_id))
            .to_owned();

        UserSubscriptionEntity::find()
            .filter(user_subscription_model::Column::UserId.eq(user_id))
            .filter(user_subscription_model::Column::Status.eq(true))
            .filter(user_subscription_model::Column::PlanId.in_subquery(service_plans))
            .order_by_asc(user_subscription_model::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await
    }

    pub async fn create<C>(
        conn: &C,
        new_subscription: NewUserSubscription,
    ) -> Result<user_subscription_model::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let active_model = UserSubscriptionActiveModel {
            user_id: Set(new_subscription.user_id),
            plan_id: Set(new_subscription.plan_id),
            status: Set(true),
            renewal: Set(true),
            activation: Set(true),
            start: Set(new_subscription.start),
            end: Set(new_subscription.end),
            trial: Set(false),
            ..Default::default()
        };

        active_model.insert(conn).await
    }

    /// 同一プランの再購入: 有効期限を現在の `end` から延長する
    pub async fn extend<C>(
        conn: &C,
        subscription: user_subscription_model::Model,
        new_end: DateTime<Utc>,
    ) -> Result<user_subscription_model::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model: UserSubscriptionActiveModel = subscription.into();
        active_model.status = Set(true);
        active_model.end = Set(new_end);
        active_model.update(conn).await
    }

    /// プラン変更: 旧レコードを即時終了させる
    pub async fn deactivate<C>(
        conn: &C,
        subscription: user_subscription_model::Model,
        now: DateTime<Utc>,
    ) -> Result<user_subscription_model::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model: UserSubscriptionActiveModel = subscription.into();
        active_model.status = Set(false);
        active_model.renewal = Set(false);
        active_model.end = Set(now);
        active_model.update(conn).await
    }

    pub async fn load_details_with<C>(
        conn: &C,
        subscriptions: Vec<user_subscription_model::Model>,
    ) -> Result<Vec<UserSubscriptionDetails>, DbErr>
    where
        C: ConnectionTrait,
    {
        if subscriptions.is_empty() {
            return Ok(Vec::new());
        }

        let plan_ids: Vec<i64> = subscriptions.iter().map(|s| s.plan_id).collect();
        let subscription_ids: Vec<i64> = subscriptions.iter().map(|s| s.id).collect();

        let plans: HashMap<i64, (subscription_plan_model::Model, Option<service_model::Model>)> =
            PlanEntity::find()
                .filter(subscription_plan_model::Column::Id.is_in(plan_ids))
                .find_also_related(ServiceEntity)
                .all(conn)
                .await?
                .into_iter()
                .map(|(plan, service)| (plan.id, (plan, service)))
                .collect();

        let access_codes: HashMap<i64, access_code_model::Model> = AccessCodeEntity::find()
            .filter(access_code_model::Column::UserSubscriptionId.is_in(subscription_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|code| (code.user_subscription_id, code))
            .collect();

        subscriptions
            .into_iter()
            .map(|subscription| {
                let (plan, service) = plans.get(&subscription.plan_id).cloned().ok_or_else(|| {
                    DbErr::RecordNotFound(format!(
                        "subscription plan {} for user subscription {}",
                        subscription.plan_id, subscription.id
                    ))
                })?;
                let service = service.ok_or_else(|| {
                    DbErr::RecordNotFound(format!("service {} for plan {}", plan.service_id, plan.id))
                })?;
                let access_code = access_codes.get(&subscription.id).cloned();

                Ok(UserSubscriptionDetails {
                    subscription,
                    plan,
                    service,
                    access_code,
                })
            })
            .collect()
    }
}

/// 新規サブスクリプション作成用構造体
#[derive(Debug, Clone)]
pub struct NewUserSubscription {
    pub user_id: i64,
    pub plan_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// ユーザーサブスクリプションと関連データ
#[derive(Debug, Clone)]
pub struct UserSubscriptionDetails {
    pub subscription: user_subscription_model::Model,
    pub plan: subscription_plan_model::Model,
    pub service: service_model::Model,
    pub access_code: Option<access_code_model::Model>,
}
