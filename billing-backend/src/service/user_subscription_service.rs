// src/service/user_subscription_service.rs

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::repository::user_repository::UserRepository;
use crate::repository::user_subscription_repository::{
    StatusFilter, SubscriptionOrder, UserSubscriptionDetails, UserSubscriptionRepository,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserSubscriptionService {
    repo: Arc<UserSubscriptionRepository>,
    user_repo: Arc<UserRepository>,
}

impl UserSubscriptionService {
    pub fn new(db: DbPool) -> Self {
        Self {
            repo: Arc::new(UserSubscriptionRepository::new(db.clone())),
            user_repo: Arc::new(UserRepository::new(db)),
        }
    }

    /// ユーザーの契約一覧（ステータス順）
    pub async fn list_for_user(
        &self,
        user_id: i64,
        status: StatusFilter,
    ) -> AppResult<Vec<UserSubscriptionDetails>> {
        self.ensure_user(user_id).await?;
        let subscriptions = self
            .repo
            .find_by_user(user_id, status, SubscriptionOrder::Status)
            .await?;
        Ok(self.repo.load_details(subscriptions).await?)
    }

    /// メインページ: アクティブな契約を期限の近い順に
    pub async fn main_page(&self, user_id: i64) -> AppResult<Vec<UserSubscriptionDetails>> {
        self.ensure_user(user_id).await?;
        let subscriptions = self
            .repo
            .find_by_user(user_id, StatusFilter::Active, SubscriptionOrder::EndAsc)
            .await?;
        Ok(self.repo.load_details(subscriptions).await?)
    }

    /// 今後の支払い予定（期限の遠い順）
    pub async fn payments_plan(&self, user_id: i64) -> AppResult<Vec<UserSubscriptionDetails>> {
        self.ensure_user(user_id).await?;
        let subscriptions = self
            .repo
            .find_by_user(user_id, StatusFilter::All, SubscriptionOrder::EndDesc)
            .await?;
        Ok(self.repo.load_details(subscriptions).await?)
    }

    pub async fn get_for_service(
        &self,
        user_id: i64,
        service_id: i64,
    ) -> AppResult<UserSubscriptionDetails> {
        self.ensure_user(user_id).await?;
        let subscription = self
            .repo
            .find_by_user_and_service(user_id, service_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("User has no subscription for this service".to_string())
            })?;
        self.single_details(subscription).await
    }

    pub async fn get(&self, id: i64) -> AppResult<UserSubscriptionDetails> {
        let subscription = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User subscription not found".to_string()))?;
        self.single_details(subscription).await
    }

    /// 自動更新フラグを切り替える
    pub async fn set_renewal(&self, id: i64, renewal: bool) -> AppResult<UserSubscriptionDetails> {
        let subscription = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User subscription not found".to_string()))?;

        let updated = self.repo.set_renewal(subscription, renewal).await?;
        tracing::info!(
            user_subscription_id = updated.id,
            renewal,
            "Renewal flag updated"
        );
        self.single_details(updated).await
    }

    async fn single_details(
        &self,
        subscription: crate::domain::user_subscription_model::Model,
    ) -> AppResult<UserSubscriptionDetails> {
        self.repo
            .load_details(vec![subscription])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("User subscription not found".to_string()))
    }

    async fn ensure_user(&self, user_id: i64) -> AppResult<()> {
        if !self.user_repo.exists(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}
