// src/service/payment_service.rs

use crate::db::DbPool;
use crate::domain::document_model;
use crate::error::{AppError, AppResult};
use crate::repository::account_repository::AccountRepository;
use crate::repository::document_repository::DocumentRepository;
use crate::repository::payment_repository::{PaymentDetails, PaymentFilter, PaymentRepository};
use crate::utils::period::DateRange;
use std::sync::Arc;

#[derive(Clone)]
pub struct PaymentService {
    repo: Arc<PaymentRepository>,
    account_repo: Arc<AccountRepository>,
    document_repo: Arc<DocumentRepository>,
}

impl PaymentService {
    pub fn new(db: DbPool) -> Self {
        Self {
            repo: Arc::new(PaymentRepository::new(db.clone())),
            account_repo: Arc::new(AccountRepository::new(db.clone())),
            document_repo: Arc::new(DocumentRepository::new(db)),
        }
    }

    /// ユーザーの全口座の支払い履歴
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<PaymentDetails>> {
        self.list_with_filter(user_id, PaymentFilter::default())
            .await
    }

    pub async fn list_for_user_and_service(
        &self,
        user_id: i64,
        service_id: i64,
    ) -> AppResult<Vec<PaymentDetails>> {
        self.list_with_filter(
            user_id,
            PaymentFilter {
                service_id: Some(service_id),
                ..Default::default()
            },
        )
        .await
    }

    /// `YYYY-MM-DD_YYYY-MM-DD` の期間内の支払い（両端の日を含む）
    pub async fn list_for_user_in_period(
        &self,
        user_id: i64,
        period: &str,
    ) -> AppResult<Vec<PaymentDetails>> {
        let period = DateRange::parse(period)?;
        self.list_with_filter(
            user_id,
            PaymentFilter {
                period: Some(period),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn list_for_account(&self, account_id: i64) -> AppResult<Vec<PaymentDetails>> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let payments = self.repo.find_by_account_id(account.id).await?;
        Ok(self.repo.load_details(payments).await?)
    }

    pub async fn get(&self, payment_id: i64) -> AppResult<PaymentDetails> {
        let payment = self
            .repo
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        self.repo
            .load_details(vec![payment])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    /// 最新のサービス規約
    pub async fn rules(&self) -> AppResult<document_model::Model> {
        self.document_repo
            .find_latest()
            .await?
            .ok_or_else(|| AppError::NotFound("Rules document not found".to_string()))
    }

    async fn list_with_filter(
        &self,
        user_id: i64,
        filter: PaymentFilter,
    ) -> AppResult<Vec<PaymentDetails>> {
        let accounts = self.account_repo.find_by_user_id(user_id).await?;
        if accounts.is_empty() {
            return Err(AppError::NotFound("User has no accounts".to_string()));
        }

        let account_ids = accounts.iter().map(|a| a.id).collect();
        let payments = self.repo.find_by_account_ids(account_ids, filter).await?;
        Ok(self.repo.load_details(payments).await?)
    }
}
