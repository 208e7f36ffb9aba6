// src/service/account_service.rs

use crate::db::DbPool;
use crate::domain::account_model;
use crate::error::{AppError, AppResult};
use crate::repository::account_repository::{AccountRepository, CreateAccount};
use crate::repository::user_repository::UserRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<AccountRepository>,
    user_repo: Arc<UserRepository>,
}

impl AccountService {
    pub fn new(db: DbPool) -> Self {
        Self {
            repo: Arc::new(AccountRepository::new(db.clone())),
            user_repo: Arc::new(UserRepository::new(db)),
        }
    }

    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<account_model::Model>> {
        self.ensure_user(user_id).await?;
        Ok(self.repo.find_by_user_id(user_id).await?)
    }

    /// 残高0の口座を開設する
    pub async fn open_account(
        &self,
        user_id: i64,
        account_status: Option<String>,
    ) -> AppResult<account_model::Model> {
        self.ensure_user(user_id).await?;

        let account = self
            .repo
            .create(CreateAccount {
                user_id,
                balance: 0,
                account_status,
            })
            .await?;

        tracing::info!(
            user_id,
            account_id = account.id,
            account_number = %account.account_number,
            "Account opened"
        );
        Ok(account)
    }

    /// 口座ステータス（連携フラグ）を変更する
    ///
    /// 他ユーザーの口座は存在しないものとして扱う。
    pub async fn update_status(
        &self,
        user_id: i64,
        account_id: i64,
        account_status: String,
    ) -> AppResult<account_model::Model> {
        self.ensure_user(user_id).await?;

        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .filter(|account| account.is_owned_by(user_id))
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let previous = account.account_status.clone();
        let account = self.repo.set_status(account, account_status).await?;

        tracing::info!(
            user_id,
            account_id,
            from = %previous,
            to = %account.account_status,
            "Account status updated"
        );
        Ok(account)
    }

    async fn ensure_user(&self, user_id: i64) -> AppResult<()> {
        if !self.user_repo.exists(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}
