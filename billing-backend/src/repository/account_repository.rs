// src/repository/account_repository.rs

use crate::domain::account_model::{
    self, ActiveModel as AccountActiveModel, Entity as AccountEntity, ACCOUNT_NUMBER_PREFIX,
};
use crate::error::AppResult;
use crate::utils::numbering::{lock_numbering, next_number, NumberingLock};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::{
    ConnectionTrait, DbConn, DbErr, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub const DEFAULT_ACCOUNT_STATUS: &str = "linked";

#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DbConn,
}

impl AccountRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<account_model::Model>, DbErr> {
        AccountEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<account_model::Model>, DbErr> {
        AccountEntity::find()
            .filter(account_model::Column::UserId.eq(user_id))
            .order_by_asc(account_model::Column::Id)
            .all(&self.db)
            .await
    }

    /// 口座を開設する（口座番号は自動採番）
    pub async fn create(&self, create_account: CreateAccount) -> AppResult<account_model::Model> {
        let txn = self.db.begin().await?;

        lock_numbering(&txn, NumberingLock::AccountNumber).await?;
        let last = AccountEntity::find()
            .order_by_desc(account_model::Column::Id)
            .one(&txn)
            .await?;
        let account_number = next_number(
            ACCOUNT_NUMBER_PREFIX,
            last.as_ref().map(|a| a.account_number.as_str()),
        )?;

        let new_account = AccountActiveModel {
            user_id: Set(create_account.user_id),
            balance: Set(create_account.balance),
            account_number: Set(account_number),
            account_status: Set(create_account
                .account_status
                .unwrap_or_else(|| DEFAULT_ACCOUNT_STATUS.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let account = new_account.insert(&txn).await?;
        txn.commit().await?;

        Ok(account)
    }

    pub async fn set_status(
        &self,
        account: account_model::Model,
        account_status: String,
    ) -> Result<account_model::Model, DbErr> {
        let mut active_model: AccountActiveModel = account.into();
        active_model.account_status = Set(account_status);
        active_model.update(&self.db).await
    }

    // --- トランザクション内で使用する操作 ---

    /// 口座行を `FOR UPDATE` でロックして取得
    pub async fn lock_by_id<C>(conn: &C, id: i64) -> Result<Option<account_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        AccountEntity::find_by_id(id).lock_exclusive().one(conn).await
    }

    pub async fn update_balance<C>(
        conn: &C,
        account: account_model::Model,
        new_balance: i64,
    ) -> Result<account_model::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model: AccountActiveModel = account.into();
        active_model.balance = Set(new_balance);
        active_model.update(conn).await
    }
}

/// 口座作成用構造体
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub user_id: i64,
    pub balance: i64,
    pub account_status: Option<String>,
}
