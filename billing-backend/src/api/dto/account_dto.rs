// src/api/dto/account_dto.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::account_model;

// --- Request DTOs ---

/// 口座開設リクエスト
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct OpenAccountRequest {
    #[validate(length(
        min = 1,
        max = 32,
        message = "account_status must be between 1 and 32 characters"
    ))]
    pub account_status: Option<String>,
}

/// 口座ステータス変更リクエスト
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateAccountStatusRequest {
    #[validate(length(
        min = 1,
        max = 32,
        message = "account_status must be between 1 and 32 characters"
    ))]
    pub account_status: String,
}

// --- Response DTOs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: i64,
    pub account_number: String,
    pub account_status: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl From<account_model::Model> for AccountDto {
    fn from(account: account_model::Model) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number,
            account_status: account.account_status,
            balance: account.balance,
            created_at: account.created_at,
        }
    }
}
