// src/api/dto/payment_dto.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::catalog_dto::ServiceSummaryDto;
use crate::domain::cashback_applied_model;
use crate::repository::payment_repository::PaymentDetails;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAccountDto {
    pub id: i64,
    pub account_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackAppliedDto {
    pub id: i64,
    pub amount: i64,
    pub applied_status: bool,
}

impl From<cashback_applied_model::Model> for CashbackAppliedDto {
    fn from(cashback: cashback_applied_model::Model) -> Self {
        Self {
            id: cashback.id,
            amount: cashback.amount,
            applied_status: cashback.applied_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub amount: i64,
    pub receipt: String,
    pub plan_id: i64,
    pub service: ServiceSummaryDto,
    pub account: PaymentAccountDto,
    pub cashback: Option<CashbackAppliedDto>,
}

impl From<PaymentDetails> for PaymentDto {
    fn from(details: PaymentDetails) -> Self {
        Self {
            id: details.payment.id,
            date: details.payment.date,
            amount: details.payment.amount,
            receipt: details.payment.receipt,
            plan_id: details.plan.id,
            service: ServiceSummaryDto::from(&details.service),
            account: PaymentAccountDto {
                id: details.account.id,
                account_number: details.account.account_number,
            },
            cashback: details.cashback.map(CashbackAppliedDto::from),
        }
    }
}
