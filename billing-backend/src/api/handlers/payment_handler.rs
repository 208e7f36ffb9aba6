// src/api/handlers/payment_handler.rs

use crate::api::dto::payment_dto::PaymentDto;
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::{IdPath, ValidatedMultiPath};
use crate::repository::payment_repository::PaymentDetails;
use axum::{extract::State, routing::get, Json, Router};

fn to_dtos(payments: Vec<PaymentDetails>) -> Json<Vec<PaymentDto>> {
    Json(payments.into_iter().map(PaymentDto::from).collect())
}

pub async fn list_user_payments_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<PaymentDto>>> {
    let payments = app_state.payment_service.list_for_user(user_id).await?;
    Ok(to_dtos(payments))
}

pub async fn list_service_payments_handler(
    State(app_state): State<AppState>,
    ValidatedMultiPath((user_id, service_id)): ValidatedMultiPath<(i64, i64)>,
) -> AppResult<Json<Vec<PaymentDto>>> {
    let payments = app_state
        .payment_service
        .list_for_user_and_service(user_id, service_id)
        .await?;
    Ok(to_dtos(payments))
}

/// 期間指定（`YYYY-MM-DD_YYYY-MM-DD`）の支払い履歴
pub async fn list_period_payments_handler(
    State(app_state): State<AppState>,
    ValidatedMultiPath((user_id, period)): ValidatedMultiPath<(i64, String)>,
) -> AppResult<Json<Vec<PaymentDto>>> {
    let payments = app_state
        .payment_service
        .list_for_user_in_period(user_id, &period)
        .await?;
    Ok(to_dtos(payments))
}

pub async fn list_account_payments_handler(
    State(app_state): State<AppState>,
    IdPath(account_id): IdPath,
) -> AppResult<Json<Vec<PaymentDto>>> {
    let payments = app_state.payment_service.list_for_account(account_id).await?;
    Ok(to_dtos(payments))
}

pub async fn get_payment_handler(
    State(app_state): State<AppState>,
    IdPath(payment_id): IdPath,
) -> AppResult<Json<PaymentDto>> {
    let payment = app_state.payment_service.get(payment_id).await?;
    Ok(Json(payment.into()))
}

// --- ルーター ---

pub fn payment_router(app_state: AppState) -> Router {
    Router::new()
        .route("/users/{user_id}/payments", get(list_user_payments_handler))
        .route(
            "/users/{user_id}/services/{service_id}/payment_history",
            get(list_service_payments_handler),
        )
        .route(
            "/users/{user_id}/payment_history/{period}",
            get(list_period_payments_handler),
        )
        .route(
            "/accounts/{account_id}/payment_history",
            get(list_account_payments_handler),
        )
        .route("/payments/{payment_id}", get(get_payment_handler))
        .with_state(app_state)
}
