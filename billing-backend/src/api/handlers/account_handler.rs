// src/api/handlers/account_handler.rs

use crate::api::dto::account_dto::{AccountDto, OpenAccountRequest, UpdateAccountStatusRequest};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::{IdPath, ValidatedJson, ValidatedMultiPath};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

pub async fn list_accounts_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<AccountDto>>> {
    let accounts = app_state.account_service.list_for_user(user_id).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// 口座開設（残高0、口座番号は自動採番）
pub async fn open_account_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
    ValidatedJson(payload): ValidatedJson<OpenAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountDto>)> {
    let account = app_state
        .account_service
        .open_account(user_id, payload.account_status)
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn update_account_status_handler(
    State(app_state): State<AppState>,
    ValidatedMultiPath((user_id, account_id)): ValidatedMultiPath<(i64, i64)>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountStatusRequest>,
) -> AppResult<Json<AccountDto>> {
    let account = app_state
        .account_service
        .update_status(user_id, account_id, payload.account_status)
        .await?;
    Ok(Json(account.into()))
}

pub fn account_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/accounts",
            get(list_accounts_handler).post(open_account_handler),
        )
        .route(
            "/users/{user_id}/accounts/{account_id}",
            patch(update_account_status_handler),
        )
        .with_state(app_state)
}
