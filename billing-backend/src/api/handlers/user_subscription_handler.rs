// src/api/handlers/user_subscription_handler.rs

use crate::api::dto::user_subscription_dto::{
    MainPageItemDto, PaymentPlanItemDto, PurchaseSubscriptionRequest, UpdateRenewalRequest,
    UserSubscriptionDto,
};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::{IdPath, ValidatedJson, ValidatedMultiPath};
use crate::repository::user_subscription_repository::StatusFilter;
use crate::service::subscription_lifecycle_service::PurchaseRequest;
use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::info;

// --- Handler Functions ---

/// プランの購入（新規・更新・プラン変更）
pub async fn purchase_subscription_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
    ValidatedJson(payload): ValidatedJson<PurchaseSubscriptionRequest>,
) -> AppResult<Json<UserSubscriptionDto>> {
    info!(
        user_id,
        plan_id = payload.subscription_id,
        account_id = payload.account_id,
        "Purchase requested"
    );

    let details = app_state
        .lifecycle_service
        .purchase(PurchaseRequest {
            user_id,
            plan_id: payload.subscription_id,
            account_id: payload.account_id,
        })
        .await?;

    Ok(Json(details.into()))
}

async fn list_with_status(
    app_state: &AppState,
    user_id: i64,
    status: StatusFilter,
) -> AppResult<Json<Vec<UserSubscriptionDto>>> {
    let subscriptions = app_state
        .user_subscription_service
        .list_for_user(user_id, status)
        .await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

pub async fn list_user_subscriptions_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<UserSubscriptionDto>>> {
    list_with_status(&app_state, user_id, StatusFilter::All).await
}

pub async fn list_active_subscriptions_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<UserSubscriptionDto>>> {
    list_with_status(&app_state, user_id, StatusFilter::Active).await
}

pub async fn list_inactive_subscriptions_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<UserSubscriptionDto>>> {
    list_with_status(&app_state, user_id, StatusFilter::Inactive).await
}

pub async fn get_subscription_for_service_handler(
    State(app_state): State<AppState>,
    ValidatedMultiPath((user_id, service_id)): ValidatedMultiPath<(i64, i64)>,
) -> AppResult<Json<UserSubscriptionDto>> {
    let details = app_state
        .user_subscription_service
        .get_for_service(user_id, service_id)
        .await?;
    Ok(Json(details.into()))
}

pub async fn main_page_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<MainPageItemDto>>> {
    let subscriptions = app_state.user_subscription_service.main_page(user_id).await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

pub async fn payments_plan_handler(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<Json<Vec<PaymentPlanItemDto>>> {
    let subscriptions = app_state
        .user_subscription_service
        .payments_plan(user_id)
        .await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

pub async fn get_user_subscription_handler(
    State(app_state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<UserSubscriptionDto>> {
    let details = app_state.user_subscription_service.get(id).await?;
    Ok(Json(details.into()))
}

pub async fn update_renewal_handler(
    State(app_state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateRenewalRequest>,
) -> AppResult<Json<UserSubscriptionDto>> {
    let details = app_state
        .user_subscription_service
        .set_renewal(id, payload.renewal)
        .await?;
    Ok(Json(details.into()))
}

// --- ルーター ---

pub fn user_subscription_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/subscriptions",
            get(list_user_subscriptions_handler).post(purchase_subscription_handler),
        )
        .route(
            "/users/{user_id}/subscriptions/active",
            get(list_active_subscriptions_handler),
        )
        .route(
            "/users/{user_id}/subscriptions/inactive",
            get(list_inactive_subscriptions_handler),
        )
        .route(
            "/users/{user_id}/services/{service_id}/subscription",
            get(get_subscription_for_service_handler),
        )
        .route("/users/{user_id}/main_page", get(main_page_handler))
        .route("/users/{user_id}/payments_plan", get(payments_plan_handler))
        .route("/user_subscriptions/{id}", get(get_user_subscription_handler))
        .route(
            "/user_subscriptions/{id}/renewal",
            patch(update_renewal_handler),
        )
        .with_state(app_state)
}
