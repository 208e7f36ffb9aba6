// src/api/handlers/catalog_handler.rs

use crate::api::dto::catalog_dto::{AvailableServiceDto, RulesDto};
use crate::api::AppState;
use crate::error::AppResult;
use axum::{extract::State, routing::get, Json, Router};

/// サービスごとの最安プラン一覧
pub async fn available_services_handler(
    State(app_state): State<AppState>,
) -> AppResult<Json<Vec<AvailableServiceDto>>> {
    let services = app_state.catalog_service.available_services().await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// 最新のサービス規約
pub async fn rules_handler(State(app_state): State<AppState>) -> AppResult<Json<RulesDto>> {
    let document = app_state.payment_service.rules().await?;
    Ok(Json(document.into()))
}

pub fn catalog_router(app_state: AppState) -> Router {
    Router::new()
        .route("/services/available", get(available_services_handler))
        .route("/rules", get(rules_handler))
        .with_state(app_state)
}
