// src/api/mod.rs
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::logging::request_logging_middleware;
use crate::service::{
    account_service::AccountService, catalog_service::CatalogService,
    payment_service::PaymentService, subscription_lifecycle_service::SubscriptionLifecycleService,
    user_subscription_service::UserSubscriptionService,
};
use crate::utils::clock::Clock;
use axum::{http::Method, middleware, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod dto;
pub mod handlers;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub lifecycle_service: Arc<SubscriptionLifecycleService>,
    pub user_subscription_service: Arc<UserSubscriptionService>,
    pub payment_service: Arc<PaymentService>,
    pub catalog_service: Arc<CatalogService>,
    pub account_service: Arc<AccountService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle_service: Arc::new(SubscriptionLifecycleService::new(db.clone(), clock)),
            user_subscription_service: Arc::new(UserSubscriptionService::new(db.clone())),
            payment_service: Arc::new(PaymentService::new(db.clone())),
            catalog_service: Arc::new(CatalogService::new(db.clone())),
            account_service: Arc::new(AccountService::new(db)),
            config: Arc::new(config),
        }
    }
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// 全ルートをまとめたルーター
pub fn app_router(app_state: AppState) -> Router {
    let v1 = Router::new()
        .merge(handlers::user_subscription_handler::user_subscription_router(
            app_state.clone(),
        ))
        .merge(handlers::payment_handler::payment_router(app_state.clone()))
        .merge(handlers::catalog_handler::catalog_router(app_state.clone()))
        .merge(handlers::account_handler::account_router(app_state.clone()));

    Router::new()
        .nest("/v1", v1)
        .merge(handlers::system_handler::system_router(app_state))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
