// src/logging/mod.rs

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{field, Instrument};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// RUST_LOG が未設定の場合のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "billing_backend=info,tower_http=info";

#[macro_export]
macro_rules! log_with_context {
    ($level:expr, $msg:expr $(, $($key:literal => $value:expr),* $(,)?)?) => {
        match $level {
            tracing::Level::ERROR => {
                tracing::error!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::WARN => {
                tracing::warn!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::INFO => {
                tracing::info!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::DEBUG => {
                tracing::debug!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            _ => {}
        }
    };
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer())
        .init();
}

/// リクエスト単位のログ文脈
///
/// `/users/{user_id}/…` と `/accounts/{account_id}/…` のパスから
/// 課金主体のIDを拾い、リクエストのspanに載せる。
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub user_id: Option<i64>,
    pub account_id: Option<i64>,
}

impl RequestContext {
    pub fn from_request(req: &Request<Body>) -> Self {
        let path = req.uri().path().to_string();
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: req.method().to_string(),
            user_id: path_id(&path, "users"),
            account_id: path_id(&path, "accounts"),
            path,
        }
    }

    fn span(&self) -> tracing::Span {
        let span = tracing::info_span!(
            "request",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            user_id = field::Empty,
            account_id = field::Empty,
        );
        if let Some(user_id) = self.user_id {
            span.record("user_id", user_id);
        }
        if let Some(account_id) = self.account_id {
            span.record("account_id", account_id);
        }
        span
    }
}

/// `segment` の直後にある数値パスパラメータ
fn path_id(path: &str, segment: &str) -> Option<i64> {
    let parts: Vec<&str> = path.split('/').collect();
    parts
        .windows(2)
        .find(|pair| pair[0] == segment)
        .and_then(|pair| pair[1].parse().ok())
}

/// リクエスト処理全体をspanで包み、開始と完了を記録する
pub async fn request_logging_middleware(req: Request<Body>, next: Next) -> Response {
    let span = RequestContext::from_request(&req).span();

    async move {
        let start = Instant::now();
        tracing::info!("Request started");

        let response = next.run(req).await;
        let status = response.status().as_u16();

        log_with_context!(
            if status >= 500 { tracing::Level::ERROR }
            else if status >= 400 { tracing::Level::WARN }
            else { tracing::Level::INFO },
            "Request completed",
            "status" => status,
            "duration_ms" => start.elapsed().as_millis(),
        );

        response
    }
    .instrument(span)
    .await
}
