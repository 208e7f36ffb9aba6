// src/extractors/json.rs

use crate::error::AppError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSONボディを読み取り、`validator` で検証する
///
/// デシリアライズ失敗も 400 の `ValidationErrors` として返す。
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::warn!(error = %rejection.body_text(), "Request body rejected");
                AppError::ValidationErrors(vec![format!("body: {}", rejection.body_text())])
            })?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
