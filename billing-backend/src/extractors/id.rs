// src/extractors/id.rs

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// 正の整数IDかを検証する
pub fn parse_id(name: &str, value: &str) -> Result<i64, AppError> {
    match value.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::ValidationErrors(vec![format!(
            "{}: must be a positive integer, got '{}'",
            name, value
        )])),
    }
}

/// 単一のIDパスパラメータ
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::ValidationErrors(vec!["Invalid path parameter".to_string()]))?;

        Ok(IdPath(parse_id("id", &value)?))
    }
}

/// 複数パスパラメータ用のExtractor
#[derive(Debug)]
pub struct ValidatedMultiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedMultiPath<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::ValidationErrors(vec![format!("Invalid path parameters: {}", e)])
            })?;

        Ok(ValidatedMultiPath(value))
    }
}
