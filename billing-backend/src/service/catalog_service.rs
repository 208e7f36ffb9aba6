// src/service/catalog_service.rs

use crate::db::DbPool;
use crate::error::AppResult;
use crate::repository::catalog_repository::{AvailableServicePlan, CatalogRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<CatalogRepository>,
}

impl CatalogService {
    pub fn new(db: DbPool) -> Self {
        Self {
            repo: Arc::new(CatalogRepository::new(db)),
        }
    }

    /// 購入可能なサービスと最安プラン
    pub async fn available_services(&self) -> AppResult<Vec<AvailableServicePlan>> {
        Ok(self.repo.find_available_services().await?)
    }
}
