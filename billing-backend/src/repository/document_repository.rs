// src/repository/document_repository.rs

use crate::domain::document_model::{
    self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity,
};
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbConn, DbErr, QueryOrder, Set};

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DbConn,
}

impl DocumentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// 最新の規約を取得
    pub async fn find_latest(&self) -> Result<Option<document_model::Model>, DbErr> {
        Self::latest(&self.db).await
    }

    pub async fn create(&self, name: &str, text: &str) -> Result<document_model::Model, DbErr> {
        let new_document = DocumentActiveModel {
            name: Set(name.to_string()),
            text: Set(text.to_string()),
            ..Default::default()
        };

        new_document.insert(&self.db).await
    }

    pub async fn latest<C>(conn: &C) -> Result<Option<document_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        DocumentEntity::find()
            .order_by_desc(document_model::Column::Id)
            .one(conn)
            .await
    }
}
