// src/repository/user_repository.rs

use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbConn, DbErr, QuerySelect, Set};

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbErr> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    pub async fn create(&self, create_user: CreateUser) -> Result<user_model::Model, DbErr> {
        let new_user = UserActiveModel {
            phone: Set(create_user.phone),
            email: Set(create_user.email.to_lowercase()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        new_user.insert(&self.db).await
    }

    /// ユーザー行を `FOR UPDATE` でロックして取得
    ///
    /// 同一ユーザーの購入処理はこのロックで直列化される。
    pub async fn lock_by_id<C>(conn: &C, id: i64) -> Result<Option<user_model::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        UserEntity::find_by_id(id).lock_exclusive().one(conn).await
    }
}

/// ユーザー作成用構造体
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub phone: String,
    pub email: String,
}
