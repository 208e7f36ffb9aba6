// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// ユーザー・口座関連マイグレーション
mod m20240601_000001_create_users_table;
mod m20240601_000002_create_accounts_table;

// サービスカタログ関連マイグレーション
mod m20240602_000001_create_catalog_tables;

// ユーザーサブスクリプション関連マイグレーション
mod m20240603_000001_create_user_subscriptions_table;

// 支払い関連マイグレーション
mod m20240604_000001_create_payments_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 基本テーブル作成（依存関係なし）
            Box::new(m20240601_000001_create_users_table::Migration),
            // 2. usersテーブルに依存
            Box::new(m20240601_000002_create_accounts_table::Migration),
            // 3. カタログ（categories → services → subscription_plans）
            Box::new(m20240602_000001_create_catalog_tables::Migration),
            // 4. users / subscription_plans に依存
            Box::new(m20240603_000001_create_user_subscriptions_table::Migration),
            // 5. 支払い記録
            Box::new(m20240604_000001_create_payments_tables::Migration),
        ]
    }
}
