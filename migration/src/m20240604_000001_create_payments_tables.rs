use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // documents テーブル（サービス利用規約）
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::Name).string_len(30).not_null())
                    .col(ColumnDef::new(Documents::Text).text().not_null())
                    .to_owned(),
            )
            .await?;

        // cashback_applied テーブル
        manager
            .create_table(
                Table::create()
                    .table(CashbackApplied::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashbackApplied::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashbackApplied::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashbackApplied::AppliedStatus)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // payments テーブル
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Payments::Receipt)
                            .string_len(500)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::DocumentId).big_integer().null())
                    .col(
                        ColumnDef::new(Payments::CashbackAppliedId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PlanId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::AccountId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_document_id")
                            .from(Payments::Table, Payments::DocumentId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_cashback_applied_id")
                            .from(Payments::Table, Payments::CashbackAppliedId)
                            .to(CashbackApplied::Table, CashbackApplied::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_plan_id")
                            .from(Payments::Table, Payments::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_account_id")
                            .from(Payments::Table, Payments::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 口座ごとの支払い履歴を時系列で取得
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Payments::Table)
                    .name("idx_payments_account_date")
                    .col(Payments::AccountId)
                    .col(Payments::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .table(Payments::Table)
                    .name("idx_payments_account_date")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CashbackApplied::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    Name,
    Text,
}

#[derive(DeriveIden)]
enum CashbackApplied {
    Table,
    Id,
    Amount,
    AppliedStatus,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    Amount,
    Date,
    Receipt,
    DocumentId,
    CashbackAppliedId,
    PlanId,
    AccountId,
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
}
