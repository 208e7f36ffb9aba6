// migration/src/main.rs

use migration::Migrator;
use sea_orm_migration::prelude::*;

// migration/Cargo.toml で async-std を依存関係に入れているので、それを使用
#[async_std::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
