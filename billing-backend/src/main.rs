// src/main.rs
use billing_backend::api::{app_router, AppState};
use billing_backend::config::Config;
use billing_backend::db::create_db_pool;
use billing_backend::logging::init_tracing;
use billing_backend::service::expiry_sweeper::ExpirySweeper;
use billing_backend::utils::clock::{Clock, SystemClock};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    init_tracing();

    tracing::info!("Starting billing backend server...");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.server_addr(),
        sweeper_enabled = app_config.sweeper.enabled,
        "Configuration loaded"
    );

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    if app_config.run_migrations {
        Migrator::up(&db_pool, None).await?;
        tracing::info!("Database migrations applied.");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 期限切れスイーパーはリクエスト処理とは独立して動く
    let sweeper_handle = if app_config.sweeper.enabled {
        let sweeper = ExpirySweeper::new(db_pool.clone(), clock.clone());
        Some(sweeper.spawn(app_config.sweeper.interval))
    } else {
        tracing::info!("Expiry sweeper disabled");
        None
    };

    let server_addr = app_config.server_addr();
    let app_state = AppState::new(db_pool, app_config, clock);
    let app_router = app_router(app_state);

    // サーバーの起動
    tracing::info!("Router configured. Server listening on {}", server_addr);

    let listener = TcpListener::bind(&server_addr).await?;
    axum::serve(listener, app_router.into_make_service()).await?;

    if let Some(handle) = sweeper_handle {
        handle.abort();
    }

    Ok(())
}
