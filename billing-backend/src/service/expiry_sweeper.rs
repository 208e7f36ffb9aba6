// src/service/expiry_sweeper.rs

use crate::db::DbPool;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::user_subscription_repository::UserSubscriptionRepository;
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 1回のスイープ結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub expired: usize,
    pub failed: usize,
}

/// 期限切れのサブスクリプションを非アクティブにする
///
/// `renewal` フラグは参照しない。
#[derive(Clone)]
pub struct ExpirySweeper {
    repo: Arc<UserSubscriptionRepository>,
    clock: Arc<dyn Clock>,
}

impl ExpirySweeper {
    pub fn new(db: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo: Arc::new(UserSubscriptionRepository::new(db)),
            clock,
        }
    }

    /// `now` 時点で `end` を過ぎたアクティブな契約をすべて処理する
    ///
    /// 1件の更新失敗は WARN で記録して集計し、残りの処理を続ける。
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let candidates = self.repo.find_expired_active(now).await?;
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };

        for subscription in candidates {
            match self.repo.deactivate_if_expired(subscription.id, now).await {
                Ok(true) => {
                    report.expired += 1;
                    tracing::debug!(
                        user_subscription_id = subscription.id,
                        user_id = subscription.user_id,
                        end = %subscription.end,
                        "Subscription expired"
                    );
                }
                // 他のリクエストで更新済み
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    log_with_context!(
                        tracing::Level::WARN,
                        "Failed to expire subscription",
                        "user_subscription_id" => subscription.id,
                        "error" => e.to_string(),
                    );
                }
            }
        }

        Ok(report)
    }

    /// 現在時刻でスイープを1回実行
    pub async fn run_once(&self) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let report = self.sweep(now).await?;

        if report.scanned > 0 {
            log_with_context!(
                tracing::Level::INFO,
                "Expiry sweep finished",
                "scanned" => report.scanned,
                "expired" => report.expired,
                "failed" => report.failed,
            );
        }

        Ok(report)
    }

    /// バックグラウンドで定期実行する
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tracing::info!(interval_secs = interval.as_secs(), "Starting expiry sweeper");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            }
        })
    }
}
