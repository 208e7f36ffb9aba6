// src/utils/numbering.rs

//! 口座番号・レシート番号の採番
//!
//! 形式は `<prefix><6桁ゼロ埋め連番>`（例: `AN000001`, `R000042`）。

use crate::error::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DbBackend, Statement};

const SEQUENCE_WIDTH: usize = 6;

/// 採番処理ごとのアドバイザリロックキー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingLock {
    AccountNumber,
    Receipt,
}

impl NumberingLock {
    fn key(self) -> i64 {
        match self {
            NumberingLock::AccountNumber => 7_100_001,
            NumberingLock::Receipt => 7_100_002,
        }
    }
}

/// 直前の番号から次の番号を求める
pub fn next_number(prefix: &str, last: Option<&str>) -> AppResult<String> {
    let next = match last {
        None => 1,
        Some(last) => {
            let sequence = last
                .strip_prefix(prefix)
                .and_then(|digits| digits.parse::<u64>().ok())
                .ok_or_else(|| {
                    AppError::DataIntegrity(format!(
                        "Malformed sequence number '{}' (expected prefix '{}')",
                        last, prefix
                    ))
                })?;
            sequence + 1
        }
    };

    Ok(format!("{}{:0width$}", prefix, next, width = SEQUENCE_WIDTH))
}

/// トランザクション終了まで採番を直列化する
///
/// 必ずトランザクション内の接続で呼び出すこと。
pub async fn lock_numbering<C>(conn: &C, lock: NumberingLock) -> AppResult<()>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [lock.key().into()],
    ))
    .await?;
    Ok(())
}
