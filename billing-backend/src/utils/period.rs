// src/utils/period.rs

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// `YYYY-MM-DD_YYYY-MM-DD` 形式の期間（両端の日を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    /// 終了日の翌日 0:00（この時刻は含まない）
    pub end_exclusive: DateTime<Utc>,
}

impl DateRange {
    pub fn parse(value: &str) -> AppResult<Self> {
        let (start_str, end_str) = value.split_once('_').ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid time period '{}': expected YYYY-MM-DD_YYYY-MM-DD",
                value
            ))
        })?;

        let start = parse_date(start_str)?;
        let end = parse_date(end_str)?;

        if start > end {
            return Err(AppError::BadRequest(format!(
                "Invalid time period '{}': start date is after end date",
                value
            )));
        }

        let next_day = end.checked_add_signed(Duration::days(1)).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid time period '{}': end date is out of range",
                value
            ))
        })?;

        Ok(Self {
            start: start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end_exclusive: next_day.and_time(chrono::NaiveTime::MIN).and_utc(),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end_exclusive
    }
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}': expected YYYY-MM-DD", value)))
}
