//! History service
//!
//! Read-only views over one user's daily aggregates. Results are sparse: days
//! without an aggregate are simply missing.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::app::local_date::UserZone;
use crate::domain::entities::{DailySteps, User};
use crate::domain::ports::DailyStepsRepository;
use crate::error::AppError;

/// Service for per-user step history
pub struct HistoryService<DR>
where
    DR: DailyStepsRepository,
{
    daily: Arc<DR>,
}

impl<DR> HistoryService<DR>
where
    DR: DailyStepsRepository,
{
    pub fn new(daily: Arc<DR>) -> Self {
        Self { daily }
    }

    /// Aggregates in `[from, to]`, both bounds required and inclusive.
    /// Reversed bounds describe an empty range and yield no rows.
    pub async fn daily(
        &self,
        user: &User,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailySteps>, AppError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(AppError::InvalidRange(
                "both from and to are required".to_string(),
            ));
        };
        if from > to {
            return Ok(Vec::new());
        }

        let mut rows = self.daily.find_range(&user.id, from, to).await?;
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    /// The last `days` local dates up to and including today
    pub async fn history(&self, user: &User, days: i64) -> Result<Vec<DailySteps>, AppError> {
        self.history_at(user, days, Utc::now()).await
    }

    /// Same as [`history`](Self::history) with an explicit clock
    pub async fn history_at(
        &self,
        user: &User,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailySteps>, AppError> {
        if days <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "days must be positive, got {}",
                days
            )));
        }

        let to = UserZone::parse(user.timezone.as_deref()).today(now);
        let from = to
            .checked_sub_days(Days::new((days - 1) as u64))
            .ok_or_else(|| AppError::InvalidArgument(format!("days out of range: {}", days)))?;

        self.daily(user, Some(from), Some(to)).await
    }
}
