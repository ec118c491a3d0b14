//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::{
    DailySteps, DatedSample, InsertOutcome, NewStepSample, Provider, UserId,
};
use crate::error::DomainError;

/// Repository for raw step samples
///
/// Append-only. `(user, provider, external_id)` is unique whenever the
/// external id is present.
#[async_trait]
pub trait StepSampleRepository: Send + Sync {
    /// Check whether a sample with this external id was already accepted
    async fn exists(
        &self,
        user_id: &UserId,
        provider: Provider,
        external_id: &str,
    ) -> Result<bool, DomainError>;

    /// Persist a single sample outside any upload.
    ///
    /// A uniqueness conflict on the external id is reported as
    /// `InsertOutcome::Duplicate`, never as an error. Uploads go through
    /// `StepLedger::record`, which runs the same insert inside its transaction.
    async fn insert(&self, sample: &NewStepSample) -> Result<InsertOutcome, DomainError>;
}

/// Repository for per-user per-day step totals
#[async_trait]
pub trait DailyStepsRepository: Send + Sync {
    /// Get the aggregate for one user and date.
    ///
    /// Part of the store contract for readers outside the step services
    /// (admin tooling, adapter tests); the services themselves read ranges
    /// and top-N lists.
    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailySteps>, DomainError>;

    /// Atomically add `delta` to the total for (user, date), creating the
    /// row with `delta` as its total if it does not exist yet.
    ///
    /// Concurrent callers on the same key must never lose an update. Uploads
    /// apply the same statement through `StepLedger::record`.
    async fn upsert_add(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<DailySteps, DomainError>;

    /// Aggregates for one user in `[from, to]`, ascending by date
    async fn find_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySteps>, DomainError>;

    /// Highest totals on `date` among `user_ids`, descending, at most `limit`.
    /// Equal totals are ordered by user id ascending.
    async fn find_top(
        &self,
        date: NaiveDate,
        user_ids: &[UserId],
        limit: u64,
    ) -> Result<Vec<DailySteps>, DomainError>;
}

/// Write path for one upload
///
/// Sample inserts and the matching total increments commit together, so a
/// failure leaves neither behind and a retry of the same upload lands in full.
#[async_trait]
pub trait StepLedger: Send + Sync {
    /// Insert every sample and add the steps of the newly inserted ones to
    /// their owner's total for `local_date`, in one transaction.
    ///
    /// Returns one outcome per sample, in input order. A sample whose external
    /// id is already stored (or appears earlier in `samples`) is a
    /// `Duplicate` and contributes nothing. On error nothing is persisted.
    async fn record(&self, samples: &[DatedSample]) -> Result<Vec<InsertOutcome>, DomainError>;
}
