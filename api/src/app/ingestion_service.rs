//! Step ingestion service
//!
//! Turns an upload batch into stored samples and daily totals. Every sample is
//! judged on its own: a malformed or duplicate entry is counted as skipped and
//! never fails the batch. Only an empty batch or an unknown provider rejects
//! the whole call, and both are checked before anything is written. The
//! accepted samples and their totals are committed together through the
//! `StepLedger`, so a storage failure leaves nothing behind to block a retry.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::app::local_date::UserZone;
use crate::app::steps_config::MAX_SAMPLE_STEPS;
use crate::domain::entities::{
    DatedSample, InsertOutcome, NewStepSample, Provider, SampleInput, User,
};
use crate::domain::ports::{StepLedger, StepSampleRepository};
use crate::error::AppError;

/// Result of one upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub accepted: u32,
    pub skipped: u32,
    /// Steps added per local date by this call (deltas, not resulting totals)
    pub per_date: BTreeMap<NaiveDate, i64>,
}

/// Why a sample was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSteps,
    NegativeSteps,
    TooManySteps,
    MissingTimestamp,
    InvertedRange,
    TooFarInFuture,
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingSteps => write!(f, "missing steps"),
            SkipReason::NegativeSteps => write!(f, "negative steps"),
            SkipReason::TooManySteps => write!(f, "too many steps"),
            SkipReason::MissingTimestamp => write!(f, "missing timestamp"),
            SkipReason::InvertedRange => write!(f, "inverted range"),
            SkipReason::TooFarInFuture => write!(f, "too far in future"),
            SkipReason::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// A sample that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValidSample {
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    steps: i64,
}

/// Service for ingesting step samples
pub struct IngestionService<SR, L>
where
    SR: StepSampleRepository,
    L: StepLedger,
{
    samples: Arc<SR>,
    ledger: Arc<L>,
    max_future_skew: Duration,
}

impl<SR, L> IngestionService<SR, L>
where
    SR: StepSampleRepository,
    L: StepLedger,
{
    pub fn new(samples: Arc<SR>, ledger: Arc<L>, max_future_skew: Duration) -> Self {
        Self {
            samples,
            ledger,
            max_future_skew,
        }
    }

    /// Ingest a batch for `user`, stamped with the current time
    pub async fn ingest(
        &self,
        user: &User,
        provider: &str,
        samples: &[SampleInput],
    ) -> Result<UploadSummary, AppError> {
        self.ingest_at(user, provider, samples, Utc::now()).await
    }

    /// Ingest a batch as if it was received at `received_at`
    pub async fn ingest_at(
        &self,
        user: &User,
        provider: &str,
        samples: &[SampleInput],
        received_at: DateTime<Utc>,
    ) -> Result<UploadSummary, AppError> {
        if samples.is_empty() {
            return Err(AppError::EmptyPayload);
        }
        let provider: Provider = provider
            .parse()
            .map_err(|_| AppError::UnknownProvider(provider.to_string()))?;

        let zone = UserZone::parse(user.timezone.as_deref());
        let mut summary = UploadSummary::default();
        let mut batch = Vec::new();
        let mut positions = Vec::new();
        let mut planned = BTreeMap::new();

        for (index, input) in samples.iter().enumerate() {
            match self
                .prepare(user, provider, input, received_at, zone)
                .await?
            {
                Ok(dated) => {
                    add_steps(&mut planned, dated.local_date, dated.sample.steps)?;
                    positions.push(index);
                    batch.push(dated);
                }
                Err(reason) => {
                    summary.skipped += 1;
                    log_skip(user, provider, index, input, reason);
                }
            }
        }

        let outcomes = if batch.is_empty() {
            Vec::new()
        } else {
            self.ledger.record(&batch).await?
        };

        // Inserted steps are a subset of `planned`, which already fit
        for ((index, dated), outcome) in positions.iter().zip(&batch).zip(outcomes) {
            match outcome {
                InsertOutcome::Inserted(_) => {
                    summary.accepted += 1;
                    *summary.per_date.entry(dated.local_date).or_insert(0) += dated.sample.steps;
                }
                InsertOutcome::Duplicate => {
                    // A concurrent retry can pass the existence check too;
                    // the unique constraint decides and the loser is a duplicate
                    summary.skipped += 1;
                    log_skip(user, provider, *index, &samples[*index], SkipReason::Duplicate);
                }
            }
        }

        tracing::info!(
            user_id = %user.id,
            %provider,
            accepted = summary.accepted,
            skipped = summary.skipped,
            dates = summary.per_date.len(),
            "Ingested step samples"
        );

        Ok(summary)
    }

    /// Validate one sample, drop known duplicates and date it in the user's
    /// zone.
    ///
    /// The outer `Result` carries storage failures, the inner one the
    /// keep/skip decision.
    async fn prepare(
        &self,
        user: &User,
        provider: Provider,
        input: &SampleInput,
        received_at: DateTime<Utc>,
        zone: UserZone,
    ) -> Result<Result<DatedSample, SkipReason>, AppError> {
        let valid = match validate_sample(input, received_at, self.max_future_skew) {
            Ok(valid) => valid,
            Err(reason) => return Ok(Err(reason)),
        };

        let external_id = input.dedup_key();
        if let Some(external_id) = external_id {
            if self.samples.exists(&user.id, provider, external_id).await? {
                return Ok(Err(SkipReason::Duplicate));
            }
        }

        Ok(Ok(DatedSample {
            sample: NewStepSample {
                user_id: user.id,
                provider,
                external_id: external_id.map(String::from),
                started_at: valid.started_at,
                ended_at: valid.ended_at,
                steps: valid.steps,
                source: input.source.clone(),
                received_at,
            },
            local_date: zone.local_date(valid.started_at),
        }))
    }
}

fn log_skip(user: &User, provider: Provider, index: usize, input: &SampleInput, reason: SkipReason) {
    tracing::debug!(
        user_id = %user.id,
        %provider,
        index,
        external_id = input.dedup_key(),
        %reason,
        "Skipped step sample"
    );
}

/// Add `steps` to the running delta for `date`, refusing to wrap
fn add_steps(
    deltas: &mut BTreeMap<NaiveDate, i64>,
    date: NaiveDate,
    steps: i64,
) -> Result<(), AppError> {
    let delta = deltas.entry(date).or_insert(0);
    *delta = delta
        .checked_add(steps)
        .ok_or_else(|| AppError::InvalidArgument(format!("step total for {} overflows", date)))?;
    Ok(())
}

/// Per-sample checks that need no storage access
fn validate_sample(
    input: &SampleInput,
    received_at: DateTime<Utc>,
    max_future_skew: Duration,
) -> Result<ValidSample, SkipReason> {
    let steps = input.steps.ok_or(SkipReason::MissingSteps)?;
    if steps < 0 {
        return Err(SkipReason::NegativeSteps);
    }
    if steps > MAX_SAMPLE_STEPS {
        return Err(SkipReason::TooManySteps);
    }

    let (Some(started_at), Some(ended_at)) = (input.started_at, input.ended_at) else {
        return Err(SkipReason::MissingTimestamp);
    };
    if started_at > ended_at {
        return Err(SkipReason::InvertedRange);
    }
    if ended_at > received_at + max_future_skew {
        return Err(SkipReason::TooFarInFuture);
    }

    Ok(ValidSample {
        started_at,
        ended_at,
        steps,
    })
}
