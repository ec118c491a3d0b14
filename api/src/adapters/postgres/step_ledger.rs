//! PostgreSQL adapter for StepLedger

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::daily_steps_repo::upsert_daily;
use super::step_sample_repo::insert_sample;
use crate::domain::entities::{DatedSample, InsertOutcome, UserId};
use crate::domain::ports::StepLedger;
use crate::error::DomainError;

/// Runs an upload's sample inserts and total increments in one transaction
pub struct PostgresStepLedger {
    db: DatabaseConnection,
}

impl PostgresStepLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StepLedger for PostgresStepLedger {
    async fn record(&self, samples: &[DatedSample]) -> Result<Vec<InsertOutcome>, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Dropping `txn` on an early return rolls everything back
        let mut outcomes = Vec::with_capacity(samples.len());
        let mut deltas: BTreeMap<(UserId, NaiveDate), i64> = BTreeMap::new();
        for dated in samples {
            let outcome = insert_sample(&txn, &dated.sample).await?;
            if let InsertOutcome::Inserted(_) = outcome {
                let delta = deltas
                    .entry((dated.sample.user_id, dated.local_date))
                    .or_insert(0);
                *delta = delta.checked_add(dated.sample.steps).ok_or_else(|| {
                    DomainError::Database(format!(
                        "step total for {} overflows",
                        dated.local_date
                    ))
                })?;
            }
            outcomes.push(outcome);
        }

        // Keys are visited in (user, date) order, so concurrent uploads lock
        // aggregate rows in the same order
        for ((user_id, date), delta) in &deltas {
            upsert_daily(&txn, user_id, *date, *delta).await?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(outcomes)
    }
}
