//! PostgreSQL adapter for StepSampleRepository

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::entities::{InsertOutcome, NewStepSample, Provider, StepSampleId, UserId};
use crate::domain::ports::StepSampleRepository;
use crate::entity::step_samples;
use crate::error::DomainError;

/// PostgreSQL implementation of StepSampleRepository
pub struct PostgresStepSampleRepository {
    db: DatabaseConnection,
}

impl PostgresStepSampleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StepSampleRepository for PostgresStepSampleRepository {
    async fn exists(
        &self,
        user_id: &UserId,
        provider: Provider,
        external_id: &str,
    ) -> Result<bool, DomainError> {
        let count = step_samples::Entity::find()
            .filter(step_samples::Column::UserId.eq(user_id.0))
            .filter(step_samples::Column::Provider.eq(provider.to_string()))
            .filter(step_samples::Column::ExternalId.eq(external_id))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn insert(&self, sample: &NewStepSample) -> Result<InsertOutcome, DomainError> {
        insert_sample(&self.db, sample).await
    }
}

/// `INSERT ... ON CONFLICT DO NOTHING` on any connection or transaction
pub(super) async fn insert_sample<C: ConnectionTrait>(
    db: &C,
    sample: &NewStepSample,
) -> Result<InsertOutcome, DomainError> {
    let id = Uuid::new_v4();

    let model = step_samples::ActiveModel {
        id: Set(id),
        user_id: Set(sample.user_id.0),
        provider: Set(sample.provider.to_string()),
        external_id: Set(sample.external_id.clone()),
        started_at: Set(sample.started_at.fixed_offset()),
        ended_at: Set(sample.ended_at.fixed_offset()),
        steps: Set(sample.steps),
        source: Set(sample.source.clone()),
        received_at: Set(sample.received_at.fixed_offset()),
    };

    let result = step_samples::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                step_samples::Column::UserId,
                step_samples::Column::Provider,
                step_samples::Column::ExternalId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) => Ok(InsertOutcome::Duplicate),
        Ok(_) => Ok(InsertOutcome::Inserted(StepSampleId(id))),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(InsertOutcome::Duplicate)
        }
        Err(e) => Err(DomainError::Database(e.to_string())),
    }
}
