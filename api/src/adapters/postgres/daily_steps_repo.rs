//! PostgreSQL adapter for DailyStepsRepository

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{DailySteps, UserId};
use crate::domain::ports::DailyStepsRepository;
use crate::entity::daily_steps;
use crate::error::DomainError;

/// PostgreSQL implementation of DailyStepsRepository
pub struct PostgresDailyStepsRepository {
    db: DatabaseConnection,
}

impl PostgresDailyStepsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DailyStepsRepository for PostgresDailyStepsRepository {
    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailySteps>, DomainError> {
        let result = daily_steps::Entity::find()
            .filter(daily_steps::Column::UserId.eq(user_id.0))
            .filter(daily_steps::Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn upsert_add(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<DailySteps, DomainError> {
        upsert_daily(&self.db, user_id, date, delta).await
    }

    async fn find_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySteps>, DomainError> {
        let results = daily_steps::Entity::find()
            .filter(daily_steps::Column::UserId.eq(user_id.0))
            .filter(daily_steps::Column::Date.between(from, to))
            .order_by_asc(daily_steps::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_top(
        &self,
        date: NaiveDate,
        user_ids: &[UserId],
        limit: u64,
    ) -> Result<Vec<DailySteps>, DomainError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = daily_steps::Entity::find()
            .filter(daily_steps::Column::Date.eq(date))
            .filter(daily_steps::Column::UserId.is_in(user_ids.iter().map(|id| id.0)))
            .order_by_desc(daily_steps::Column::StepsTotal)
            .order_by_asc(daily_steps::Column::UserId)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

/// Single-statement increment on any connection or transaction.
/// Concurrent writers serialize on the row lock.
pub(super) async fn upsert_daily<C: ConnectionTrait>(
    db: &C,
    user_id: &UserId,
    date: NaiveDate,
    delta: i64,
) -> Result<DailySteps, DomainError> {
    let model = daily_steps::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id.0),
        date: Set(date),
        steps_total: Set(delta),
        updated_at: Set(Utc::now().fixed_offset()),
    };

    let result = daily_steps::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([daily_steps::Column::UserId, daily_steps::Column::Date])
                .value(
                    daily_steps::Column::StepsTotal,
                    Expr::col((daily_steps::Entity, daily_steps::Column::StepsTotal)).add(delta),
                )
                .update_column(daily_steps::Column::UpdatedAt)
                .to_owned(),
        )
        .exec_with_returning(db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(result.into())
}

impl From<daily_steps::Model> for DailySteps {
    fn from(model: daily_steps::Model) -> Self {
        DailySteps {
            user_id: UserId(model.user_id),
            date: model.date,
            steps_total: model.steps_total,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
