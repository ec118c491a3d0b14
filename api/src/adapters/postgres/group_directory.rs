//! PostgreSQL adapter for GroupDirectory

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use crate::domain::entities::{GroupId, User};
use crate::domain::ports::GroupDirectory;
use crate::entity::{group_members, groups, users};
use crate::error::DomainError;

/// PostgreSQL implementation of GroupDirectory
pub struct PostgresGroupDirectory {
    db: DatabaseConnection,
}

impl PostgresGroupDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupDirectory for PostgresGroupDirectory {
    async fn get_group_members(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<Vec<User>>, DomainError> {
        let group = groups::Entity::find_by_id(group_id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if group.is_none() {
            return Ok(None);
        }

        let members = users::Entity::find()
            .inner_join(group_members::Entity)
            .filter(group_members::Column::GroupId.eq(group_id.0))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(members.into_iter().map(|m| m.into()).collect()))
    }
}
