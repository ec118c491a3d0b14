//! PostgreSQL adapter for UserDirectory

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::entities::{User, UserId};
use crate::domain::ports::UserDirectory;
use crate::entity::users;
use crate::error::DomainError;

/// Read-only view of the profile service's `users` table
pub struct PostgresUserDirectory {
    db: DatabaseConnection,
}

impl PostgresUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            username: model.username,
            timezone: model.timezone,
        }
    }
}
