//! PostgreSQL adapter for SocialGraph
//!
//! A friendship is an accepted friend request in either direction.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::domain::ports::SocialGraph;
use crate::entity::{friend_requests, users};
use crate::error::DomainError;

/// Status the social service writes once a request is accepted
pub const ACCEPTED_STATUS: &str = "ACCEPTED";

/// PostgreSQL implementation of SocialGraph
pub struct PostgresSocialGraph {
    db: DatabaseConnection,
}

impl PostgresSocialGraph {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SocialGraph for PostgresSocialGraph {
    async fn list_friend_usernames(&self, username: &str) -> Result<Vec<String>, DomainError> {
        let Some(user) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
        else {
            return Ok(Vec::new());
        };

        let requests = friend_requests::Entity::find()
            .filter(friend_requests::Column::Status.eq(ACCEPTED_STATUS))
            .filter(
                Condition::any()
                    .add(friend_requests::Column::SenderId.eq(user.id))
                    .add(friend_requests::Column::ReceiverId.eq(user.id)),
            )
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut friend_ids: Vec<Uuid> = requests
            .into_iter()
            .map(|r| {
                if r.sender_id == user.id {
                    r.receiver_id
                } else {
                    r.sender_id
                }
            })
            .collect();
        friend_ids.sort();
        friend_ids.dedup();
        if friend_ids.is_empty() {
            return Ok(Vec::new());
        }

        let friends = users::Entity::find()
            .filter(users::Column::Id.is_in(friend_ids))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(friends.into_iter().map(|u| u.username).collect())
    }
}
