//! Directory port traits
//!
//! Read-only views of the profile and social services. Friendship and group
//! lifecycles are managed elsewhere; the step engine only resolves cohorts.

use async_trait::async_trait;

use crate::domain::entities::{GroupId, User};
use crate::error::DomainError;

/// Resolves users by username
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
}

/// Friend graph lookups
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Usernames of accepted friends. Order is irrelevant.
    async fn list_friend_usernames(&self, username: &str) -> Result<Vec<String>, DomainError>;
}

/// Group membership lookups
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Members of a group, or `None` if the group does not exist
    async fn get_group_members(&self, group_id: &GroupId)
        -> Result<Option<Vec<User>>, DomainError>;
}
