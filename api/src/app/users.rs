//! User resolution helpers

use crate::domain::entities::User;
use crate::domain::ports::UserDirectory;
use crate::error::AppError;

/// Resolve `username` or fail with `UserNotFound`
pub async fn require_user<U>(users: &U, username: &str) -> Result<User, AppError>
where
    U: UserDirectory + ?Sized,
{
    users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::UserNotFound(username.to_string()))
}
