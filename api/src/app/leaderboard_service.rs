//! Leaderboard service
//!
//! Ranks a cohort of users by their step total on one local date. The cohort
//! is either a user plus their accepted friends, or the members of a group.
//! Users without an aggregate for the date do not appear.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::steps_config::clamp_leaderboard_limit;
use crate::domain::entities::{GroupId, LeaderboardEntry, User, UserId};
use crate::domain::ports::{DailyStepsRepository, GroupDirectory, SocialGraph, UserDirectory};
use crate::error::AppError;

/// Service for ranked leaderboards
pub struct LeaderboardService<DR, UD, SG, GD>
where
    DR: DailyStepsRepository,
    UD: UserDirectory,
    SG: SocialGraph,
    GD: GroupDirectory,
{
    daily: Arc<DR>,
    users: Arc<UD>,
    social: Arc<SG>,
    groups: Arc<GD>,
}

impl<DR, UD, SG, GD> LeaderboardService<DR, UD, SG, GD>
where
    DR: DailyStepsRepository,
    UD: UserDirectory,
    SG: SocialGraph,
    GD: GroupDirectory,
{
    pub fn new(daily: Arc<DR>, users: Arc<UD>, social: Arc<SG>, groups: Arc<GD>) -> Self {
        Self {
            daily,
            users,
            social,
            groups,
        }
    }

    /// Rank `user` and their accepted friends on `date`.
    ///
    /// Friend usernames that no longer resolve are dropped.
    pub async fn rank_friends(
        &self,
        user: &User,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let friend_names = self.social.list_friend_usernames(&user.username).await?;

        let mut cohort = Vec::with_capacity(friend_names.len() + 1);
        cohort.push(user.clone());
        for name in friend_names {
            match self.users.find_by_username(&name).await? {
                Some(friend) => cohort.push(friend),
                None => {
                    tracing::debug!(
                        username = %user.username,
                        friend = %name,
                        "Dropping unresolvable friend from leaderboard"
                    );
                }
            }
        }

        self.rank_cohort(cohort, date, limit).await
    }

    /// Rank the members of a group on `date`
    pub async fn rank_group(
        &self,
        group_id: &GroupId,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let members = self
            .groups
            .get_group_members(group_id)
            .await?
            .ok_or(AppError::GroupNotFound(*group_id))?;

        self.rank_cohort(members, date, limit).await
    }

    async fn rank_cohort(
        &self,
        cohort: Vec<User>,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let names: HashMap<UserId, String> = cohort
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<UserId> = names.keys().copied().collect();
        ids.sort();

        let rows = self
            .daily
            .find_top(date, &ids, clamp_leaderboard_limit(limit))
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                names.get(&row.user_id).map(|username| LeaderboardEntry {
                    username: username.clone(),
                    total: row.steps_total,
                })
            })
            .collect())
    }
}
