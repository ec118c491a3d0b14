//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::entities::{
    DailySteps, DatedSample, GroupId, InsertOutcome, NewStepSample, Provider, StepSample, StepSampleId, User,
    UserId,
};
use crate::domain::ports::{
    DailyStepsRepository, GroupDirectory, SocialGraph, StepLedger, StepSampleRepository,
    UserDirectory,
};
use crate::error::DomainError;

// ============================================================================
// In-Memory Step Sample Repository
// ============================================================================

/// Enforces the (user, provider, external id) uniqueness the database does
#[derive(Default)]
pub struct InMemoryStepSampleRepository {
    samples: Arc<RwLock<Vec<StepSample>>>,
    stale_existence_checks: bool,
    failing_inserts: AtomicUsize,
}

impl InMemoryStepSampleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `exists` always answer `false`, so only the insert-time
    /// uniqueness check can catch a duplicate
    pub fn with_stale_existence_checks(mut self) -> Self {
        self.stale_existence_checks = true;
        self
    }

    /// Make the next `n` inserts fail with a database error
    pub fn failing_next_inserts(self, n: usize) -> Self {
        self.failing_inserts.store(n, Ordering::SeqCst);
        self
    }

    pub fn count(&self) -> usize {
        self.samples.read().unwrap().len()
    }

    pub fn all(&self) -> Vec<StepSample> {
        self.samples.read().unwrap().clone()
    }
}

fn same_key(sample: &StepSample, user_id: &UserId, provider: Provider, external_id: &str) -> bool {
    sample.user_id == *user_id
        && sample.provider == provider
        && sample.external_id.as_deref() == Some(external_id)
}

fn is_taken(stored: &[StepSample], sample: &NewStepSample) -> bool {
    sample.external_id.as_deref().is_some_and(|external_id| {
        stored
            .iter()
            .any(|s| same_key(s, &sample.user_id, sample.provider, external_id))
    })
}

fn to_stored(sample: &NewStepSample) -> StepSample {
    StepSample {
        id: StepSampleId::new(),
        user_id: sample.user_id,
        provider: sample.provider,
        external_id: sample.external_id.clone(),
        started_at: sample.started_at,
        ended_at: sample.ended_at,
        steps: sample.steps,
        source: sample.source.clone(),
        received_at: sample.received_at,
    }
}

/// Consume one injected failure, if any are left
fn take_failure(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn injected(what: &str) -> DomainError {
    DomainError::Database(format!("{} failed", what))
}

#[async_trait]
impl StepSampleRepository for InMemoryStepSampleRepository {
    async fn exists(
        &self,
        user_id: &UserId,
        provider: Provider,
        external_id: &str,
    ) -> Result<bool, DomainError> {
        if self.stale_existence_checks {
            return Ok(false);
        }
        let samples = self.samples.read().unwrap();
        Ok(samples
            .iter()
            .any(|s| same_key(s, user_id, provider, external_id)))
    }

    async fn insert(&self, sample: &NewStepSample) -> Result<InsertOutcome, DomainError> {
        if take_failure(&self.failing_inserts) {
            return Err(injected("sample insert"));
        }
        let mut samples = self.samples.write().unwrap();
        if is_taken(&samples, sample) {
            return Ok(InsertOutcome::Duplicate);
        }

        let stored = to_stored(sample);
        let id = stored.id;
        samples.push(stored);
        Ok(InsertOutcome::Inserted(id))
    }
}

// ============================================================================
// In-Memory Daily Steps Repository
// ============================================================================

/// Read-modify-write happens under one lock, matching the atomic upsert
#[derive(Default)]
pub struct InMemoryDailyStepsRepository {
    rows: Arc<Mutex<HashMap<(UserId, NaiveDate), DailySteps>>>,
    top_queries: AtomicUsize,
    failing_upserts: AtomicUsize,
}

impl InMemoryDailyStepsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an aggregate
    pub fn with_total(self, user_id: UserId, date: NaiveDate, total: i64) -> Self {
        self.rows.lock().unwrap().insert(
            (user_id, date),
            DailySteps {
                user_id,
                date,
                steps_total: total,
                updated_at: Utc::now(),
            },
        );
        self
    }

    /// Make the next `n` upserts fail with a database error
    pub fn failing_next_upserts(self, n: usize) -> Self {
        self.failing_upserts.store(n, Ordering::SeqCst);
        self
    }

    pub fn total(&self, user_id: &UserId, date: NaiveDate) -> Option<i64> {
        self.rows
            .lock()
            .unwrap()
            .get(&(*user_id, date))
            .map(|row| row.steps_total)
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// How many times `find_top` was called
    pub fn top_queries(&self) -> usize {
        self.top_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DailyStepsRepository for InMemoryDailyStepsRepository {
    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailySteps>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&(*user_id, date)).cloned())
    }

    async fn upsert_add(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<DailySteps, DomainError> {
        if take_failure(&self.failing_upserts) {
            return Err(injected("daily upsert"));
        }
        let mut rows = self.rows.lock().unwrap();
        Ok(add_to_total(&mut rows, user_id, date, delta))
    }

    async fn find_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySteps>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == *user_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    async fn find_top(
        &self,
        date: NaiveDate,
        user_ids: &[UserId],
        limit: u64,
    ) -> Result<Vec<DailySteps>, DomainError> {
        self.top_queries.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<_> = rows
            .values()
            .filter(|r| r.date == date && user_ids.contains(&r.user_id))
            .cloned()
            .collect();
        found.sort_by_key(|r| (Reverse(r.steps_total), r.user_id));
        found.truncate(limit as usize);
        Ok(found)
    }
}

fn add_to_total(
    rows: &mut HashMap<(UserId, NaiveDate), DailySteps>,
    user_id: &UserId,
    date: NaiveDate,
    delta: i64,
) -> DailySteps {
    let row = rows.entry((*user_id, date)).or_insert_with(|| DailySteps {
        user_id: *user_id,
        date,
        steps_total: 0,
        updated_at: Utc::now(),
    });
    row.steps_total += delta;
    row.updated_at = Utc::now();
    row.clone()
}

// ============================================================================
// In-Memory Step Ledger
// ============================================================================

/// Stages an upload against both stores and applies it only when every
/// write succeeded, like a committed transaction
pub struct InMemoryStepLedger {
    samples: Arc<InMemoryStepSampleRepository>,
    daily: Arc<InMemoryDailyStepsRepository>,
}

impl InMemoryStepLedger {
    pub fn new(
        samples: Arc<InMemoryStepSampleRepository>,
        daily: Arc<InMemoryDailyStepsRepository>,
    ) -> Self {
        Self { samples, daily }
    }
}

#[async_trait]
impl StepLedger for InMemoryStepLedger {
    async fn record(&self, samples: &[DatedSample]) -> Result<Vec<InsertOutcome>, DomainError> {
        let mut stored = self.samples.samples.write().unwrap();
        let committed = stored.len();
        let mut outcomes = Vec::with_capacity(samples.len());
        let mut deltas: BTreeMap<(UserId, NaiveDate), i64> = BTreeMap::new();

        for dated in samples {
            if take_failure(&self.samples.failing_inserts) {
                stored.truncate(committed);
                return Err(injected("sample insert"));
            }
            if is_taken(&stored, &dated.sample) {
                outcomes.push(InsertOutcome::Duplicate);
                continue;
            }
            let sample = to_stored(&dated.sample);
            outcomes.push(InsertOutcome::Inserted(sample.id));
            let delta = deltas
                .entry((sample.user_id, dated.local_date))
                .or_insert(0);
            *delta += sample.steps;
            stored.push(sample);
        }

        let mut rows = self.daily.rows.lock().unwrap();
        for _ in &deltas {
            if take_failure(&self.daily.failing_upserts) {
                stored.truncate(committed);
                return Err(injected("daily upsert"));
            }
        }
        for ((user_id, date), delta) in &deltas {
            add_to_total(&mut rows, user_id, *date, *delta);
        }
        Ok(outcomes)
    }
}

// ============================================================================
// In-Memory Directories
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users
            .write()
            .unwrap()
            .insert(user.username.clone(), user);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(username).cloned())
    }
}

#[derive(Default)]
pub struct InMemorySocialGraph {
    friends: Arc<RwLock<HashMap<String, Vec<String>>>>,
    fail: bool,
}

impl InMemorySocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted friendship in both directions
    pub fn with_friendship(self, a: &str, b: &str) -> Self {
        {
            let mut friends = self.friends.write().unwrap();
            friends
                .entry(a.to_string())
                .or_default()
                .push(b.to_string());
            friends
                .entry(b.to_string())
                .or_default()
                .push(a.to_string());
        }
        self
    }

    /// Make every lookup fail with a database error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl SocialGraph for InMemorySocialGraph {
    async fn list_friend_usernames(&self, username: &str) -> Result<Vec<String>, DomainError> {
        if self.fail {
            return Err(DomainError::Database("social graph unavailable".to_string()));
        }
        Ok(self
            .friends
            .read()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryGroupDirectory {
    groups: Arc<RwLock<HashMap<GroupId, Vec<User>>>>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, group_id: GroupId, members: Vec<User>) -> Self {
        self.groups.write().unwrap().insert(group_id, members);
        self
    }
}

#[async_trait]
impl GroupDirectory for InMemoryGroupDirectory {
    async fn get_group_members(
        &self,
        group_id: &GroupId,
    ) -> Result<Option<Vec<User>>, DomainError> {
        Ok(self.groups.read().unwrap().get(group_id).cloned())
    }
}
