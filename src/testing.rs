//! In-memory repository implementations for tests.
//!
//! `MemoryStore` implements every repository contract over plain maps
//! behind a mutex, with seeding helpers that set up the usual fixtures
//! ("an unseen item", "a seen item that is due now"). The filtered queries
//! return deterministic order; callers that need randomness shuffle
//! themselves.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::RESOURCE_ALMOST_READY_THRESHOLD;
use crate::domain::{Goal, ItemId, LearningItem, ProgressRecord, Rating, Resource};
use crate::repo::{GoalRepo, ItemRepo, ProgressRepo, RepoError, RepoResult, ResourceRepo};
use crate::srs::eligibility;
use crate::srs::progress_model::apply_rating;

#[derive(Default)]
struct State {
    items: Vec<LearningItem>,
    progress: HashMap<ItemId, ProgressRecord>,
    resources: Vec<Resource>,
    goals: Vec<Goal>,
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()) }
    }

    fn lock(&self) -> RepoResult<std::sync::MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| RepoError::Storage("poisoned lock".to_string()))
    }

    /// Seed an item with no progress record (unseen).
    pub fn seed_item(&self, item: &LearningItem) {
        if let Ok(mut state) = self.state.lock() {
            state.items.retain(|existing| existing.uid != item.uid);
            state.items.push(item.clone());
        }
    }

    /// Seed an item that has been rated once and whose card is due at
    /// `now`: rate it well in the past so the scheduled interval has
    /// long elapsed.
    pub fn seed_seen_due_item(&self, item: &LearningItem, now: DateTime<Utc>) {
        self.seed_item(item);
        let long_ago = now - chrono::Duration::days(365);
        let record = apply_rating(None, &item.uid, 0, Rating::Doable, long_ago);
        if let Ok(mut state) = self.state.lock() {
            state.progress.insert(item.uid.clone(), record);
        }
    }

    pub fn seed_resource(&self, resource: &Resource) {
        if let Ok(mut state) = self.state.lock() {
            state.resources.push(resource.clone());
        }
    }

    pub fn seed_goal(&self, goal: &Goal) {
        if let Ok(mut state) = self.state.lock() {
            state.goals.push(goal.clone());
        }
    }

    fn record_or_unseen(state: &State, uid: &str) -> ProgressRecord {
        state.progress.get(uid).cloned().unwrap_or_else(|| ProgressRecord::unseen(uid))
    }

    fn is_seen_and_due(state: &State, uid: &str, now: DateTime<Utc>) -> bool {
        let record = Self::record_or_unseen(state, uid);
        !record.is_unseen() && eligibility::is_due_now(&record, now)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemRepo for MemoryStore {
    fn get_all(&self) -> RepoResult<Vec<LearningItem>> {
        Ok(self.lock()?.items.clone())
    }

    fn get_by_id(&self, uid: &str) -> RepoResult<Option<LearningItem>> {
        Ok(self.lock()?.items.iter().find(|item| item.uid == uid).cloned())
    }

    fn get_by_ids(&self, uids: &[ItemId]) -> RepoResult<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(uids
            .iter()
            .filter_map(|uid| state.items.iter().find(|item| &item.uid == uid).cloned())
            .collect())
    }

    fn add(&self, item: &LearningItem) -> RepoResult<()> {
        self.lock()?.items.push(item.clone());
        Ok(())
    }

    fn update(&self, item: &LearningItem) -> RepoResult<()> {
        let mut state = self.lock()?;
        match state.items.iter_mut().find(|existing| existing.uid == item.uid) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(RepoError::Storage(format!("no such item: {}", item.uid))),
        }
    }

    fn delete(&self, uid: &str) -> RepoResult<()> {
        let mut state = self.lock()?;
        state.items.retain(|item| item.uid != uid);
        state.progress.remove(uid);
        Ok(())
    }

    fn get_all_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .filter(|item| Self::is_seen_and_due(&state, &item.uid, now))
            .cloned()
            .collect())
    }

    fn get_random_unseen(
        &self,
        n: usize,
        languages: &[String],
        block: &[ItemId],
    ) -> RepoResult<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .filter(|item| {
                languages.contains(&item.language)
                    && !block.contains(&item.uid)
                    && Self::record_or_unseen(&state, &item.uid).is_unseen()
            })
            .take(n)
            .cloned()
            .collect())
    }

    fn get_random_already_seen_due(
        &self,
        n: usize,
        languages: &[String],
        block: &[ItemId],
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .filter(|item| {
                languages.contains(&item.language)
                    && !block.contains(&item.uid)
                    && Self::is_seen_and_due(&state, &item.uid, now)
            })
            .take(n)
            .cloned()
            .collect())
    }

    fn get_due_in_language(
        &self,
        language: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<LearningItem>> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .filter(|item| {
                item.language == language && Self::is_seen_and_due(&state, &item.uid, now)
            })
            .cloned()
            .collect())
    }
}

impl ProgressRepo for MemoryStore {
    fn get(&self, item: &str) -> RepoResult<Option<ProgressRecord>> {
        Ok(self.lock()?.progress.get(item).cloned())
    }

    fn upsert(&self, record: &ProgressRecord) -> RepoResult<()> {
        self.lock()?.progress.insert(record.item.clone(), record.clone());
        Ok(())
    }

    fn get_all(&self) -> RepoResult<Vec<ProgressRecord>> {
        Ok(self.lock()?.progress.values().cloned().collect())
    }

    fn clear(&self) -> RepoResult<()> {
        self.lock()?.progress.clear();
        Ok(())
    }
}

impl ResourceRepo for MemoryStore {
    fn get_by_id(&self, uid: &str) -> RepoResult<Option<Resource>> {
        Ok(self.lock()?.resources.iter().find(|r| r.uid == uid).cloned())
    }

    fn get_valid_immersion_resources(&self, languages: &[String]) -> RepoResult<Vec<Resource>> {
        let state = self.lock()?;
        Ok(state
            .resources
            .iter()
            .filter(|r| {
                !r.finished
                    && languages.contains(&r.language)
                    && r.linked_items().next().is_some()
            })
            .cloned()
            .collect())
    }

    fn get_almost_ready(
        &self,
        languages: &[String],
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Resource>> {
        let state = self.lock()?;
        Ok(state
            .resources
            .iter()
            .filter(|r| {
                if r.finished || !languages.contains(&r.language) {
                    return false;
                }
                let remaining = r
                    .linked_items()
                    .filter(|uid| !Self::is_seen_and_due(&state, uid, now))
                    .count();
                remaining <= RESOURCE_ALMOST_READY_THRESHOLD
            })
            .cloned()
            .collect())
    }
}

impl GoalRepo for MemoryStore {
    fn get_incomplete(&self, languages: &[String]) -> RepoResult<Vec<Goal>> {
        let state = self.lock()?;
        Ok(state
            .goals
            .iter()
            .filter(|g| !g.completed && languages.contains(&g.language))
            .cloned()
            .collect())
    }
}

/// Install the tracing subscriber for a test run. RUST_LOG controls the
/// filter; repeat calls after the first are no-ops.
#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexloop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
