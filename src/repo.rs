//! Repository contracts the engine consumes.
//!
//! Storage is an external collaborator: the engine only reads items,
//! resources and goals, and writes progress records it has already fully
//! computed. The crate ships two implementations, `store::SqliteStore`
//! and the in-memory `testing::MemoryStore`.

use chrono::{DateTime, Utc};

use crate::domain::{Goal, ItemId, LearningItem, ProgressRecord, Resource};

/// Error from a repository implementation.
#[derive(Debug)]
pub enum RepoError {
  Storage(String),
  Corrupt(String),
}

impl std::fmt::Display for RepoError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RepoError::Storage(e) => write!(f, "storage error: {}", e),
      RepoError::Corrupt(e) => write!(f, "corrupt record: {}", e),
    }
  }
}

impl std::error::Error for RepoError {}

pub type RepoResult<T> = Result<T, RepoError>;

/// Content units: words, sentences and fact cards.
///
/// Filtered queries take an optional block list of item uids that a caller
/// (usually a diversity tracker) wants excluded, and an explicit `now` so
/// due-ness stays deterministic under test.
pub trait ItemRepo {
  fn get_all(&self) -> RepoResult<Vec<LearningItem>>;
  fn get_by_id(&self, uid: &str) -> RepoResult<Option<LearningItem>>;
  fn get_by_ids(&self, uids: &[ItemId]) -> RepoResult<Vec<LearningItem>>;
  fn add(&self, item: &LearningItem) -> RepoResult<()>;
  fn update(&self, item: &LearningItem) -> RepoResult<()>;
  fn delete(&self, uid: &str) -> RepoResult<()>;

  /// Every item whose current-level card is due at `now` (unseen excluded).
  fn get_all_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<LearningItem>>;

  /// Up to `n` never-attempted items in the given languages.
  fn get_random_unseen(
    &self,
    n: usize,
    languages: &[String],
    block: &[ItemId],
  ) -> RepoResult<Vec<LearningItem>>;

  /// Up to `n` items that have been seen before and are due at `now`.
  fn get_random_already_seen_due(
    &self,
    n: usize,
    languages: &[String],
    block: &[ItemId],
    now: DateTime<Utc>,
  ) -> RepoResult<Vec<LearningItem>>;

  /// All due items in one language (distractor pool source).
  fn get_due_in_language(&self, language: &str, now: DateTime<Utc>) -> RepoResult<Vec<LearningItem>>;
}

/// Per-item practice progress.
pub trait ProgressRepo {
  fn get(&self, item: &str) -> RepoResult<Option<ProgressRecord>>;
  fn upsert(&self, record: &ProgressRecord) -> RepoResult<()>;
  fn get_all(&self) -> RepoResult<Vec<ProgressRecord>>;
  fn clear(&self) -> RepoResult<()>;
}

/// Immersion content linking practice items.
pub trait ResourceRepo {
  fn get_by_id(&self, uid: &str) -> RepoResult<Option<Resource>>;

  /// Unfinished resources in the given languages that still link items.
  fn get_valid_immersion_resources(&self, languages: &[String]) -> RepoResult<Vec<Resource>>;

  /// Unfinished resources whose linked items are mostly due, i.e. the
  /// learner is close to being ready to consume the content.
  fn get_almost_ready(&self, languages: &[String], now: DateTime<Utc>) -> RepoResult<Vec<Resource>>;
}

/// Learning goals grouping vocabulary.
pub trait GoalRepo {
  fn get_incomplete(&self, languages: &[String]) -> RepoResult<Vec<Goal>>;
}
