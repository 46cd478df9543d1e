use chrono::{DateTime, Utc};

use crate::domain::{ItemId, ProgressRecord, Rating};
use crate::srs::scheduler;

/// Apply a rating to an item's progress, returning the next record.
///
/// Pure computation: the caller persists the result via its progress
/// repository after this returns, so an abandoned call leaves no
/// partially-applied state.
///
/// Level transitions:
/// - first-ever rating of an unseen item pins the level to 0
/// - pass (rating >= Doable) increments the level
/// - fail decrements the level, floored at 0
///
/// The streak counts consecutive passes and resets to 0 on fail. The card
/// for the *rated* level is rescheduled and stored in the per-level map.
pub fn apply_rating(
  record: Option<ProgressRecord>,
  item: &ItemId,
  level: u8,
  rating: Rating,
  now: DateTime<Utc>,
) -> ProgressRecord {
  let mut record = record.unwrap_or_else(|| ProgressRecord::unseen(item.clone()));
  let first_rating = record.is_unseen();

  let next_card = scheduler::schedule(record.cards.get(&level), now, rating);
  record.cards.insert(level, next_card);

  if rating.is_passing() {
    record.streak += 1;
  } else {
    record.streak = 0;
  }

  record.level = if first_rating {
    0
  } else if rating.is_passing() {
    record.level.saturating_add(1)
  } else {
    (record.level - 1).max(0)
  };

  record
}
