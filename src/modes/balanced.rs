//! Size-balanced mode: steer the small/medium/big task mix toward the
//! session targets.

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::domain::{LearningItem, Task, TaskSize, TaskType};
use crate::exercises::words;
use crate::modes::generators;
use crate::modes::{Mode, PracticeContext};
use crate::repo::RepoError;
use crate::session::SessionTrackers;

/// Asks the size tracker for the most underused size class, tries that
/// class's families in random order, then the other classes, then a
/// backup task built from the two least-recently-reviewed items.
pub struct SizeBalancedMode;

impl SizeBalancedMode {
  fn try_size(
    size: TaskSize,
    ctx: &PracticeContext<'_>,
    trackers: &SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Option<Task> {
    let mut families = TaskType::of_size(size);
    families.shuffle(rng);
    for task_type in families {
      match generators::generate(task_type, ctx, trackers, rng) {
        Ok(Some(task)) => return Some(task),
        Ok(None) => {}
        Err(e) => {
          warn!(family = task_type.as_str(), error = %e, "generator failed, trying next family");
        }
      }
    }
    None
  }

  /// Guaranteed fallback: form one sentence from the two items that have
  /// gone longest without review.
  fn backup_task(ctx: &PracticeContext<'_>) -> Result<Option<Task>, RepoError> {
    let mut reviewed: Vec<(DateTime<Utc>, String)> = ctx
      .progress
      .get_all()?
      .into_iter()
      .filter_map(|record| {
        let last = record.cards.values().map(|card| card.last_review).max()?;
        Some((last, record.item))
      })
      .collect();
    reviewed.sort_by_key(|(last, _)| *last);

    let uids: Vec<String> = reviewed.into_iter().take(2).map(|(_, uid)| uid).collect();
    let pair = ctx.items.get_by_ids(&uids)?;
    let [a, b]: [&LearningItem; 2] = match pair.as_slice() {
      [a, b] => [a, b],
      _ => return Ok(None),
    };
    let exercise = words::make_form_sentence_pair(a, b);
    Ok(Some(Task::from_exercise(TaskType::VocabFormSentence, exercise)))
  }
}

impl Mode for SizeBalancedMode {
  fn name(&self) -> &'static str {
    "size_balanced"
  }

  fn next_task(
    &mut self,
    ctx: &PracticeContext<'_>,
    trackers: &mut SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    let preferred = trackers.sizes.preferred_size(rng);
    if let Some(task) = Self::try_size(preferred, ctx, trackers, rng) {
      return Ok(Some(task));
    }

    let mut others: Vec<TaskSize> =
      TaskSize::ALL.iter().copied().filter(|s| *s != preferred).collect();
    others.shuffle(rng);
    for size in others {
      debug!(preferred = preferred.as_str(), fallback = size.as_str(), "falling back to other size");
      if let Some(task) = Self::try_size(size, ctx, trackers, rng) {
        return Ok(Some(task));
      }
    }

    Self::backup_task(ctx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ItemKind, Rating};
  use crate::repo::ProgressRepo;
  use crate::srs::progress_model::apply_rating;
  use crate::testing::MemoryStore;
  use chrono::Duration;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn context<'a>(store: &'a MemoryStore, langs: &'a [String]) -> PracticeContext<'a> {
    PracticeContext {
      items: store,
      progress: store,
      resources: store,
      goals: store,
      target_languages: langs,
      now: Utc::now(),
    }
  }

  #[test]
  fn test_empty_store_yields_none() {
    let store = MemoryStore::new();
    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(SizeBalancedMode.next_task(&ctx, &mut trackers, &mut rng).unwrap().is_none());
  }

  #[test]
  fn test_produces_task_when_material_exists() {
    let store = MemoryStore::new();
    store.seed_item(
      &LearningItem::new("v1", "es", ItemKind::Word, "perro").with_translations(&["dog"]),
    );
    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(SizeBalancedMode.next_task(&ctx, &mut trackers, &mut rng).unwrap().is_some());
  }

  #[test]
  fn test_backup_pairs_least_recently_reviewed() {
    let store = MemoryStore::new();
    let now = Utc::now();
    for (uid, content, rated_at) in [
      ("v1", "perro", now - Duration::days(10)),
      ("v2", "gato", now - Duration::days(5)),
      ("v3", "casa", now - Duration::days(1)),
    ] {
      let item = LearningItem::new(uid, "es", ItemKind::Word, content).with_translations(&["x"]);
      store.seed_item(&item);
      let record = apply_rating(None, &uid.to_string(), 0, Rating::Doable, rated_at);
      store.upsert(&record).unwrap();
    }

    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let task = SizeBalancedMode::backup_task(&ctx).unwrap().unwrap();
    assert_eq!(task.task_type, TaskType::VocabFormSentence);
    let mut uids = task.items.clone();
    uids.sort();
    assert_eq!(uids, vec!["v1".to_string(), "v2".to_string()]);
  }
}
