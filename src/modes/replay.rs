//! Due-only replay: nothing new, just what the schedule says.

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::config::BATCH_MAX;
use crate::domain::{ItemKind, LearningItem, Task};
use crate::modes::generators;
use crate::modes::{Mode, PracticeContext};
use crate::repo::RepoError;
use crate::session::SessionTrackers;

/// Replays already-seen, currently-due items, alternating uniformly
/// between the vocabulary and fact-card pools.
pub struct DueReplayMode;

impl Mode for DueReplayMode {
  fn name(&self) -> &'static str {
    "due_replay"
  }

  fn next_task(
    &mut self,
    ctx: &PracticeContext<'_>,
    trackers: &mut SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    let block = trackers.items.block_list();
    let due =
      ctx.items.get_random_already_seen_due(BATCH_MAX, ctx.target_languages, &block, ctx.now)?;

    let (mut fact_cards, mut vocab): (Vec<LearningItem>, Vec<LearningItem>) =
      due.into_iter().partition(|item| item.kind == ItemKind::FactCard);
    vocab.shuffle(rng);
    fact_cards.shuffle(rng);

    // Uniform pick between the two pools when both have material
    let ordered: Vec<LearningItem> = if !vocab.is_empty()
      && !fact_cards.is_empty()
      && rand::Rng::random_bool(rng, 0.5)
    {
      fact_cards.into_iter().chain(vocab).collect()
    } else {
      vocab.into_iter().chain(fact_cards).collect()
    };

    for item in &ordered {
      if let Some(task) = generators::task_for_item_logged(item, ctx, rng) {
        return Ok(Some(task));
      }
    }
    Ok(None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::TaskType;
  use crate::testing::MemoryStore;
  use chrono::Utc;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn test_replay_skips_unseen_items() {
    let store = MemoryStore::new();
    store.seed_item(
      &LearningItem::new("v1", "es", ItemKind::Word, "perro").with_translations(&["dog"]),
    );

    let langs = vec!["es".to_string()];
    let ctx = PracticeContext {
      items: &store,
      progress: &store,
      resources: &store,
      goals: &store,
      target_languages: &langs,
      now: Utc::now(),
    };
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(1);
    let task = DueReplayMode.next_task(&ctx, &mut trackers, &mut rng).unwrap();
    assert!(task.is_none());
  }

  #[test]
  fn test_replay_emits_task_for_due_item() {
    let store = MemoryStore::new();
    let now = Utc::now();
    store.seed_seen_due_item(
      &LearningItem::new("f1", "es", ItemKind::FactCard, "ser vs estar")
        .with_translations(&["permanent vs temporary"]),
      now,
    );

    let langs = vec!["es".to_string()];
    let ctx = PracticeContext {
      items: &store,
      progress: &store,
      resources: &store,
      goals: &store,
      target_languages: &langs,
      now,
    };
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(1);
    let task = DueReplayMode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
    assert_eq!(task.task_type, TaskType::FactCardReveal);
  }

  #[test]
  fn test_replay_handles_pools_larger_than_one_batch() {
    let store = MemoryStore::new();
    let now = Utc::now();
    for i in 0..BATCH_MAX + 5 {
      store.seed_seen_due_item(
        &LearningItem::new(format!("v{i}"), "es", ItemKind::Word, &format!("palabra{i}"))
          .with_translations(&[&format!("word{i}")]),
        now,
      );
    }

    let langs = vec!["es".to_string()];
    let ctx = PracticeContext {
      items: &store,
      progress: &store,
      resources: &store,
      goals: &store,
      target_languages: &langs,
      now,
    };
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(3);
    let task = DueReplayMode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
    assert!(task.items[0].starts_with('v'));
  }
}
