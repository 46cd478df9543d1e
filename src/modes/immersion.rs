//! Phased immersion: practice everything a resource links, then consume it.

use rand::RngCore;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, warn};

use crate::domain::{ItemId, Resource, Task, TaskType};
use crate::modes::generators;
use crate::modes::{Mode, PracticeContext};
use crate::repo::RepoError;
use crate::session::SessionTrackers;
use crate::srs::eligibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImmersionPhase {
  /// Drain a shuffled queue of every linked item exactly once.
  InitialRound,
  /// Drain a queue rebuilt from only the currently-due linked items.
  DueRound,
  /// Emit one consume-content task, then reset.
  ConsumeContent,
}

/// Per-session immersion state, owned by the mode value rather than
/// module-global so sessions and tests stay independent.
pub struct ImmersionState {
  resource: Option<Resource>,
  queue: Vec<ItemId>,
  phase: ImmersionPhase,
}

impl ImmersionState {
  fn new() -> Self {
    Self { resource: None, queue: Vec::new(), phase: ImmersionPhase::InitialRound }
  }

  fn reset(&mut self) {
    self.resource = None;
    self.queue.clear();
    self.phase = ImmersionPhase::InitialRound;
  }
}

/// 3-phase state machine per resource: initial round over every linked
/// vocab/fact card, a due round over what is still due, then a single
/// consume-content task. The state resets on exhaustion and on error.
pub struct ImmersionMode {
  state: ImmersionState,
}

impl ImmersionMode {
  pub fn new() -> Self {
    Self { state: ImmersionState::new() }
  }

  fn pick_resource(
    &mut self,
    ctx: &PracticeContext<'_>,
    rng: &mut dyn RngCore,
  ) -> Result<bool, RepoError> {
    let resources = ctx.resources.get_valid_immersion_resources(ctx.target_languages)?;
    let Some(resource) = resources.choose(rng) else {
      return Ok(false);
    };
    let mut queue: Vec<ItemId> = resource.linked_items().cloned().collect();
    queue.shuffle(rng);
    debug!(resource = %resource.uid, linked = queue.len(), "starting immersion round");
    self.state.resource = Some(resource.clone());
    self.state.queue = queue;
    self.state.phase = ImmersionPhase::InitialRound;
    Ok(true)
  }

  /// Rebuild the queue from the linked items that are due right now.
  fn build_due_queue(
    &mut self,
    ctx: &PracticeContext<'_>,
    rng: &mut dyn RngCore,
  ) -> Result<(), RepoError> {
    let Some(resource) = &self.state.resource else {
      return Ok(());
    };
    let mut due: Vec<ItemId> = Vec::new();
    for uid in resource.linked_items() {
      let record = generators::record_for(ctx, uid)?;
      if eligibility::is_due_now(&record, ctx.now) {
        due.push(uid.clone());
      }
    }
    due.shuffle(rng);
    self.state.queue = due;
    self.state.phase = ImmersionPhase::DueRound;
    Ok(())
  }

  fn drain_queue(
    &mut self,
    ctx: &PracticeContext<'_>,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    while let Some(uid) = self.state.queue.pop() {
      let Some(item) = ctx.items.get_by_id(&uid)? else {
        warn!(item = %uid, "linked item vanished, skipping");
        continue;
      };
      if let Some(task) = generators::task_for_item_logged(&item, ctx, rng) {
        return Ok(Some(task));
      }
    }
    Ok(None)
  }

  fn advance(
    &mut self,
    ctx: &PracticeContext<'_>,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    if self.state.resource.is_none() && !self.pick_resource(ctx, rng)? {
      return Ok(None);
    }

    loop {
      match self.state.phase {
        ImmersionPhase::InitialRound => {
          if let Some(task) = self.drain_queue(ctx, rng)? {
            return Ok(Some(task));
          }
          self.build_due_queue(ctx, rng)?;
        }
        ImmersionPhase::DueRound => {
          if let Some(task) = self.drain_queue(ctx, rng)? {
            return Ok(Some(task));
          }
          self.state.phase = ImmersionPhase::ConsumeContent;
        }
        ImmersionPhase::ConsumeContent => {
          let Some(resource) = self.state.resource.take() else {
            return Ok(None);
          };
          self.state.reset();
          return Ok(Some(Task::maintenance(
            TaskType::ConsumeResource,
            vec![resource.uid],
          )));
        }
      }
    }
  }
}

impl Default for ImmersionMode {
  fn default() -> Self {
    Self::new()
  }
}

impl Mode for ImmersionMode {
  fn name(&self) -> &'static str {
    "immersion"
  }

  fn next_task(
    &mut self,
    ctx: &PracticeContext<'_>,
    _trackers: &mut SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    match self.advance(ctx, rng) {
      Ok(task) => Ok(task),
      Err(e) => {
        // A broken round must not wedge the mode on the same resource
        self.state.reset();
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ItemKind, LearningItem};
  use crate::testing::MemoryStore;
  use chrono::Utc;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use std::collections::HashSet;

  fn seeded_resource(store: &MemoryStore) {
    for (uid, kind, content) in [
      ("v1", ItemKind::Word, "perro"),
      ("v2", ItemKind::Word, "gato"),
      ("f1", ItemKind::FactCard, "ser vs estar"),
    ] {
      store.seed_item(&LearningItem::new(uid, "es", kind, content).with_translations(&["x"]));
    }
    store.seed_resource(&Resource {
      uid: "r1".to_string(),
      title: "podcast".to_string(),
      language: "es".to_string(),
      vocab: vec!["v1".to_string(), "v2".to_string()],
      fact_cards: vec!["f1".to_string()],
      finished: false,
    });
  }

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
  fn test_no_resources_yields_none() {
    let store = MemoryStore::new();
    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut mode = ImmersionMode::new();
    assert!(mode.next_task(&ctx, &mut trackers, &mut rng).unwrap().is_none());
  }

  #[test]
  fn test_initial_round_covers_every_linked_item_once() {
    let store = MemoryStore::new();
    seeded_resource(&store);

    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(42);
    let mut mode = ImmersionMode::new();

    let mut covered = HashSet::new();
    for _ in 0..3 {
      let task = mode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
      assert_ne!(task.task_type, TaskType::ConsumeResource);
      for uid in &task.items {
        assert!(covered.insert(uid.clone()), "item {} repeated in phase 1", uid);
      }
    }
    assert_eq!(covered.len(), 3);
  }

  #[test]
  fn test_exhausted_rounds_emit_consume_and_reset() {
    crate::testing::init_tracing();
    let store = MemoryStore::new();
    seeded_resource(&store);

    let langs = vec!["es".to_string()];
    let ctx = context(&store, &langs);
    let mut trackers = SessionTrackers::new();
    let mut rng = StdRng::seed_from_u64(42);
    let mut mode = ImmersionMode::new();

    // Initial round: three tasks. No ratings are applied, so nothing is
    // due and the due round is empty.
    for _ in 0..3 {
      mode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
    }
    let consume = mode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
    assert_eq!(consume.task_type, TaskType::ConsumeResource);
    assert_eq!(consume.items, vec!["r1".to_string()]);

    // Reset: the next call starts a fresh initial round
    let next = mode.next_task(&ctx, &mut trackers, &mut rng).unwrap().unwrap();
    assert_ne!(next.task_type, TaskType::ConsumeResource);
  }
}
