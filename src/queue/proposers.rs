//! Candidate proposers: independent sources of "interesting right now"
//! items for the next practice batch.
//!
//! Each proposer queries its own corner of the repositories. A proposer
//! returning an error never aborts batch assembly; the picker logs it and
//! moves on.

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::domain::{ItemId, LearningItem};
use crate::repo::{GoalRepo, ItemRepo, RepoResult, ResourceRepo};

/// A supplier of candidate items for the next batch.
pub trait Proposer {
  fn name(&self) -> &'static str;
  fn propose(&self, target: usize, rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>>;
}

/// Already-seen items whose current-level card is due.
pub struct DueReviewProposer<'a> {
  pub items: &'a dyn ItemRepo,
  pub languages: &'a [String],
  pub block: &'a [ItemId],
  pub now: DateTime<Utc>,
}

impl Proposer for DueReviewProposer<'_> {
  fn name(&self) -> &'static str {
    "due_review"
  }

  fn propose(&self, target: usize, _rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>> {
    self.items.get_random_already_seen_due(target, self.languages, self.block, self.now)
  }
}

/// Never-attempted items, introducing fresh material.
pub struct NewItemProposer<'a> {
  pub items: &'a dyn ItemRepo,
  pub languages: &'a [String],
  pub block: &'a [ItemId],
}

impl Proposer for NewItemProposer<'_> {
  fn name(&self) -> &'static str {
    "new_item"
  }

  fn propose(&self, target: usize, _rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>> {
    self.items.get_random_unseen(target, self.languages, self.block)
  }
}

/// Items linked to a resource the learner is close to ready to consume.
/// Prioritizing these pushes the resource over the line.
pub struct ResourceAlmostReadyProposer<'a> {
  pub items: &'a dyn ItemRepo,
  pub resources: &'a dyn ResourceRepo,
  pub languages: &'a [String],
  pub now: DateTime<Utc>,
}

impl Proposer for ResourceAlmostReadyProposer<'_> {
  fn name(&self) -> &'static str {
    "resource_almost_ready"
  }

  fn propose(&self, target: usize, rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>> {
    let resources = self.resources.get_almost_ready(self.languages, self.now)?;
    let Some(resource) = resources.choose(rng) else {
      return Ok(Vec::new());
    };
    let uids: Vec<ItemId> = resource.linked_items().cloned().collect();
    let mut linked = self.items.get_by_ids(&uids)?;
    linked.truncate(target);
    Ok(linked)
  }
}

/// Items exercised by a due example sentence: reviewing the sentence is
/// more useful when its vocabulary is warm.
pub struct ExampleLinkedProposer<'a> {
  pub items: &'a dyn ItemRepo,
  pub languages: &'a [String],
  pub block: &'a [ItemId],
  pub now: DateTime<Utc>,
}

impl Proposer for ExampleLinkedProposer<'_> {
  fn name(&self) -> &'static str {
    "example_linked"
  }

  fn propose(&self, target: usize, _rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>> {
    let due = self.items.get_random_already_seen_due(target, self.languages, self.block, self.now)?;
    let uids: Vec<ItemId> = due.iter().flat_map(|item| item.links.clone()).collect();
    let mut linked = self.items.get_by_ids(&uids)?;
    linked.truncate(target);
    Ok(linked)
  }
}

/// Vocabulary attached to one randomly chosen incomplete goal.
pub struct GoalLinkedProposer<'a> {
  pub items: &'a dyn ItemRepo,
  pub goals: &'a dyn GoalRepo,
  pub languages: &'a [String],
}

impl Proposer for GoalLinkedProposer<'_> {
  fn name(&self) -> &'static str {
    "goal_linked"
  }

  fn propose(&self, target: usize, rng: &mut dyn RngCore) -> RepoResult<Vec<LearningItem>> {
    let goals = self.goals.get_incomplete(self.languages)?;
    let Some(goal) = goals.choose(rng) else {
      return Ok(Vec::new());
    };
    let mut vocab = self.items.get_by_ids(&goal.vocab)?;
    vocab.truncate(target);
    Ok(vocab)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Goal, ItemKind, Resource};
  use crate::testing::MemoryStore;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn word(uid: &str, content: &str) -> LearningItem {
    LearningItem::new(uid, "es", ItemKind::Word, content).with_translations(&["x"])
  }

  #[test]
  fn test_due_review_proposer_excludes_unseen() {
    let store = MemoryStore::new();
    let now = Utc::now();
    store.seed_item(&word("v1", "perro"));
    store.seed_seen_due_item(&word("v2", "gato"), now);

    let langs = vec!["es".to_string()];
    let proposer = DueReviewProposer { items: &store, languages: &langs, block: &[], now };
    let mut rng = StdRng::seed_from_u64(1);
    let proposed = proposer.propose(10, &mut rng).unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].uid, "v2");
  }

  #[test]
  fn test_new_item_proposer_respects_block_list() {
    let store = MemoryStore::new();
    store.seed_item(&word("v1", "perro"));
    store.seed_item(&word("v2", "gato"));

    let langs = vec!["es".to_string()];
    let block = vec!["v1".to_string()];
    let proposer = NewItemProposer { items: &store, languages: &langs, block: &block };
    let mut rng = StdRng::seed_from_u64(1);
    let proposed = proposer.propose(10, &mut rng).unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].uid, "v2");
  }

  #[test]
  fn test_goal_linked_proposer_surfaces_goal_vocab() {
    let store = MemoryStore::new();
    store.seed_item(&word("v1", "perro"));
    store.seed_item(&word("v2", "gato"));
    store.seed_goal(&Goal {
      uid: "g1".to_string(),
      title: "animals".to_string(),
      language: "es".to_string(),
      vocab: vec!["v1".to_string(), "v2".to_string()],
      completed: false,
    });

    let langs = vec!["es".to_string()];
    let proposer = GoalLinkedProposer { items: &store, goals: &store, languages: &langs };
    let mut rng = StdRng::seed_from_u64(1);
    let proposed = proposer.propose(10, &mut rng).unwrap();
    assert_eq!(proposed.len(), 2);
  }

  #[test]
  fn test_resource_proposer_empty_without_resources() {
    let store = MemoryStore::new();
    let langs = vec!["es".to_string()];
    let proposer = ResourceAlmostReadyProposer {
      items: &store,
      resources: &store,
      languages: &langs,
      now: Utc::now(),
    };
    let mut rng = StdRng::seed_from_u64(1);
    assert!(proposer.propose(10, &mut rng).unwrap().is_empty());
  }

  #[test]
  fn test_resource_proposer_returns_linked_items() {
    let store = MemoryStore::new();
    let now = Utc::now();
    store.seed_seen_due_item(&word("v1", "perro"), now);
    store.seed_seen_due_item(&word("f1", "ser vs estar"), now);
    store.seed_resource(&Resource {
      uid: "r1".to_string(),
      title: "podcast".to_string(),
      language: "es".to_string(),
      vocab: vec!["v1".to_string()],
      fact_cards: vec!["f1".to_string()],
      finished: false,
    });

    let langs = vec!["es".to_string()];
    let proposer =
      ResourceAlmostReadyProposer { items: &store, resources: &store, languages: &langs, now };
    let mut rng = StdRng::seed_from_u64(1);
    let proposed = proposer.propose(10, &mut rng).unwrap();
    assert_eq!(proposed.len(), 2);
  }

  #[test]
  fn test_example_linked_proposer_follows_links() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let mut sentence = LearningItem::new("s1", "es", ItemKind::Sentence, "el perro come")
      .with_translations(&["the dog eats"]);
    sentence.links = vec!["v1".to_string()];
    store.seed_seen_due_item(&sentence, now);
    store.seed_item(&word("v1", "perro"));

    let langs = vec!["es".to_string()];
    let proposer =
      ExampleLinkedProposer { items: &store, languages: &langs, block: &[], now };
    let mut rng = StdRng::seed_from_u64(1);
    let proposed = proposer.propose(10, &mut rng).unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].uid, "v1");
  }
}
