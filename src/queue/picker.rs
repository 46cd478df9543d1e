//! Batch assembly: merge proposer outputs into one bounded, shuffled batch.

use rand::RngCore;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::warn;

use crate::config::EngineConfig;
use crate::domain::LearningItem;
use crate::queue::proposers::Proposer;

pub struct ItemPicker<'a> {
  proposers: Vec<Box<dyn Proposer + 'a>>,
  config: &'a EngineConfig,
}

impl<'a> ItemPicker<'a> {
  pub fn new(proposers: Vec<Box<dyn Proposer + 'a>>, config: &'a EngineConfig) -> Self {
    Self { proposers, config }
  }

  /// Assemble the next practice batch.
  ///
  /// The target size is drawn uniformly from the configured bounds; every
  /// proposer is asked for that many items. A failing proposer is logged
  /// and contributes nothing. Duplicates are removed by uid before the
  /// shuffle so one item never appears twice in a batch.
  pub fn pick_batch(&self, rng: &mut dyn RngCore) -> Vec<LearningItem> {
    let target = rand::Rng::random_range(rng, self.config.batch_min..=self.config.batch_max);

    let mut pool: Vec<LearningItem> = Vec::new();
    for proposer in &self.proposers {
      match proposer.propose(target, rng) {
        Ok(items) => pool.extend(items),
        Err(e) => warn!(proposer = proposer.name(), error = %e, "proposer failed, skipping"),
      }
    }

    let mut seen = HashSet::new();
    pool.retain(|item| seen.insert(item.uid.clone()));
    pool.shuffle(rng);
    pool.truncate(target);
    pool
  }
}
