//! Fully random mode: any task family, never the same one twice in a row.

use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::domain::{Task, TaskType};
use crate::modes::generators;
use crate::modes::{Mode, PracticeContext};
use crate::repo::RepoError;
use crate::session::SessionTrackers;

/// Shuffles the whole generator registry, excludes the immediately
/// previous task's type, and takes the first family that produces a task.
pub struct UltraRandomMode;

impl Mode for UltraRandomMode {
  fn name(&self) -> &'static str {
    "ultra_random"
  }

  fn next_task(
    &mut self,
    ctx: &PracticeContext<'_>,
    trackers: &mut SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError> {
    let mut registry: Vec<TaskType> =
      TaskType::ALL.iter().copied().filter(|t| Some(*t) != trackers.types.last()).collect();
    registry.shuffle(rng);

    for task_type in registry {
      match generators::generate(task_type, ctx, trackers, rng) {
        Ok(Some(task)) => return Ok(Some(task)),
        Ok(None) => {}
        Err(e) => {
          warn!(family = task_type.as_str(), error = %e, "generator failed, trying next family");
        }
      }
    }
    Ok(None)
  }
}
