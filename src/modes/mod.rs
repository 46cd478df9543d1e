//! Mode strategies: pluggable "next task" policies.
//!
//! Every mode combines the same primitives (eligibility, generators,
//! trackers) under a different selection policy. A mode returning
//! `Ok(None)` means legitimate exhaustion, not an error; the caller shows
//! an empty state.

pub mod balanced;
pub mod generators;
pub mod immersion;
pub mod random;
pub mod replay;

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::domain::{ExerciseType, ItemKind, Task, TaskType};
use crate::repo::{GoalRepo, ItemRepo, ProgressRepo, RepoError, ResourceRepo};
use crate::session::SessionTrackers;

pub use balanced::SizeBalancedMode;
pub use immersion::{ImmersionMode, ImmersionState};
pub use random::UltraRandomMode;
pub use replay::DueReplayMode;

/// Shared read context handed to every mode invocation.
pub struct PracticeContext<'a> {
  pub items: &'a dyn ItemRepo,
  pub progress: &'a dyn ProgressRepo,
  pub resources: &'a dyn ResourceRepo,
  pub goals: &'a dyn GoalRepo,
  pub target_languages: &'a [String],
  pub now: DateTime<Utc>,
}

/// A complete task-selection policy.
pub trait Mode {
  fn name(&self) -> &'static str;

  /// Produce the next task, or `None` when nothing is available.
  fn next_task(
    &mut self,
    ctx: &PracticeContext<'_>,
    trackers: &mut SessionTrackers,
    rng: &mut dyn RngCore,
  ) -> Result<Option<Task>, RepoError>;
}

/// Task family an exercise belongs to, given the kind of its source item.
pub fn task_type_for(exercise_type: ExerciseType, kind: ItemKind) -> TaskType {
  match exercise_type {
    ExerciseType::TryToRemember => match kind {
      ItemKind::FactCard => TaskType::FactCardTryToRemember,
      _ => TaskType::VocabTryToRemember,
    },
    ExerciseType::ChooseFromTwo | ExerciseType::ChooseFromFour => TaskType::VocabSingleChoice,
    ExerciseType::Reveal => match kind {
      ItemKind::FactCard => TaskType::FactCardReveal,
      _ => TaskType::VocabReveal,
    },
    ExerciseType::GuessMeaning => TaskType::GuessWhatSentenceMeans,
    ExerciseType::ClozeChoice => TaskType::ClozeChoice,
    ExerciseType::ClozeReveal => TaskType::ClozeReveal,
    ExerciseType::FreeTranslate => TaskType::FreeTranslate,
    ExerciseType::FormSentence => TaskType::VocabFormSentence,
    ExerciseType::AddTranslation => TaskType::VocabAddTranslation,
  }
}
