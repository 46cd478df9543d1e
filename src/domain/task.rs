use serde::{Deserialize, Serialize};

use crate::domain::exercise::Exercise;
use crate::domain::item::ItemId;

/// Coarse effort class of a task, consulted by the size tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSize {
  Small,
  Medium,
  Big,
}

impl TaskSize {
  pub const ALL: [TaskSize; 3] = [TaskSize::Small, TaskSize::Medium, TaskSize::Big];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Small => "small",
      Self::Medium => "medium",
      Self::Big => "big",
    }
  }
}

/// Every task family the engine can emit.
///
/// The variant set is the validated registry: dispatch happens on the enum,
/// so an unknown task type is unrepresentable rather than a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
  VocabTryToRemember,
  VocabSingleChoice,
  VocabReveal,
  ClozeChoice,
  ClozeReveal,
  GuessWhatSentenceMeans,
  FreeTranslate,
  VocabFormSentence,
  VocabAddTranslation,
  FactCardTryToRemember,
  FactCardReveal,
  GoalAddVocab,
  GoalAddSubGoals,
  ResourceExtractKnowledge,
  ConsumeResource,
}

impl TaskType {
  pub const ALL: [TaskType; 15] = [
    TaskType::VocabTryToRemember,
    TaskType::VocabSingleChoice,
    TaskType::VocabReveal,
    TaskType::ClozeChoice,
    TaskType::ClozeReveal,
    TaskType::GuessWhatSentenceMeans,
    TaskType::FreeTranslate,
    TaskType::VocabFormSentence,
    TaskType::VocabAddTranslation,
    TaskType::FactCardTryToRemember,
    TaskType::FactCardReveal,
    TaskType::GoalAddVocab,
    TaskType::GoalAddSubGoals,
    TaskType::ResourceExtractKnowledge,
    TaskType::ConsumeResource,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::VocabTryToRemember => "vocab-try-to-remember",
      Self::VocabSingleChoice => "vocab-single-choice",
      Self::VocabReveal => "vocab-reveal",
      Self::ClozeChoice => "cloze-choice",
      Self::ClozeReveal => "cloze-reveal",
      Self::GuessWhatSentenceMeans => "guess-what-sentence-means",
      Self::FreeTranslate => "free-translate",
      Self::VocabFormSentence => "vocab-form-sentence",
      Self::VocabAddTranslation => "vocab-add-translation",
      Self::FactCardTryToRemember => "fact-card-try-to-remember",
      Self::FactCardReveal => "fact-card-reveal",
      Self::GoalAddVocab => "goal-add-vocab",
      Self::GoalAddSubGoals => "goal-add-sub-goals",
      Self::ResourceExtractKnowledge => "resource-extract-knowledge",
      Self::ConsumeResource => "consume-resource",
    }
  }

  /// Size class of this family, fixed at construction time.
  pub fn size(&self) -> TaskSize {
    match self {
      Self::VocabTryToRemember
      | Self::VocabSingleChoice
      | Self::VocabReveal
      | Self::ClozeChoice
      | Self::ClozeReveal
      | Self::GuessWhatSentenceMeans
      | Self::FactCardTryToRemember
      | Self::FactCardReveal => TaskSize::Small,
      Self::FreeTranslate
      | Self::VocabFormSentence
      | Self::VocabAddTranslation
      | Self::GoalAddVocab => TaskSize::Medium,
      Self::GoalAddSubGoals | Self::ResourceExtractKnowledge | Self::ConsumeResource => {
        TaskSize::Big
      }
    }
  }

  /// Task families of a given size class.
  pub fn of_size(size: TaskSize) -> Vec<TaskType> {
    Self::ALL.iter().copied().filter(|t| t.size() == size).collect()
  }
}

/// A unit of work handed to the render layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
  pub task_type: TaskType,
  pub items: Vec<ItemId>,
  /// The wrapped exercise for exercise-backed tasks; maintenance tasks
  /// (add translation, consume resource, ...) carry none
  pub exercise: Option<Exercise>,
  /// A one-time task is discarded after completion instead of re-queued
  pub one_time: bool,
  /// Learner asked to see this task again this session
  pub do_again: bool,
}

impl Task {
  pub fn from_exercise(task_type: TaskType, exercise: Exercise) -> Self {
    Self {
      task_type,
      items: exercise.items.clone(),
      one_time: !exercise.repeatable,
      exercise: Some(exercise),
      do_again: false,
    }
  }

  pub fn maintenance(task_type: TaskType, items: Vec<ItemId>) -> Self {
    Self {
      task_type,
      items,
      exercise: None,
      one_time: true,
      do_again: false,
    }
  }

  pub fn size(&self) -> TaskSize {
    self.task_type.size()
  }
}
