use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;

/// Discrete FSRS memory phase of a scheduling card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardPhase {
  New,
  Learning,
  Review,
  Relearning,
}

impl CardPhase {
  pub fn from_str(s: &str) -> Self {
    match s {
      "Learning" => Self::Learning,
      "Review" => Self::Review,
      "Relearning" => Self::Relearning,
      _ => Self::New,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "New",
      Self::Learning => "Learning",
      Self::Review => "Review",
      Self::Relearning => "Relearning",
    }
  }
}

impl From<rs_fsrs::State> for CardPhase {
  fn from(state: rs_fsrs::State) -> Self {
    match state {
      rs_fsrs::State::New => Self::New,
      rs_fsrs::State::Learning => Self::Learning,
      rs_fsrs::State::Review => Self::Review,
      rs_fsrs::State::Relearning => Self::Relearning,
    }
  }
}

impl From<CardPhase> for rs_fsrs::State {
  fn from(phase: CardPhase) -> Self {
    match phase {
      CardPhase::New => Self::New,
      CardPhase::Learning => Self::Learning,
      CardPhase::Review => Self::Review,
      CardPhase::Relearning => Self::Relearning,
    }
  }
}

/// Scheduling state for one (item, mastery level) pair.
///
/// Field-for-field mirror of the FSRS card, owned by the engine so the
/// domain model stays serializable without leaning on scheduler internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingCard {
  pub due: DateTime<Utc>,
  pub stability: f64,
  pub difficulty: f64,
  pub elapsed_days: i64,
  pub scheduled_days: i64,
  pub reps: i32,
  pub lapses: i32,
  pub phase: CardPhase,
  pub last_review: DateTime<Utc>,
}

impl SchedulingCard {
  /// Fresh card, due immediately.
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      due: now,
      stability: 0.0,
      difficulty: 0.0,
      elapsed_days: 0,
      scheduled_days: 0,
      reps: 0,
      lapses: 0,
      phase: CardPhase::New,
      last_review: now,
    }
  }
}

impl From<rs_fsrs::Card> for SchedulingCard {
  fn from(card: rs_fsrs::Card) -> Self {
    Self {
      due: card.due,
      stability: card.stability,
      difficulty: card.difficulty,
      elapsed_days: card.elapsed_days,
      scheduled_days: card.scheduled_days,
      reps: card.reps,
      lapses: card.lapses,
      phase: card.state.into(),
      last_review: card.last_review,
    }
  }
}

impl From<&SchedulingCard> for rs_fsrs::Card {
  fn from(card: &SchedulingCard) -> Self {
    let mut out = rs_fsrs::Card::new();
    out.due = card.due;
    out.stability = card.stability;
    out.difficulty = card.difficulty;
    out.elapsed_days = card.elapsed_days;
    out.scheduled_days = card.scheduled_days;
    out.reps = card.reps;
    out.lapses = card.lapses;
    out.state = card.phase.into();
    out.last_review = card.last_review;
    out
  }
}

/// Mastery level of an item. -1 means never attempted.
pub const LEVEL_UNSEEN: i8 = -1;

/// Per-item practice progress: one scheduling card per mastery level,
/// the current mastery level and a consecutive-success streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub item: ItemId,
  pub level: i8,
  pub streak: u32,
  /// One card per mastery level the item has been practiced at.
  /// No entry exists for a level that was never rated.
  pub cards: BTreeMap<u8, SchedulingCard>,
}

impl ProgressRecord {
  /// Record for an item that has never been attempted.
  pub fn unseen(item: impl Into<ItemId>) -> Self {
    Self {
      item: item.into(),
      level: LEVEL_UNSEEN,
      streak: 0,
      cards: BTreeMap::new(),
    }
  }

  pub fn is_unseen(&self) -> bool {
    self.level == LEVEL_UNSEEN
  }

  pub fn card_at(&self, level: u8) -> Option<&SchedulingCard> {
    self.cards.get(&level)
  }

  /// The card for the current mastery level, if one exists yet.
  pub fn current_card(&self) -> Option<&SchedulingCard> {
    if self.level < 0 {
      return None;
    }
    self.cards.get(&(self.level as u8))
  }
}
