//! Pure eligibility predicates over items and progress records.
//!
//! No I/O happens here; callers hand in already-fetched data. The word and
//! sentence level windows are kept as two separate tables on purpose: the
//! ladders unlock at different boundaries.

use chrono::{DateTime, Utc};

use crate::config::MAINTENANCE_MIN_PRIORITY;
use crate::domain::{Direction, LearningItem, ProgressRecord};
use crate::srs::scheduler;

/// Never attempted at all.
pub fn is_unseen(record: &ProgressRecord) -> bool {
  record.is_unseen()
}

/// Due at a specific mastery level. A level without a card has never been
/// practiced there and counts as due.
pub fn is_due_at_level(record: &ProgressRecord, level: u8, now: DateTime<Utc>) -> bool {
  match record.card_at(level) {
    Some(card) => scheduler::peek_due(card, now),
    None => true,
  }
}

/// Due at the item's current mastery level.
pub fn is_due_now(record: &ProgressRecord, now: DateTime<Utc>) -> bool {
  if record.is_unseen() {
    return false;
  }
  is_due_at_level(record, record.level.max(0) as u8, now)
}

/// Structural gate applying to every exercise family.
pub fn is_practicable(item: &LearningItem) -> bool {
  !item.do_not_practice && !item.content.is_empty()
}

/// An item without any translation cannot back a learning exercise and is
/// redirected to translation maintenance instead.
pub fn needs_translation(item: &LearningItem) -> bool {
  !item.has_translation()
}

/// Maintenance work (adding a missing translation) is only offered for
/// items the learner bumped above the default priority.
pub fn wants_maintenance(item: &LearningItem) -> bool {
  item.priority >= MAINTENANCE_MIN_PRIORITY
}

/// Cloze needs at least two tokens to hide one meaningfully.
pub fn can_cloze(item: &LearningItem) -> bool {
  item.token_count() >= 2 && item.has_translation()
}

// ==================== Word ladder windows ====================

pub fn word_choice_two_eligible(level: i8, direction: Direction) -> bool {
  match direction {
    Direction::TargetToNative => (0..=1).contains(&level),
    Direction::NativeToTarget => (1..=2).contains(&level),
  }
}

pub fn word_choice_four_eligible(level: i8, direction: Direction) -> bool {
  match direction {
    Direction::TargetToNative => (1..=2).contains(&level),
    Direction::NativeToTarget => (2..=3).contains(&level),
  }
}

pub fn word_reveal_eligible(level: i8, direction: Direction) -> bool {
  match direction {
    Direction::TargetToNative => level >= 3,
    Direction::NativeToTarget => level >= 4,
  }
}

// ==================== Sentence ladder windows ====================

pub fn sentence_cloze_eligible(level: i8) -> bool {
  (0..=5).contains(&level)
}

pub fn sentence_free_translate_eligible(level: i8) -> bool {
  level == 0
}

pub fn sentence_reveal_eligible(level: i8) -> bool {
  level > 6
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ItemKind, Rating};
  use crate::srs::progress_model::apply_rating;

  fn word(uid: &str) -> LearningItem {
    LearningItem::new(uid, "es", ItemKind::Word, "perro").with_translations(&["dog"])
  }

  #[test]
  fn test_unseen_has_no_cards_at_any_level() {
    let record = ProgressRecord::unseen("v1");
    assert!(is_unseen(&record));
    for level in 0..10 {
      assert!(record.card_at(level).is_none());
    }
  }

  #[test]
  fn test_missing_card_counts_as_due() {
    let record = ProgressRecord::unseen("v1");
    assert!(is_due_at_level(&record, 3, Utc::now()));
  }

  #[test]
  fn test_is_due_at_level_is_idempotent() {
    let now = Utc::now();
    let record = apply_rating(None, &"v1".to_string(), 0, Rating::Doable, now);
    let first = is_due_at_level(&record, 0, now);
    let second = is_due_at_level(&record, 0, now);
    assert_eq!(first, second);
    assert!(!first); // just scheduled, not due yet
  }

  #[test]
  fn test_is_due_now_false_for_unseen() {
    let record = ProgressRecord::unseen("v1");
    assert!(!is_due_now(&record, Utc::now()));
  }

  #[test]
  fn test_do_not_practice_gate() {
    let mut item = word("v1");
    assert!(is_practicable(&item));
    item.do_not_practice = true;
    assert!(!is_practicable(&item));
  }

  #[test]
  fn test_translation_gates() {
    let item = word("v1");
    assert!(!needs_translation(&item));
    let bare = LearningItem::new("v2", "es", ItemKind::Word, "gato");
    assert!(needs_translation(&bare));
  }

  #[test]
  fn test_maintenance_priority_gate() {
    let mut item = word("v1");
    assert!(!wants_maintenance(&item)); // default priority is 1
    item.priority = 2;
    assert!(wants_maintenance(&item));
  }

  #[test]
  fn test_cloze_needs_two_tokens() {
    let sentence =
      LearningItem::new("s1", "es", ItemKind::Sentence, "el perro come").with_translations(&["the dog eats"]);
    assert!(can_cloze(&sentence));
    let short = LearningItem::new("s2", "es", ItemKind::Sentence, "hola").with_translations(&["hi"]);
    assert!(!can_cloze(&short));
  }

  #[test]
  fn test_word_ladder_windows() {
    assert!(word_choice_two_eligible(0, Direction::TargetToNative));
    assert!(word_choice_two_eligible(1, Direction::TargetToNative));
    assert!(!word_choice_two_eligible(2, Direction::TargetToNative));
    assert!(word_choice_four_eligible(2, Direction::NativeToTarget));
    assert!(!word_choice_four_eligible(4, Direction::NativeToTarget));
    assert!(word_reveal_eligible(3, Direction::TargetToNative));
    assert!(!word_reveal_eligible(3, Direction::NativeToTarget));
    assert!(word_reveal_eligible(4, Direction::NativeToTarget));
  }

  #[test]
  fn test_sentence_ladder_windows_are_distinct_from_word_ladder() {
    assert!(sentence_cloze_eligible(5));
    assert!(!sentence_cloze_eligible(6));
    // Sentence reveal unlocks strictly above 6, not at 3 like words
    assert!(!sentence_reveal_eligible(6));
    assert!(sentence_reveal_eligible(7));
    assert!(sentence_free_translate_eligible(0));
    assert!(!sentence_free_translate_eligible(1));
  }
}
