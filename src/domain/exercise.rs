use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::item::ItemId;

/// Direction of a prompt relative to the learner's languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
  TargetToNative,
  NativeToTarget,
}

impl Direction {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TargetToNative => "target-to-native",
      Self::NativeToTarget => "native-to-target",
    }
  }
}

/// Form of a generated exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
  /// First exposure: show the item and ask the learner to memorize it
  TryToRemember,
  /// Multiple choice with one distractor
  ChooseFromTwo,
  /// Multiple choice with three distractors
  ChooseFromFour,
  /// Show the prompt, learner reveals the answer and self-rates
  Reveal,
  /// First exposure for sentences: guess the meaning, then reveal
  GuessMeaning,
  /// One sentence token hidden, pick the missing token from choices
  ClozeChoice,
  /// One sentence token hidden, recall then reveal
  ClozeReveal,
  /// Translate a sentence freely, then compare
  FreeTranslate,
  /// Form a sentence using the item(s)
  FormSentence,
  /// Maintenance: the item has no translation yet, add one
  AddTranslation,
}

impl ExerciseType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TryToRemember => "try-to-remember",
      Self::ChooseFromTwo => "choose-from-two",
      Self::ChooseFromFour => "choose-from-four",
      Self::Reveal => "reveal",
      Self::GuessMeaning => "guess-meaning",
      Self::ClozeChoice => "cloze-choice",
      Self::ClozeReveal => "cloze-reveal",
      Self::FreeTranslate => "free-translate",
      Self::FormSentence => "form-sentence",
      Self::AddTranslation => "add-translation",
    }
  }
}

/// An ephemeral exercise descriptor handed to the render layer.
///
/// Not persisted; the identity is derived from stable fields so the same
/// logical exercise is recognized across regenerations even though the
/// randomized content (distractors, hidden token) may differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
  /// Deterministic content-derived identity (hex SHA-256)
  pub id: String,
  pub exercise_type: ExerciseType,
  pub prompt: String,
  pub solution: String,
  /// Answer options for choice exercises (correct answer included), empty otherwise
  pub choices: Vec<String>,
  pub level: i8,
  /// Source item(s); two entries for pair exercises like sentence formation
  pub items: Vec<ItemId>,
  pub repeatable: bool,
}

impl Exercise {
  /// Derive the deterministic exercise identity.
  ///
  /// Only stable fields participate: exercise type, the item's identity
  /// key, level and direction. Randomized content must not feed in here.
  pub fn identity(
    exercise_type: ExerciseType,
    item_key: &str,
    level: i8,
    direction: Option<Direction>,
  ) -> String {
    let mut hasher = Sha256::new();
    hasher.update(exercise_type.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(item_key.as_bytes());
    hasher.update(b"|");
    hasher.update(level.to_string().as_bytes());
    if let Some(dir) = direction {
      hasher.update(b"|");
      hasher.update(dir.as_str().as_bytes());
    }
    hex::encode(hasher.finalize())
  }
}
