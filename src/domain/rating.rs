use serde::{Deserialize, Serialize};

/// How the learner judged their own recall, 1..4.
///
/// Maps onto the four FSRS ratings: Impossible=Again, Hard=Hard,
/// Doable=Good, Easy=Easy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
  Impossible = 1,
  Hard = 2,
  Doable = 3,
  Easy = 4,
}

impl Rating {
  pub fn from_u8(v: u8) -> Option<Self> {
    match v {
      1 => Some(Self::Impossible),
      2 => Some(Self::Hard),
      3 => Some(Self::Doable),
      4 => Some(Self::Easy),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Impossible => "impossible",
      Self::Hard => "hard",
      Self::Doable => "doable",
      Self::Easy => "easy",
    }
  }

  /// Ratings at or above Doable count as a pass.
  pub fn is_passing(&self) -> bool {
    *self >= Self::Doable
  }

  pub fn to_fsrs(self) -> rs_fsrs::Rating {
    match self {
      Self::Impossible => rs_fsrs::Rating::Again,
      Self::Hard => rs_fsrs::Rating::Hard,
      Self::Doable => rs_fsrs::Rating::Good,
      Self::Easy => rs_fsrs::Rating::Easy,
    }
  }
}
