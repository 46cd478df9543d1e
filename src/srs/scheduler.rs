use chrono::{DateTime, Utc};
use rs_fsrs::{FSRS, Parameters};

use crate::config::EngineConfig;
use crate::domain::{Rating, SchedulingCard};

/// Scheduled outcome for every possible rating, for prospective interval
/// display ("Easy: 4d") without committing a review.
#[derive(Debug, Clone)]
pub struct SchedulePreview {
  pub impossible: SchedulingCard,
  pub hard: SchedulingCard,
  pub doable: SchedulingCard,
  pub easy: SchedulingCard,
}

impl SchedulePreview {
  pub fn for_rating(&self, rating: Rating) -> &SchedulingCard {
    match rating {
      Rating::Impossible => &self.impossible,
      Rating::Hard => &self.hard,
      Rating::Doable => &self.doable,
      Rating::Easy => &self.easy,
    }
  }
}

/// Compute the next scheduling state for a card given a rating.
///
/// Pure function: no prior card means a fresh card is seeded at `now` and
/// scheduled from there. The returned due date is strictly after `now`
/// except possibly on the lowest rating, where a short same-session
/// relearning interval is acceptable.
pub fn schedule(card: Option<&SchedulingCard>, now: DateTime<Utc>, rating: Rating) -> SchedulingCard {
  let current = match card {
    Some(card) => card.clone(),
    None => SchedulingCard::new(now),
  };
  preview(&current, now).for_rating(rating).clone()
}

/// Simulate all four rating outcomes without mutating anything.
pub fn preview(card: &SchedulingCard, now: DateTime<Utc>) -> SchedulePreview {
  preview_with_retention(card, now, EngineConfig::default().desired_retention)
}

/// Like [`preview`], against an explicit desired-retention target.
///
/// Higher retention shortens the intervals. Callers with a loaded
/// [`EngineConfig`] pass its `desired_retention` here.
pub fn preview_with_retention(
  card: &SchedulingCard,
  now: DateTime<Utc>,
  desired_retention: f64,
) -> SchedulePreview {
  let fsrs = FSRS::new(Parameters {
    request_retention: desired_retention,
    ..Parameters::default()
  });
  let record_log = fsrs.repeat(card.into(), now);
  let pick = |rating: Rating| record_log[&rating.to_fsrs()].card.clone().into();
  SchedulePreview {
    impossible: pick(Rating::Impossible),
    hard: pick(Rating::Hard),
    doable: pick(Rating::Doable),
    easy: pick(Rating::Easy),
  }
}

/// Is the card due at `now`? Pure predicate over the stored due date.
pub fn peek_due(card: &SchedulingCard, now: DateTime<Utc>) -> bool {
  card.due <= now
}
