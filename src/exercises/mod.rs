//! Exercise generation.
//!
//! Builders are pure given a generation context; the only I/O is fetching
//! distractor pools through the item repository. `exercises_for_item`
//! collects every exercise the item is currently eligible for and
//! `generate_exercise` picks one uniformly.

pub mod distractors;
pub mod sentences;
pub mod words;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::domain::{Direction, Exercise, ExerciseType, ItemKind, LearningItem, ProgressRecord};
use crate::repo::{ItemRepo, RepoResult};
use crate::srs::eligibility;

/// Everything a builder needs besides the item itself.
pub struct GenerationContext<'a> {
    pub items: &'a dyn ItemRepo,
    pub target_languages: &'a [String],
    pub now: DateTime<Utc>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        items: &'a dyn ItemRepo,
        target_languages: &'a [String],
        now: DateTime<Utc>,
    ) -> Self {
        Self { items, target_languages, now }
    }
}

/// First-exposure exercise for fact cards.
pub fn make_fact_card_try_to_remember(item: &LearningItem) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::TryToRemember, &item.identity_key(), -1, None),
        exercise_type: ExerciseType::TryToRemember,
        prompt: format!("Try to remember: \"{}\"", item.content),
        solution: item.translations.join(", "),
        choices: Vec::new(),
        level: -1,
        items: vec![item.uid.clone()],
        repeatable: false,
    }
}

/// Fact cards only ever cycle between try-to-remember and reveal.
pub fn make_fact_card_reveal(item: &LearningItem, level: i8) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::Reveal, &item.identity_key(), level, None),
        exercise_type: ExerciseType::Reveal,
        prompt: item.content.clone(),
        solution: item.translations.join(", "),
        choices: Vec::new(),
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    }
}

/// All exercises the item is eligible for at its current level.
///
/// Items without a translation are redirected to a single add-translation
/// exercise regardless of kind or level. Unseen items get their ladder's
/// first-exposure exercise. Choice builders that find no usable
/// distractors simply contribute nothing.
pub fn exercises_for_item(
    item: &LearningItem,
    record: &ProgressRecord,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Vec<Exercise>> {
    if !eligibility::is_practicable(item) {
        return Ok(Vec::new());
    }
    if eligibility::needs_translation(item) {
        return Ok(vec![words::make_add_translation(item)]);
    }

    match item.kind {
        ItemKind::Word => word_ladder(item, record, ctx, rng),
        ItemKind::Sentence => sentence_ladder(item, record, ctx, rng),
        ItemKind::FactCard => Ok(fact_card_ladder(item, record)),
    }
}

/// Pick one exercise uniformly among everything the item is eligible for.
pub fn generate_exercise(
    item: &LearningItem,
    record: &ProgressRecord,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Option<Exercise>> {
    let candidates = exercises_for_item(item, record, ctx, rng)?;
    Ok(candidates.choose(rng).cloned())
}

fn word_ladder(
    item: &LearningItem,
    record: &ProgressRecord,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Vec<Exercise>> {
    if record.is_unseen() {
        return Ok(vec![words::make_try_to_remember(item)]);
    }

    let level = record.level;
    let mut candidates = Vec::new();
    for direction in [Direction::TargetToNative, Direction::NativeToTarget] {
        if eligibility::word_choice_two_eligible(level, direction) {
            if let Some(exercise) = words::make_choice(item, level, direction, false, ctx, rng)? {
                candidates.push(exercise);
            }
        }
        if eligibility::word_choice_four_eligible(level, direction) {
            if let Some(exercise) = words::make_choice(item, level, direction, true, ctx, rng)? {
                candidates.push(exercise);
            }
        }
        if eligibility::word_reveal_eligible(level, direction) {
            candidates.push(words::make_reveal(item, level, direction));
        }
    }
    Ok(candidates)
}

fn sentence_ladder(
    item: &LearningItem,
    record: &ProgressRecord,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Vec<Exercise>> {
    if record.is_unseen() {
        return Ok(vec![sentences::make_guess_meaning(item)]);
    }

    let level = record.level;
    let mut candidates = Vec::new();
    if eligibility::sentence_cloze_eligible(level) && eligibility::can_cloze(item) {
        for four_options in [false, true] {
            if let Some(exercise) =
                sentences::make_cloze_choice(item, level, four_options, ctx, rng)?
            {
                candidates.push(exercise);
            }
        }
        if let Some(exercise) = sentences::make_cloze_reveal(item, level) {
            candidates.push(exercise);
        }
    }
    if eligibility::sentence_free_translate_eligible(level) {
        if let Some(exercise) = sentences::make_free_translate(item, ctx) {
            candidates.push(exercise);
        }
    }
    if eligibility::sentence_reveal_eligible(level) {
        candidates.push(sentences::make_sentence_reveal(item, level, Direction::TargetToNative));
        candidates.push(sentences::make_sentence_reveal(item, level, Direction::NativeToTarget));
    }

    // The windows leave a gap (short sentences, level 6); fall back to a
    // plain reveal rather than stalling the item.
    if candidates.is_empty() {
        candidates.push(sentences::make_sentence_reveal(item, level, Direction::TargetToNative));
    }
    Ok(candidates)
}

fn fact_card_ladder(item: &LearningItem, record: &ProgressRecord) -> Vec<Exercise> {
    if record.is_unseen() {
        vec![make_fact_card_try_to_remember(item)]
    } else {
        vec![make_fact_card_reveal(item, record.level)]
    }
}
