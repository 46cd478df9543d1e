//! Per-task-family generators and their dispatch table.
//!
//! `generate` is the validated registry: dispatch happens on the
//! `TaskType` enum, so there is no string-keyed lookup that could silently
//! miss. Each family fetches its own candidates; `Ok(None)` means "this
//! family has nothing right now", which a mode treats as a fallthrough.

use rand::RngCore;
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::domain::{
  Direction, ItemKind, LearningItem, ProgressRecord, Task, TaskType,
};
use crate::exercises::{self, GenerationContext, sentences, words};
use crate::modes::{PracticeContext, task_type_for};
use crate::repo::RepoResult;
use crate::session::SessionTrackers;
use crate::srs::eligibility;

const CANDIDATE_SAMPLE: usize = 10;

/// Progress record for an item, or a fresh unseen record.
pub fn record_for(ctx: &PracticeContext<'_>, uid: &str) -> RepoResult<ProgressRecord> {
  Ok(ctx.progress.get(uid)?.unwrap_or_else(|| ProgressRecord::unseen(uid)))
}

/// Wrap an item's uniformly-picked exercise into a task, if it has one.
pub fn task_for_item(
  item: &LearningItem,
  ctx: &PracticeContext<'_>,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let record = record_for(ctx, &item.uid)?;
  let generation = GenerationContext::new(ctx.items, ctx.target_languages, ctx.now);
  let Some(exercise) = exercises::generate_exercise(item, &record, &generation, rng)? else {
    return Ok(None);
  };
  let task_type = task_type_for(exercise.exercise_type, item.kind);
  Ok(Some(Task::from_exercise(task_type, exercise)))
}

/// Same as [`task_for_item`] but failures are logged and swallowed, per
/// the mode-boundary failure contract.
pub fn task_for_item_logged(
  item: &LearningItem,
  ctx: &PracticeContext<'_>,
  rng: &mut dyn RngCore,
) -> Option<Task> {
  match task_for_item(item, ctx, rng) {
    Ok(task) => task,
    Err(e) => {
      warn!(item = %item.uid, error = %e, "exercise generation failed, skipping item");
      None
    }
  }
}

/// Produce a task of the given family, or `None` if the family has no
/// eligible material.
pub fn generate(
  task_type: TaskType,
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  match task_type {
    TaskType::VocabTryToRemember => unseen_of_kind(ItemKind::Word, ctx, trackers, rng),
    TaskType::VocabSingleChoice => due_choice(ctx, trackers, rng),
    TaskType::VocabReveal => due_word_reveal(ctx, trackers, rng),
    TaskType::ClozeChoice | TaskType::ClozeReveal => due_cloze(task_type, ctx, trackers, rng),
    TaskType::GuessWhatSentenceMeans => unseen_of_kind(ItemKind::Sentence, ctx, trackers, rng),
    TaskType::FreeTranslate => due_free_translate(ctx, trackers, rng),
    TaskType::VocabFormSentence => due_form_sentence(ctx, trackers, rng),
    TaskType::VocabAddTranslation => untranslated(ctx, rng),
    TaskType::FactCardTryToRemember => unseen_of_kind(ItemKind::FactCard, ctx, trackers, rng),
    TaskType::FactCardReveal => due_fact_card_reveal(ctx, trackers, rng),
    TaskType::GoalAddVocab | TaskType::GoalAddSubGoals => goal_maintenance(task_type, ctx, rng),
    TaskType::ResourceExtractKnowledge => resource_extract(ctx, rng),
    TaskType::ConsumeResource => consume_resource(ctx, rng),
  }
}

fn sample_unseen(
  kind: ItemKind,
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
) -> RepoResult<Vec<LearningItem>> {
  let block = trackers.items.block_list();
  let unseen = ctx.items.get_random_unseen(CANDIDATE_SAMPLE, ctx.target_languages, &block)?;
  // Untranslated items belong to the add-translation family only
  Ok(unseen.into_iter().filter(|item| item.kind == kind && item.has_translation()).collect())
}

fn sample_due(
  kind: ItemKind,
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
) -> RepoResult<Vec<LearningItem>> {
  let block = trackers.items.block_list();
  let due = ctx.items.get_random_already_seen_due(
    CANDIDATE_SAMPLE,
    ctx.target_languages,
    &block,
    ctx.now,
  )?;
  Ok(due.into_iter().filter(|item| item.kind == kind && item.has_translation()).collect())
}

fn unseen_of_kind(
  kind: ItemKind,
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let candidates = sample_unseen(kind, ctx, trackers)?;
  let Some(item) = candidates.choose(rng) else {
    return Ok(None);
  };
  task_for_item(item, ctx, rng)
}

fn due_choice(
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let generation = GenerationContext::new(ctx.items, ctx.target_languages, ctx.now);
  for item in sample_due(ItemKind::Word, ctx, trackers)? {
    let record = record_for(ctx, &item.uid)?;
    for direction in [Direction::TargetToNative, Direction::NativeToTarget] {
      let four = eligibility::word_choice_four_eligible(record.level, direction);
      if four || eligibility::word_choice_two_eligible(record.level, direction) {
        if let Some(exercise) =
          words::make_choice(&item, record.level, direction, four, &generation, rng)?
        {
          let task_type = task_type_for(exercise.exercise_type, item.kind);
          return Ok(Some(Task::from_exercise(task_type, exercise)));
        }
      }
    }
  }
  Ok(None)
}

fn due_word_reveal(
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  for item in sample_due(ItemKind::Word, ctx, trackers)? {
    let record = record_for(ctx, &item.uid)?;
    let directions: Vec<Direction> = [Direction::TargetToNative, Direction::NativeToTarget]
      .into_iter()
      .filter(|d| eligibility::word_reveal_eligible(record.level, *d))
      .collect();
    if let Some(direction) = directions.choose(rng) {
      let exercise = words::make_reveal(&item, record.level, *direction);
      return Ok(Some(Task::from_exercise(TaskType::VocabReveal, exercise)));
    }
  }
  Ok(None)
}

fn due_cloze(
  task_type: TaskType,
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let generation = GenerationContext::new(ctx.items, ctx.target_languages, ctx.now);
  for item in sample_due(ItemKind::Sentence, ctx, trackers)? {
    let record = record_for(ctx, &item.uid)?;
    if !eligibility::sentence_cloze_eligible(record.level) || !eligibility::can_cloze(&item) {
      continue;
    }
    let exercise = match task_type {
      TaskType::ClozeChoice => {
        let four = rand::Rng::random_bool(rng, 0.5);
        sentences::make_cloze_choice(&item, record.level, four, &generation, rng)?
      }
      _ => sentences::make_cloze_reveal(&item, record.level),
    };
    if let Some(exercise) = exercise {
      return Ok(Some(Task::from_exercise(task_type, exercise)));
    }
  }
  Ok(None)
}

fn due_free_translate(
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  _rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let generation = GenerationContext::new(ctx.items, ctx.target_languages, ctx.now);
  for item in sample_due(ItemKind::Sentence, ctx, trackers)? {
    let record = record_for(ctx, &item.uid)?;
    if !eligibility::sentence_free_translate_eligible(record.level) {
      continue;
    }
    if let Some(exercise) = sentences::make_free_translate(&item, &generation) {
      return Ok(Some(Task::from_exercise(TaskType::FreeTranslate, exercise)));
    }
  }
  Ok(None)
}

fn due_form_sentence(
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let candidates = sample_due(ItemKind::Word, ctx, trackers)?;
  let Some(item) = candidates.choose(rng) else {
    return Ok(None);
  };
  let record = record_for(ctx, &item.uid)?;
  let exercise = words::make_form_sentence(item, record.level);
  Ok(Some(Task::from_exercise(TaskType::VocabFormSentence, exercise)))
}

fn untranslated(ctx: &PracticeContext<'_>, rng: &mut dyn RngCore) -> RepoResult<Option<Task>> {
  let all = ctx.items.get_all()?;
  let candidates: Vec<&LearningItem> = all
    .iter()
    .filter(|item| {
      ctx.target_languages.contains(&item.language)
        && eligibility::is_practicable(item)
        && eligibility::needs_translation(item)
        && eligibility::wants_maintenance(item)
    })
    .collect();
  let Some(item) = candidates.choose(rng) else {
    return Ok(None);
  };
  let exercise = words::make_add_translation(item);
  Ok(Some(Task::from_exercise(TaskType::VocabAddTranslation, exercise)))
}

fn due_fact_card_reveal(
  ctx: &PracticeContext<'_>,
  trackers: &SessionTrackers,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let candidates = sample_due(ItemKind::FactCard, ctx, trackers)?;
  let Some(item) = candidates.choose(rng) else {
    return Ok(None);
  };
  let record = record_for(ctx, &item.uid)?;
  let exercise = exercises::make_fact_card_reveal(item, record.level);
  Ok(Some(Task::from_exercise(TaskType::FactCardReveal, exercise)))
}

fn goal_maintenance(
  task_type: TaskType,
  ctx: &PracticeContext<'_>,
  rng: &mut dyn RngCore,
) -> RepoResult<Option<Task>> {
  let goals = ctx.goals.get_incomplete(ctx.target_languages)?;
  let Some(goal) = goals.choose(rng) else {
    return Ok(None);
  };
  Ok(Some(Task::maintenance(task_type, vec![goal.uid.clone()])))
}

fn resource_extract(ctx: &PracticeContext<'_>, rng: &mut dyn RngCore) -> RepoResult<Option<Task>> {
  let resources = ctx.resources.get_valid_immersion_resources(ctx.target_languages)?;
  let Some(resource) = resources.choose(rng) else {
    return Ok(None);
  };
  Ok(Some(Task::maintenance(TaskType::ResourceExtractKnowledge, vec![resource.uid.clone()])))
}

fn consume_resource(ctx: &PracticeContext<'_>, rng: &mut dyn RngCore) -> RepoResult<Option<Task>> {
  let resources = ctx.resources.get_almost_ready(ctx.target_languages, ctx.now)?;
  let Some(resource) = resources.choose(rng) else {
    return Ok(None);
  };
  Ok(Some(Task::maintenance(TaskType::ConsumeResource, vec![resource.uid.clone()])))
}
