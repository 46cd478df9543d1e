//! Exercise builders for word-like items.
//!
//! The word ladder: try-to-remember at first exposure, then choice
//! exercises of growing width and flipped direction, then reveal cards in
//! both directions. Eligibility windows live in `srs::eligibility`.

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::config::{CHOICE_FOUR_DISTRACTORS, CHOICE_TWO_DISTRACTORS};
use crate::domain::{Direction, Exercise, ExerciseType, LearningItem};
use crate::exercises::GenerationContext;
use crate::exercises::distractors::generate_distractors;
use crate::repo::RepoResult;

/// First-exposure exercise: show the word with its translations.
pub fn make_try_to_remember(item: &LearningItem) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::TryToRemember, &item.identity_key(), -1, None),
        exercise_type: ExerciseType::TryToRemember,
        prompt: format!("Try to remember this word: \"{}\"", item.content),
        solution: format!("Translations: {}", item.translations.join(", ")),
        choices: Vec::new(),
        level: -1,
        items: vec![item.uid.clone()],
        repeatable: false,
    }
}

/// Choice exercise with `n`-way options (2 or 4).
///
/// Returns `None` when no distractor can be found; the caller skips the
/// exercise. The identity ignores which distractors were drawn.
pub fn make_choice(
    item: &LearningItem,
    level: i8,
    direction: Direction,
    four_options: bool,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Option<Exercise>> {
    let Some(first_translation) = item.translations.first() else {
        return Ok(None);
    };

    let (prompt_text, correct): (&str, &str) = match direction {
        Direction::TargetToNative => (&item.content, first_translation),
        Direction::NativeToTarget => (first_translation, &item.content),
    };

    let pool = choice_pool(item, direction, ctx)?;
    let wanted = if four_options { CHOICE_FOUR_DISTRACTORS } else { CHOICE_TWO_DISTRACTORS };
    let distractors = generate_distractors(correct, &pool, wanted, rng);
    if distractors.is_empty() {
        return Ok(None);
    }

    let mut choices = distractors;
    choices.push(correct.to_string());
    choices.shuffle(rng);

    let exercise_type = if four_options {
        ExerciseType::ChooseFromFour
    } else {
        ExerciseType::ChooseFromTwo
    };

    Ok(Some(Exercise {
        id: Exercise::identity(exercise_type, &item.identity_key(), level, Some(direction)),
        exercise_type,
        prompt: format!("What does \"{}\" mean?", prompt_text),
        solution: correct.to_string(),
        choices,
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    }))
}

/// Reveal card: prompt on one side, self-rated answer on the other.
pub fn make_reveal(item: &LearningItem, level: i8, direction: Direction) -> Exercise {
    let (prompt, solution) = match direction {
        Direction::TargetToNative => (
            format!("What does \"{}\" mean?", item.content),
            item.translations.join(", "),
        ),
        Direction::NativeToTarget => (
            format!("How do you say \"{}\"?", item.translations.join(", ")),
            item.content.clone(),
        ),
    };
    Exercise {
        id: Exercise::identity(ExerciseType::Reveal, &item.identity_key(), level, Some(direction)),
        exercise_type: ExerciseType::Reveal,
        prompt,
        solution,
        choices: Vec::new(),
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    }
}

/// Maintenance exercise for an item with no translation yet.
pub fn make_add_translation(item: &LearningItem) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::AddTranslation, &item.identity_key(), -1, None),
        exercise_type: ExerciseType::AddTranslation,
        prompt: format!("Add a translation for \"{}\"", item.content),
        solution: String::new(),
        choices: Vec::new(),
        level: -1,
        items: vec![item.uid.clone()],
        repeatable: false,
    }
}

/// Productive exercise: use the word in a sentence of one's own.
pub fn make_form_sentence(item: &LearningItem, level: i8) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::FormSentence, &item.identity_key(), level, None),
        exercise_type: ExerciseType::FormSentence,
        prompt: format!("Form a sentence using \"{}\"", item.content),
        solution: item.translations.join(", "),
        choices: Vec::new(),
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    }
}

/// Pair variant used by the backup task: one sentence from two words.
pub fn make_form_sentence_pair(a: &LearningItem, b: &LearningItem) -> Exercise {
    let pair_key = format!("{}+{}", a.identity_key(), b.identity_key());
    Exercise {
        id: Exercise::identity(ExerciseType::FormSentence, &pair_key, 0, None),
        exercise_type: ExerciseType::FormSentence,
        prompt: format!("Form one sentence using both \"{}\" and \"{}\"", a.content, b.content),
        solution: String::new(),
        choices: Vec::new(),
        level: 0,
        items: vec![a.uid.clone(), b.uid.clone()],
        repeatable: true,
    }
}

/// Distractor pool for a choice exercise: translations (target-to-native)
/// or contents (native-to-target) of other due items in the same language.
fn choice_pool(
    item: &LearningItem,
    direction: Direction,
    ctx: &GenerationContext<'_>,
) -> RepoResult<Vec<String>> {
    let due = ctx.items.get_due_in_language(&item.language, ctx.now)?;
    let pool = due
        .iter()
        .filter(|other| other.uid != item.uid)
        .flat_map(|other| match direction {
            Direction::TargetToNative => other.translations.clone(),
            Direction::NativeToTarget => vec![other.content.clone()],
        })
        .collect();
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKind;
    use crate::testing::MemoryStore;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn word(uid: &str, content: &str, translation: &str) -> LearningItem {
        LearningItem::new(uid, "es", ItemKind::Word, content).with_translations(&[translation])
    }

    #[test]
    fn test_try_to_remember_shape() {
        let item = word("v1", "perro", "dog");
        let exercise = make_try_to_remember(&item);
        assert_eq!(exercise.exercise_type, ExerciseType::TryToRemember);
        assert!(exercise.prompt.contains("perro"));
        assert!(exercise.solution.contains("dog"));
        assert!(!exercise.repeatable);
        assert!(exercise.choices.is_empty());
    }

    #[test]
    fn test_reveal_directions() {
        let item = word("v1", "perro", "dog");
        let forward = make_reveal(&item, 3, Direction::TargetToNative);
        assert!(forward.prompt.contains("perro"));
        assert_eq!(forward.solution, "dog");

        let backward = make_reveal(&item, 4, Direction::NativeToTarget);
        assert!(backward.prompt.contains("dog"));
        assert_eq!(backward.solution, "perro");
        assert_ne!(forward.id, backward.id);
    }

    #[test]
    fn test_choice_includes_correct_answer() {
        let store = MemoryStore::new();
        let target = word("v1", "perro", "dog");
        store.seed_item(&target);
        store.seed_seen_due_item(&word("v2", "zapato", "elephant"), Utc::now());
        store.seed_seen_due_item(&word("v3", "ventana", "umbrella"), Utc::now());
        store.seed_seen_due_item(&word("v4", "cuchara", "mountain"), Utc::now());

        let langs = vec!["es".to_string()];
        let ctx = GenerationContext::new(&store, &langs, Utc::now());
        let mut rng = StdRng::seed_from_u64(1);
        let exercise = make_choice(&target, 2, Direction::TargetToNative, true, &ctx, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(exercise.exercise_type, ExerciseType::ChooseFromFour);
        assert!(exercise.choices.contains(&"dog".to_string()));
        assert_eq!(exercise.solution, "dog");
        assert_eq!(exercise.choices.len(), 4);
    }

    #[test]
    fn test_choice_skipped_without_distractors() {
        let store = MemoryStore::new();
        let target = word("v1", "perro", "dog");
        store.seed_item(&target);

        let langs = vec!["es".to_string()];
        let ctx = GenerationContext::new(&store, &langs, Utc::now());
        let mut rng = StdRng::seed_from_u64(1);
        let exercise = make_choice(&target, 1, Direction::TargetToNative, false, &ctx, &mut rng).unwrap();
        assert!(exercise.is_none());
    }

    #[test]
    fn test_choice_identity_stable_across_distractor_draws() {
        let store = MemoryStore::new();
        let target = word("v1", "perro", "dog");
        store.seed_item(&target);
        store.seed_seen_due_item(&word("v2", "zapato", "elephant"), Utc::now());
        store.seed_seen_due_item(&word("v3", "ventana", "umbrella"), Utc::now());

        let langs = vec!["es".to_string()];
        let ctx = GenerationContext::new(&store, &langs, Utc::now());
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(999);
        let a = make_choice(&target, 1, Direction::TargetToNative, false, &ctx, &mut rng_a)
            .unwrap()
            .unwrap();
        let b = make_choice(&target, 1, Direction::TargetToNative, false, &ctx, &mut rng_b)
            .unwrap()
            .unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_form_sentence_pair_references_both_items() {
        let a = word("v1", "perro", "dog");
        let b = word("v2", "casa", "house");
        let exercise = make_form_sentence_pair(&a, &b);
        assert_eq!(exercise.items, vec!["v1".to_string(), "v2".to_string()]);
        assert!(exercise.prompt.contains("perro") && exercise.prompt.contains("casa"));
    }
}
