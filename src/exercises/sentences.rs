//! Exercise builders for sentence-like items.
//!
//! The sentence ladder is distinct from the word ladder: guess-meaning at
//! first exposure, cloze variants through levels 0-5, reveal only above
//! level 6.

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::config::{CHOICE_FOUR_DISTRACTORS, CHOICE_TWO_DISTRACTORS};
use crate::domain::{Direction, Exercise, ExerciseType, LearningItem};
use crate::exercises::GenerationContext;
use crate::exercises::distractors::generate_distractors;
use crate::exercises::words;
use crate::repo::RepoResult;

/// A sentence with one region hidden for cloze practice.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloze {
    pub before: String,
    pub hidden: String,
    pub after: String,
    pub hidden_index: usize,
}

/// Hide one token of the sentence, chosen by mastery level.
///
/// The hidden index is `level mod token count`, so successive levels walk
/// through the sentence; once the level reaches the token count, two
/// adjacent tokens are hidden together.
pub fn cloze_from_text(text: &str, level: i8) -> Cloze {
    let words: Vec<&str> = text.split_whitespace().collect();
    let level = level.max(0) as usize;

    if words.len() <= 1 {
        return Cloze {
            before: String::new(),
            hidden: text.trim().to_string(),
            after: String::new(),
            hidden_index: 0,
        };
    }

    let count = words.len();
    let indices: Vec<usize> = if level < count {
        vec![level]
    } else {
        let base = level % count;
        let mut pair = vec![base, (base + 1) % count];
        pair.sort_unstable();
        pair
    };

    let first = indices[0];
    let last = indices[indices.len() - 1];
    Cloze {
        before: words[..first].join(" "),
        hidden: indices.iter().map(|&i| words[i]).collect::<Vec<_>>().join(" "),
        after: words[last + 1..].join(" "),
        hidden_index: first,
    }
}

/// First-exposure exercise for sentences: guess, then reveal the meaning.
pub fn make_guess_meaning(item: &LearningItem) -> Exercise {
    Exercise {
        id: Exercise::identity(ExerciseType::GuessMeaning, &item.identity_key(), -1, None),
        exercise_type: ExerciseType::GuessMeaning,
        prompt: format!("What could this sentence mean? \"{}\"", item.content),
        solution: item.translations.join(", "),
        choices: Vec::new(),
        level: -1,
        items: vec![item.uid.clone()],
        repeatable: false,
    }
}

/// Cloze with answer options drawn from other due vocabulary.
pub fn make_cloze_choice(
    item: &LearningItem,
    level: i8,
    four_options: bool,
    ctx: &GenerationContext<'_>,
    rng: &mut dyn RngCore,
) -> RepoResult<Option<Exercise>> {
    if item.token_count() < 2 {
        return Ok(None);
    }
    let cloze = cloze_from_text(&item.content, level);

    let due = ctx.items.get_due_in_language(&item.language, ctx.now)?;
    let pool: Vec<String> = due
        .iter()
        .filter(|other| other.uid != item.uid)
        .map(|other| other.content.clone())
        .collect();

    let wanted = if four_options { CHOICE_FOUR_DISTRACTORS } else { CHOICE_TWO_DISTRACTORS };
    let distractors = generate_distractors(&cloze.hidden, &pool, wanted, rng);
    if distractors.is_empty() {
        return Ok(None);
    }

    let mut choices = distractors;
    choices.push(cloze.hidden.clone());
    choices.shuffle(rng);

    Ok(Some(Exercise {
        id: Exercise::identity(ExerciseType::ClozeChoice, &item.identity_key(), level, None),
        exercise_type: ExerciseType::ClozeChoice,
        prompt: format!("{} ___ {}", cloze.before, cloze.after).trim().to_string(),
        solution: cloze.hidden,
        choices,
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    }))
}

/// Cloze without options: recall the hidden token, then reveal.
pub fn make_cloze_reveal(item: &LearningItem, level: i8) -> Option<Exercise> {
    if item.token_count() < 2 {
        return None;
    }
    let cloze = cloze_from_text(&item.content, level);
    Some(Exercise {
        id: Exercise::identity(ExerciseType::ClozeReveal, &item.identity_key(), level, None),
        exercise_type: ExerciseType::ClozeReveal,
        prompt: format!("{} ___ {}", cloze.before, cloze.after).trim().to_string(),
        solution: cloze.hidden,
        choices: Vec::new(),
        level,
        items: vec![item.uid.clone()],
        repeatable: true,
    })
}

/// Free translation from the target language, only for sentences the
/// learner is actually studying.
pub fn make_free_translate(item: &LearningItem, ctx: &GenerationContext<'_>) -> Option<Exercise> {
    if !ctx.target_languages.contains(&item.language) || !item.has_translation() {
        return None;
    }
    Some(Exercise {
        id: Exercise::identity(ExerciseType::FreeTranslate, &item.identity_key(), 0, None),
        exercise_type: ExerciseType::FreeTranslate,
        prompt: format!("Translate this sentence: \"{}\"", item.content),
        solution: format!("Translation: {}", item.translations.join(", ")),
        choices: Vec::new(),
        level: 0,
        items: vec![item.uid.clone()],
        repeatable: false,
    })
}

/// High-level reveal for well-known sentences, both directions.
pub fn make_sentence_reveal(item: &LearningItem, level: i8, direction: Direction) -> Exercise {
    words::make_reveal(item, level, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKind;
    use crate::testing::MemoryStore;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sentence(uid: &str, content: &str) -> LearningItem {
        LearningItem::new(uid, "es", ItemKind::Sentence, content)
            .with_translations(&["the dog eats"])
    }

    #[test]
    fn test_cloze_walks_through_tokens_by_level() {
        let cloze0 = cloze_from_text("el perro come", 0);
        assert_eq!(cloze0.hidden, "el");
        assert_eq!(cloze0.before, "");
        assert_eq!(cloze0.after, "perro come");

        let cloze1 = cloze_from_text("el perro come", 1);
        assert_eq!(cloze1.hidden, "perro");
        assert_eq!(cloze1.before, "el");
        assert_eq!(cloze1.after, "come");

        let cloze2 = cloze_from_text("el perro come", 2);
        assert_eq!(cloze2.hidden, "come");
        assert_eq!(cloze2.after, "");
    }

    #[test]
    fn test_cloze_hides_adjacent_pair_past_token_count() {
        // level 3 on a 3-token sentence wraps to index 0 and takes two tokens
        let cloze = cloze_from_text("el perro come", 3);
        assert_eq!(cloze.hidden, "el perro");
        assert_eq!(cloze.hidden_index, 0);
        assert_eq!(cloze.after, "come");
    }

    #[test]
    fn test_cloze_single_token_hides_everything() {
        let cloze = cloze_from_text("hola", 2);
        assert_eq!(cloze.hidden, "hola");
        assert_eq!(cloze.before, "");
        assert_eq!(cloze.after, "");
    }

    #[test]
    fn test_guess_meaning_shape() {
        let item = sentence("s1", "el perro come");
        let exercise = make_guess_meaning(&item);
        assert_eq!(exercise.exercise_type, ExerciseType::GuessMeaning);
        assert_eq!(exercise.level, -1);
        assert!(!exercise.repeatable);
    }

    #[test]
    fn test_cloze_reveal_requires_two_tokens() {
        assert!(make_cloze_reveal(&sentence("s1", "hola"), 0).is_none());
        let exercise = make_cloze_reveal(&sentence("s2", "el perro come"), 1).unwrap();
        assert_eq!(exercise.solution, "perro");
        assert!(exercise.prompt.contains("___"));
    }

    #[test]
    fn test_cloze_choice_contains_hidden_token() {
        let store = MemoryStore::new();
        let item = sentence("s1", "el perro come");
        store.seed_item(&item);
        for (uid, content) in [("v1", "ventana"), ("v2", "zapatero"), ("v3", "cuaderno")] {
            store.seed_seen_due_item(
                &LearningItem::new(uid, "es", ItemKind::Word, content).with_translations(&["x"]),
                Utc::now(),
            );
        }

        let langs = vec!["es".to_string()];
        let ctx = GenerationContext::new(&store, &langs, Utc::now());
        let mut rng = StdRng::seed_from_u64(3);
        let exercise = make_cloze_choice(&item, 1, true, &ctx, &mut rng).unwrap().unwrap();
        assert!(exercise.choices.contains(&"perro".to_string()));
        assert_eq!(exercise.solution, "perro");
    }

    #[test]
    fn test_free_translate_only_for_target_language() {
        let store = MemoryStore::new();
        let langs = vec!["es".to_string()];
        let ctx = GenerationContext::new(&store, &langs, Utc::now());

        let es = sentence("s1", "el perro come");
        assert!(make_free_translate(&es, &ctx).is_some());

        let de = LearningItem::new("s2", "de", ItemKind::Sentence, "der Hund frisst")
            .with_translations(&["the dog eats"]);
        assert!(make_free_translate(&de, &ctx).is_none());
    }
}
