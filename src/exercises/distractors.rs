//! Plausible wrong answers for choice exercises.
//!
//! A good distractor looks like it could be right (similar length) while
//! being unambiguously wrong (edit distance well away from the correct
//! answer). When no candidate satisfies both constraints we fall back to
//! any pool entry that isn't the correct answer, and a caller getting
//! `None` must skip the exercise.

use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::config::{DISTRACTOR_LENGTH_TOLERANCE, DISTRACTOR_MIN_DISTANCE};

/// Classic dynamic-programming Levenshtein distance, case-insensitive.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for i in 0..=a_len {
        matrix[i][0] = i;
    }
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}

fn is_length_within(candidate: &str, reference_len: usize, tolerance: usize) -> bool {
    let len = candidate.chars().count();
    len.abs_diff(reference_len) <= tolerance
}

/// Pick one distractor for `correct` from the candidate pool.
///
/// Ideal candidates are within ±3 characters in length and more than 2
/// edits away from the correct answer; one is picked uniformly at random.
/// Fallback: any pool entry not textually equal to the correct answer.
pub fn find_distractor(correct: &str, pool: &[String], rng: &mut dyn RngCore) -> Option<String> {
    let correct_len = correct.chars().count();

    let ideal: Vec<&String> = pool
        .iter()
        .filter(|candidate| {
            is_length_within(candidate, correct_len, DISTRACTOR_LENGTH_TOLERANCE)
                && levenshtein_distance(candidate, correct) > DISTRACTOR_MIN_DISTANCE
        })
        .collect();

    if let Some(choice) = ideal.choose(rng) {
        return Some((*choice).clone());
    }

    let fallback: Vec<&String> = pool.iter().filter(|c| c.as_str() != correct).collect();
    fallback.choose(rng).map(|c| (*c).clone())
}

/// Pick up to `count` unique distractors, never reusing one and never
/// returning the correct answer. Fewer than `count` results is a valid
/// outcome when the pool runs dry, not an error.
pub fn generate_distractors(
    correct: &str,
    pool: &[String],
    count: usize,
    rng: &mut dyn RngCore,
) -> Vec<String> {
    let mut chosen: Vec<String> = Vec::with_capacity(count);

    while chosen.len() < count {
        let remaining: Vec<String> = pool
            .iter()
            .filter(|c| !chosen.contains(*c))
            .cloned()
            .collect();
        match find_distractor(correct, &remaining, rng) {
            Some(distractor) => chosen.push(distractor),
            None => break,
        }
    }

    chosen
}
