//! Practice engine for a spaced-repetition language learning app.
//!
//! The crate turns a pool of learning items (words, sentences, fact
//! cards) into an endless stream of practice tasks: FSRS scheduling per
//! (item, mastery level) pair, level-gated exercise generation with
//! edit-distance distractors, candidate proposers feeding a bounded batch
//! picker, and pluggable mode strategies that balance task variety.
//! Storage is behind repository traits; a SQLite implementation ships in
//! [`store`], an in-memory one in [`testing`].

pub mod config;
pub mod domain;
pub mod exercises;
pub mod modes;
pub mod queue;
pub mod repo;
pub mod session;
pub mod srs;
pub mod store;
pub mod testing;
