//! Engine configuration constants.
//!
//! This module centralizes the tunable values of the practice engine,
//! with optional overrides from `config.toml` and environment variables.

use serde::Deserialize;

// ==================== Batch Configuration ====================

/// Smallest practice batch the item picker will produce
pub const BATCH_MIN: usize = 5;

/// Largest practice batch the item picker will produce
pub const BATCH_MAX: usize = 20;

// ==================== Distractor Configuration ====================

/// A distractor's length may differ from the correct answer by at most this
pub const DISTRACTOR_LENGTH_TOLERANCE: usize = 3;

/// A distractor's edit distance from the correct answer must exceed this
pub const DISTRACTOR_MIN_DISTANCE: usize = 2;

/// Number of wrong answers in a four-option choice exercise
pub const CHOICE_FOUR_DISTRACTORS: usize = 3;

/// Number of wrong answers in a two-option choice exercise
pub const CHOICE_TWO_DISTRACTORS: usize = 1;

// ==================== Diversity Tracking ====================

/// Rolling window of recent tasks consulted by the trackers
pub const TRACKER_WINDOW: usize = 30;

/// Target share of small tasks in a session
pub const TARGET_SHARE_SMALL: f64 = 0.85;

/// Target share of medium tasks in a session
pub const TARGET_SHARE_MEDIUM: f64 = 0.10;

/// Target share of big tasks in a session
pub const TARGET_SHARE_BIG: f64 = 0.05;

// ==================== Proposer Configuration ====================

/// A resource is "almost ready" to consume when at most this many of its
/// linked items are still unseen or not yet due
pub const RESOURCE_ALMOST_READY_THRESHOLD: usize = 3;

/// Maintenance tasks (add translation) only target items at or above this
/// priority
pub const MAINTENANCE_MIN_PRIORITY: u8 = 2;

// ==================== Runtime Overrides ====================

/// Tunables that may be overridden per deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// FSRS desired retention, 0.7..=0.99
    pub desired_retention: f64,
    pub batch_min: usize,
    pub batch_max: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            desired_retention: 0.9,
            batch_min: BATCH_MIN,
            batch_max: BATCH_MAX,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    practice: Option<PracticeSection>,
}

#[derive(Debug, Deserialize)]
struct PracticeSection {
    desired_retention: Option<f64>,
    batch_min: Option<usize>,
    batch_max: Option<usize>,
}

impl EngineConfig {
    /// Load config with priority: config.toml > env > defaults.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());

        if let Ok(contents) = std::fs::read_to_string("config.toml") {
            config.apply_toml(&contents);
        }

        config.clamp();
        config
    }

    /// Apply `LEXLOOP_*` overrides through an injected lookup, so tests
    /// don't have to touch the process environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("LEXLOOP_DESIRED_RETENTION").and_then(|v| v.parse::<f64>().ok()) {
            tracing::info!("Using desired retention from env: {}", value);
            self.desired_retention = value;
        }
        if let Some(value) = var("LEXLOOP_BATCH_MAX").and_then(|v| v.parse::<usize>().ok()) {
            self.batch_max = value;
        }
    }

    /// Apply overrides from a TOML document (the `[practice]` table).
    pub fn apply_toml(&mut self, contents: &str) {
        let Ok(file) = toml::from_str::<ConfigFile>(contents) else {
            tracing::warn!("Ignoring malformed config.toml");
            return;
        };
        if let Some(practice) = file.practice {
            if let Some(retention) = practice.desired_retention {
                tracing::info!("Using desired retention from config.toml: {}", retention);
                self.desired_retention = retention;
            }
            if let Some(min) = practice.batch_min {
                self.batch_min = min;
            }
            if let Some(max) = practice.batch_max {
                self.batch_max = max;
            }
        }
    }

    fn clamp(&mut self) {
        self.desired_retention = self.desired_retention.clamp(0.7, 0.99);
        if self.batch_min == 0 {
            self.batch_min = 1;
        }
        if self.batch_max < self.batch_min {
            self.batch_max = self.batch_min;
        }
    }
}
