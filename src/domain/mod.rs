pub mod exercise;
pub mod item;
pub mod progress;
pub mod rating;
pub mod task;

pub use exercise::{Direction, Exercise, ExerciseType};
pub use item::{Goal, ItemId, ItemKind, LearningItem, Resource};
pub use progress::{CardPhase, LEVEL_UNSEEN, ProgressRecord, SchedulingCard};
pub use rating::Rating;
pub use task::{Task, TaskSize, TaskType};
