pub mod eligibility;
pub mod progress_model;
pub mod scheduler;

pub use progress_model::apply_rating;
pub use scheduler::{SchedulePreview, peek_due, preview, preview_with_retention, schedule};
