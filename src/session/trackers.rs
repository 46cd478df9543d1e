//! Diversity trackers: rolling windows over recent tasks, consulted by
//! mode strategies to avoid repetition.
//!
//! Trackers are advisory. A mode may ignore the preferred category when
//! nothing eligible exists there.

use rand::{Rng, RngCore};
use std::collections::VecDeque;

use crate::config::{TARGET_SHARE_BIG, TARGET_SHARE_MEDIUM, TARGET_SHARE_SMALL, TRACKER_WINDOW};
use crate::domain::{ItemId, Task, TaskSize, TaskType};

/// Rolling record of recent task sizes against the session's target mix.
pub struct TaskSizeTracker {
  recent: VecDeque<TaskSize>,
  window: usize,
}

impl TaskSizeTracker {
  pub fn new() -> Self {
    Self { recent: VecDeque::new(), window: TRACKER_WINDOW }
  }

  pub fn record(&mut self, size: TaskSize) {
    if self.recent.len() == self.window {
      self.recent.pop_front();
    }
    self.recent.push_back(size);
  }

  fn target_share(size: TaskSize) -> f64 {
    match size {
      TaskSize::Small => TARGET_SHARE_SMALL,
      TaskSize::Medium => TARGET_SHARE_MEDIUM,
      TaskSize::Big => TARGET_SHARE_BIG,
    }
  }

  fn actual_share(&self, size: TaskSize) -> f64 {
    if self.recent.is_empty() {
      return 0.0;
    }
    let count = self.recent.iter().filter(|s| **s == size).count();
    count as f64 / self.recent.len() as f64
  }

  /// Size classes sorted most-underused first, relative to the targets.
  pub fn sizes_by_deficit(&self) -> [TaskSize; 3] {
    let mut sizes = TaskSize::ALL;
    sizes.sort_by(|a, b| {
      let deficit_a = Self::target_share(*a) - self.actual_share(*a);
      let deficit_b = Self::target_share(*b) - self.actual_share(*b);
      deficit_b.partial_cmp(&deficit_a).unwrap_or(std::cmp::Ordering::Equal)
    });
    sizes
  }

  /// Preferred size for the next task: a geometric pick over the
  /// deficit-sorted sizes, so the most underused class usually wins but
  /// the mix stays stochastic.
  pub fn preferred_size(&self, rng: &mut dyn RngCore) -> TaskSize {
    let sorted = self.sizes_by_deficit();
    for size in &sorted[..sorted.len() - 1] {
      if rng.random_bool(0.75) {
        return *size;
      }
    }
    sorted[sorted.len() - 1]
  }
}

impl Default for TaskSizeTracker {
  fn default() -> Self {
    Self::new()
  }
}

/// Last and recent task types, used to avoid back-to-back repeats.
pub struct TaskTypeTracker {
  last: Option<TaskType>,
  recent: VecDeque<TaskType>,
  window: usize,
}

impl TaskTypeTracker {
  pub fn new() -> Self {
    Self { last: None, recent: VecDeque::new(), window: TRACKER_WINDOW }
  }

  pub fn record(&mut self, task_type: TaskType) {
    self.last = Some(task_type);
    if self.recent.len() == self.window {
      self.recent.pop_front();
    }
    self.recent.push_back(task_type);
  }

  pub fn last(&self) -> Option<TaskType> {
    self.last
  }

  pub fn recently_used(&self, task_type: TaskType) -> bool {
    self.recent.contains(&task_type)
  }
}

impl Default for TaskTypeTracker {
  fn default() -> Self {
    Self::new()
  }
}

/// Recently practiced item uids, handed to repositories as a block list.
pub struct RecentItemsTracker {
  recent: VecDeque<ItemId>,
  window: usize,
}

impl RecentItemsTracker {
  pub fn new() -> Self {
    Self { recent: VecDeque::new(), window: TRACKER_WINDOW }
  }

  pub fn record(&mut self, uid: &str) {
    // Re-recording moves the item to the back of the window
    self.recent.retain(|existing| existing != uid);
    if self.recent.len() == self.window {
      self.recent.pop_front();
    }
    self.recent.push_back(uid.to_string());
  }

  pub fn block_list(&self) -> Vec<ItemId> {
    self.recent.iter().cloned().collect()
  }
}

impl Default for RecentItemsTracker {
  fn default() -> Self {
    Self::new()
  }
}

/// All session-scoped trackers, constructed once per practice session and
/// passed into modes explicitly.
pub struct SessionTrackers {
  pub sizes: TaskSizeTracker,
  pub types: TaskTypeTracker,
  pub items: RecentItemsTracker,
  pub task_count: u64,
}

impl SessionTrackers {
  pub fn new() -> Self {
    Self {
      sizes: TaskSizeTracker::new(),
      types: TaskTypeTracker::new(),
      items: RecentItemsTracker::new(),
      task_count: 0,
    }
  }

  /// Record an emitted task across every tracker.
  pub fn record_task(&mut self, task: &Task) {
    self.sizes.record(task.size());
    self.types.record(task.task_type);
    for uid in &task.items {
      self.items.record(uid);
    }
    self.task_count += 1;
  }
}

impl Default for SessionTrackers {
  fn default() -> Self {
    Self::new()
  }
}
