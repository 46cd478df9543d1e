//! Candidate proposers and batch assembly.

pub mod picker;
pub mod proposers;

pub use picker::ItemPicker;
pub use proposers::{
  DueReviewProposer, ExampleLinkedProposer, GoalLinkedProposer, NewItemProposer, Proposer,
  ResourceAlmostReadyProposer,
};
