//! Temporary world mutations.
//!
//! Effects that alter blocks for a limited time register the change with the
//! [`MutationTracker`], which restores the original state on schedule and,
//! unconditionally, at shutdown.

mod tracker;

pub use tracker::{MutationRecord, MutationTracker};
