//! Gating conditions for ability levels.
//!
//! - [`Condition`]: a parsed predicate (health comparisons, equipment checks)
//! - [`ConditionEvaluator`]: AND-evaluation of a level's encoded conditions
//!
//! Unknown condition names evaluate to true so abilities written for newer
//! condition kinds keep activating.

mod condition;
mod evaluator;

pub use condition::{Comparator, Comparison, Condition, DEFAULT_THRESHOLD};
pub use evaluator::{ConditionContext, ConditionEvaluator};
