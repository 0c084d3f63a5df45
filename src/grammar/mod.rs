//! Instruction grammar and name registry.
//!
//! - [`EncodedInstruction`]: colon-delimited instruction text, split once
//! - [`EffectKind`] / [`ConditionKind`]: the closed set of known names
//!
//! Effects and conditions share the grammar; which registry a name is looked
//! up in depends on whether the instruction sits in a level's effect list or
//! its condition list.

mod instruction;
mod registry;

pub use instruction::{EncodedInstruction, DELIMITER};
pub use registry::{unknown_conditions, unknown_effects, ConditionKind, EffectKind};
