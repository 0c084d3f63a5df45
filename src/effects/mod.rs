//! Effect system for ability activations.
//!
//! Effects are what an ability does once it fires:
//! - `Effect`: parsed form of one encoded instruction
//! - `EffectInterpreter`: applies instructions to the host world
//! - `EffectContext`: the actor, target and event data an effect sees
//!
//! ## Design Philosophy
//!
//! Effects are data, not code. Ability catalogues name them with the
//! `NAME:ARG:ARG` grammar and the interpreter owns the meaning. An
//! unknown name is a silent no-op so catalogues written for a newer
//! engine still load and run.
//!
//! Block-changing effects never write the world directly; they go through
//! the [`MutationTracker`](crate::mutations::MutationTracker) so every
//! change is reverted on time or at shutdown.

mod effect;
mod interpreter;

pub use effect::{Effect, TARGET_KEYWORD};
pub use interpreter::{head_for, EffectContext, EffectInterpreter, ExecOutcome};
