//! # enchant-engine
//!
//! A data-driven custom enchantment engine for game servers.
//!
//! Abilities are data: each one names the trigger it listens to, the
//! equipment slot it works from, an optional cooldown, and per-level chance,
//! condition list and effect script. Scripts and conditions are short
//! colon-delimited instructions (`POTION:SPEED:2:5`, `PLAYER_HEALTH:<:10`)
//! resolved against a closed registry of names.
//!
//! ## Design Principles
//!
//! 1. **Host-Agnostic**: the engine manipulates the game only through the
//!    [`World`](core::World) trait. [`sim::SimWorld`] is an in-memory host.
//!
//! 2. **Never Fails at Runtime**: malformed arguments fall back to
//!    defaults and unknown names are no-ops. Only loading and saving return
//!    errors.
//!
//! 3. **Single Writer**: every engine call happens on the host's main
//!    thread. Timers only send [`tasks::EngineTask`] messages; user-data
//!    saves write an immutable snapshot off-thread.
//!
//! ## Modules
//!
//! - `core`: identifiers, RNG, clock, host world boundary, config, errors
//! - `grammar`: instruction parsing and the name registry
//! - `effects`: the effect script interpreter
//! - `conditions`: the condition evaluator
//! - `abilities`: ability definitions, the catalogue and tiers
//! - `triggers`: game events and the trigger dispatcher
//! - `mutations`: temporary block mutation tracking
//! - `cooldowns`: per-actor cooldowns
//! - `commands`: sub-command dispatch
//! - `support`: build and friendliness collaborators
//! - `users`: player records and their snapshots
//! - `tasks`: scheduled sweep and save timers
//! - `engine`: the context tying everything together

pub mod core;
pub mod grammar;
pub mod effects;
pub mod conditions;
pub mod abilities;
pub mod triggers;
pub mod mutations;
pub mod cooldowns;
pub mod commands;
pub mod support;
pub mod users;
pub mod tasks;
pub mod engine;
pub mod logging;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{
    BlockPos, BlockState, Clock, EngineConfig, EngineError, EngineRng, EntityId, EquipmentSlot,
    ItemStack, Location, ManualClock, Material, Result, SystemClock, Timestamp, World,
};

pub use crate::abilities::{AbilityDefinition, AbilityStore, LevelDefinition, Slot};

pub use crate::triggers::{DispatchReport, GameEvent, TriggerDispatcher, TriggerKind};

pub use crate::commands::{CommandDispatcher, CommandEntry, CommandResult, CommandSender};

pub use crate::engine::EnchantEngine;
pub use crate::tasks::{EngineTask, TaskScheduler};
