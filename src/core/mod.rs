//! Core engine types: identifiers, RNG, clock, host world boundary,
//! configuration and errors.
//!
//! Everything else in the crate builds on these. None of them know about
//! abilities or commands.

pub mod entity;
pub mod rng;
pub mod clock;
pub mod world;
pub mod config;
pub mod error;

pub use entity::{BlockPos, BlockState, EntityId, EquipmentSlot, ItemStack, Location, Material};
pub use rng::EngineRng;
pub use clock::{ticks_to_duration, Clock, ManualClock, SystemClock, Timestamp, TICKS_PER_SECOND};
pub use world::{EntityKind, PotionEffect, PotionType, World};
pub use config::{EngineConfig, TierConfig};
pub use error::{EngineError, Result};
