//! Ability catalogue.
//!
//! - [`AbilityDefinition`] / [`LevelDefinition`]: static enchantment data
//! - [`AbilityStore`]: the loaded catalogue, keyed by name
//! - [`TierShop`]: tier purchases and enchanting-table rolls
//!
//! Definitions are immutable once loaded. Reloading replaces the whole
//! catalogue; items keep their `(name, level)` pairs and simply stop
//! activating if the name disappears.

mod definition;
mod store;
mod tier;

pub use definition::{AbilityDefinition, LevelDefinition, Slot};
pub use store::AbilityStore;
pub use tier::{apply_crystal, crystal, CrystalApply, Purchase, TierShop, CRYSTAL_MATERIAL};
