//! Trigger system for event-driven abilities.
//!
//! The host forwards game events; the dispatcher decides which abilities
//! they activate and runs them.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: an event notification from the host
//! - [`TriggerKind`]: the class of event an ability listens to
//! - [`EventPayload`]: event data effects may rewrite (damage, drops, item)
//! - [`TriggerDispatcher`]: resolve, roll, gate and execute
//!
//! ## Example Usage
//!
//! ```
//! use enchant_engine::abilities::AbilityStore;
//! use enchant_engine::core::{
//!     EngineConfig, EngineRng, EntityKind, EquipmentSlot, ItemStack, Location, Timestamp,
//! };
//! use enchant_engine::mutations::MutationTracker;
//! use enchant_engine::sim::SimWorld;
//! use enchant_engine::support::SupportRegistry;
//! use enchant_engine::triggers::{DispatchEnv, GameEvent, TriggerDispatcher};
//!
//! let mut world = SimWorld::new();
//! let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
//! world.equip(
//!     player,
//!     EquipmentSlot::Boots,
//!     ItemStack::new("IRON_BOOTS", 1).with_enchant("Speed", 2),
//! );
//!
//! let store = AbilityStore::with_defaults();
//! let mut mutations = MutationTracker::new();
//! let support = SupportRegistry::new();
//! let config = EngineConfig::default();
//! let mut dispatcher = TriggerDispatcher::new(EngineRng::new(1));
//!
//! let mut env = DispatchEnv {
//!     world: &mut world,
//!     store: &store,
//!     mutations: &mut mutations,
//!     support: &support,
//!     config: &config,
//!     now: Timestamp(0),
//! };
//! let report = dispatcher.dispatch(&GameEvent::Passive { actor: player }, &mut env);
//!
//! assert_eq!(report.fired_count(), 1);
//! assert_eq!(world.potions(player)[0].amplifier, 1);
//! ```

mod dispatcher;
mod event;

pub use dispatcher::{
    AbilityActivation, ActivationOutcome, DispatchEnv, DispatchReport, Fizzle, TriggerDispatcher,
};
pub use event::{Activation, EventPayload, GameEvent, TriggerKind};
