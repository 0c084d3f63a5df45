//! The host world boundary.
//!
//! The engine never owns game state. Entities, blocks and inventories live in
//! the host server; the engine reads and changes them through the `World`
//! trait. Every method must be cheap and non-blocking since it runs on the
//! host's main control thread.
//!
//! Queries about missing entities return `None` (or do nothing for
//! mutators) rather than failing: an entity can despawn between the event
//! and the effect.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::entity::{BlockPos, BlockState, EntityId, EquipmentSlot, ItemStack, Location};

/// Potion effect types an ability may apply.
///
/// Parsing also accepts the older server names (`INCREASE_DAMAGE`,
/// `FAST_DIGGING`, `SLOW`, `JUMP` and so on) still found in data files.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PotionType {
    Speed,
    #[strum(to_string = "SLOWNESS", serialize = "SLOW")]
    Slowness,
    #[strum(to_string = "HASTE", serialize = "FAST_DIGGING")]
    Haste,
    #[strum(to_string = "MINING_FATIGUE", serialize = "SLOW_DIGGING")]
    MiningFatigue,
    #[strum(to_string = "STRENGTH", serialize = "INCREASE_DAMAGE")]
    Strength,
    #[strum(to_string = "INSTANT_HEALTH", serialize = "HEAL")]
    InstantHealth,
    #[strum(to_string = "INSTANT_DAMAGE", serialize = "HARM")]
    InstantDamage,
    #[strum(to_string = "JUMP_BOOST", serialize = "JUMP")]
    JumpBoost,
    #[strum(to_string = "NAUSEA", serialize = "CONFUSION")]
    Nausea,
    Regeneration,
    #[strum(to_string = "RESISTANCE", serialize = "DAMAGE_RESISTANCE")]
    Resistance,
    FireResistance,
    WaterBreathing,
    Invisibility,
    Blindness,
    NightVision,
    Hunger,
    Weakness,
    Poison,
    Wither,
    HealthBoost,
    Absorption,
    Saturation,
    Glowing,
    Levitation,
    Luck,
    SlowFalling,
}

/// A potion effect instance to apply to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionEffect {
    pub kind: PotionType,
    /// Zero-based strength: 0 is level I.
    pub amplifier: u32,
    pub duration_ticks: u64,
}

/// The broad type of an entity, used for head drops and player checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EntityKind {
    Player,
    Zombie,
    Skeleton,
    WitherSkeleton,
    Creeper,
    EnderDragon,
    Piglin,
    Other,
}

/// Read/write access to the host game world.
pub trait World {
    // === Entities ===

    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind>;

    fn is_player(&self, entity: EntityId) -> bool {
        self.entity_kind(entity) == Some(EntityKind::Player)
    }

    fn location(&self, entity: EntityId) -> Option<Location>;

    fn health(&self, entity: EntityId) -> Option<f64>;

    fn max_health(&self, entity: EntityId) -> Option<f64>;

    fn set_health(&mut self, entity: EntityId, health: f64);

    fn food_level(&self, entity: EntityId) -> Option<u32>;

    fn set_food_level(&mut self, entity: EntityId, food: u32);

    fn set_fire_ticks(&mut self, entity: EntityId, ticks: u64);

    fn add_potion_effect(&mut self, entity: EntityId, effect: PotionEffect);

    fn give_experience(&mut self, entity: EntityId, amount: u32);

    /// Whole experience levels (the currency for tier purchases).
    fn experience_level(&self, entity: EntityId) -> u32;

    fn set_experience_level(&mut self, entity: EntityId, level: u32);

    /// Living entities within `radius` of `center`.
    fn nearby_entities(&self, center: Location, radius: f64) -> Vec<EntityId>;

    // === Items ===

    fn equipment(&self, entity: EntityId, slot: EquipmentSlot) -> Option<ItemStack>;

    /// Put an item into the entity's inventory, dropping overflow at its feet.
    fn give_item(&mut self, entity: EntityId, item: ItemStack);

    fn drop_item(&mut self, at: Location, item: ItemStack);

    // === Blocks ===

    fn block(&self, pos: BlockPos) -> BlockState;

    fn set_block(&mut self, pos: BlockPos, state: BlockState);

    // === World actions ===

    fn create_explosion(&mut self, at: Location, power: f32, break_blocks: bool, set_fire: bool);

    fn strike_lightning(&mut self, at: Location);

    /// Launch one extra projectile from the shooter, rotated by `yaw_offset`
    /// degrees from where it is looking.
    fn launch_projectile(&mut self, shooter: EntityId, yaw_offset: f32);
}
