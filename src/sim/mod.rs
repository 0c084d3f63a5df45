//! In-memory reference host.
//!
//! `SimWorld` implements [`World`] over plain maps and records every world
//! action (explosions, lightning, projectiles, dropped items) so tests and
//! examples can observe what effects did.
//!
//! ```
//! use enchant_engine::core::{EntityKind, Location, World};
//! use enchant_engine::sim::SimWorld;
//!
//! let mut world = SimWorld::new();
//! let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
//! world.set_health(player, 5.0);
//! assert_eq!(world.health(player), Some(5.0));
//! ```

use rustc_hash::FxHashMap;

use crate::core::{
    BlockPos, BlockState, EntityId, EntityKind, EquipmentSlot, ItemStack, Location, PotionEffect,
    World,
};

/// Maximum food level.
pub const MAX_FOOD: u32 = 20;

/// State of one simulated entity.
#[derive(Clone, Debug)]
pub struct SimEntity {
    pub kind: EntityKind,
    pub location: Location,
    pub health: f64,
    pub max_health: f64,
    pub food: u32,
    pub fire_ticks: u64,
    pub experience: u32,
    pub experience_level: u32,
    pub potions: Vec<PotionEffect>,
    pub equipment: FxHashMap<EquipmentSlot, ItemStack>,
    pub inventory: Vec<ItemStack>,
}

impl SimEntity {
    fn new(kind: EntityKind, location: Location) -> Self {
        Self {
            kind,
            location,
            health: 20.0,
            max_health: 20.0,
            food: MAX_FOOD,
            fire_ticks: 0,
            experience: 0,
            experience_level: 0,
            potions: Vec::new(),
            equipment: FxHashMap::default(),
            inventory: Vec::new(),
        }
    }
}

/// An explosion the world was asked to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    pub at: Location,
    pub power: f32,
    pub break_blocks: bool,
    pub set_fire: bool,
}

/// In-memory world.
#[derive(Clone, Debug, Default)]
pub struct SimWorld {
    entities: FxHashMap<EntityId, SimEntity>,
    blocks: FxHashMap<BlockPos, BlockState>,
    next_id: u32,
    pub explosions: Vec<Explosion>,
    pub lightning: Vec<Location>,
    pub projectiles: Vec<(EntityId, f32)>,
    pub dropped: Vec<(Location, ItemStack)>,
}

impl SimWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity with full health and food.
    pub fn spawn(&mut self, kind: EntityKind, location: Location) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(id, SimEntity::new(kind, location));
        id
    }

    pub fn despawn(&mut self, entity: EntityId) {
        self.entities.remove(&entity);
    }

    #[must_use]
    pub fn entity(&self, entity: EntityId) -> Option<&SimEntity> {
        self.entities.get(&entity)
    }

    pub fn entity_mut(&mut self, entity: EntityId) -> Option<&mut SimEntity> {
        self.entities.get_mut(&entity)
    }

    /// Put an item in an equipment slot.
    pub fn equip(&mut self, entity: EntityId, slot: EquipmentSlot, item: ItemStack) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.equipment.insert(slot, item);
        }
    }

    pub fn unequip(&mut self, entity: EntityId, slot: EquipmentSlot) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.equipment.remove(&slot);
        }
    }

    /// Potion effects currently applied to an entity.
    #[must_use]
    pub fn potions(&self, entity: EntityId) -> &[PotionEffect] {
        self.entities.get(&entity).map_or(&[][..], |e| e.potions.as_slice())
    }

    /// Items in an entity's inventory.
    #[must_use]
    pub fn inventory(&self, entity: EntityId) -> &[ItemStack] {
        self.entities.get(&entity).map_or(&[][..], |e| e.inventory.as_slice())
    }

    /// Number of non-air blocks.
    #[must_use]
    pub fn solid_blocks(&self) -> usize {
        self.blocks.values().filter(|b| !b.material.is_air()).count()
    }
}

impl World for SimWorld {
    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind> {
        self.entities.get(&entity).map(|e| e.kind)
    }

    fn location(&self, entity: EntityId) -> Option<Location> {
        self.entities.get(&entity).map(|e| e.location)
    }

    fn health(&self, entity: EntityId) -> Option<f64> {
        self.entities.get(&entity).map(|e| e.health)
    }

    fn max_health(&self, entity: EntityId) -> Option<f64> {
        self.entities.get(&entity).map(|e| e.max_health)
    }

    fn set_health(&mut self, entity: EntityId, health: f64) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.health = health.clamp(0.0, e.max_health);
        }
    }

    fn food_level(&self, entity: EntityId) -> Option<u32> {
        self.entities.get(&entity).map(|e| e.food)
    }

    fn set_food_level(&mut self, entity: EntityId, food: u32) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.food = food.min(MAX_FOOD);
        }
    }

    fn set_fire_ticks(&mut self, entity: EntityId, ticks: u64) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.fire_ticks = ticks;
        }
    }

    fn add_potion_effect(&mut self, entity: EntityId, effect: PotionEffect) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.potions.retain(|p| p.kind != effect.kind);
            e.potions.push(effect);
        }
    }

    fn give_experience(&mut self, entity: EntityId, amount: u32) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.experience += amount;
        }
    }

    fn experience_level(&self, entity: EntityId) -> u32 {
        self.entities.get(&entity).map_or(0, |e| e.experience_level)
    }

    fn set_experience_level(&mut self, entity: EntityId, level: u32) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.experience_level = level;
        }
    }

    fn nearby_entities(&self, center: Location, radius: f64) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.location.distance(center) <= radius)
            .map(|(&id, _)| id)
            .collect();
        found.sort_unstable();
        found
    }

    fn equipment(&self, entity: EntityId, slot: EquipmentSlot) -> Option<ItemStack> {
        self.entities.get(&entity).and_then(|e| e.equipment.get(&slot).cloned())
    }

    fn give_item(&mut self, entity: EntityId, item: ItemStack) {
        match self.entities.get_mut(&entity) {
            Some(e) => e.inventory.push(item),
            None => tracing::debug!(%entity, "item given to missing entity dropped"),
        }
    }

    fn drop_item(&mut self, at: Location, item: ItemStack) {
        self.dropped.push((at, item));
    }

    fn block(&self, pos: BlockPos) -> BlockState {
        self.blocks.get(&pos).cloned().unwrap_or_else(BlockState::air)
    }

    fn set_block(&mut self, pos: BlockPos, state: BlockState) {
        if state.material.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
    }

    fn create_explosion(&mut self, at: Location, power: f32, break_blocks: bool, set_fire: bool) {
        self.explosions.push(Explosion {
            at,
            power,
            break_blocks,
            set_fire,
        });
    }

    fn strike_lightning(&mut self, at: Location) {
        self.lightning.push(at);
    }

    fn launch_projectile(&mut self, shooter: EntityId, yaw_offset: f32) {
        self.projectiles.push((shooter, yaw_offset));
    }
}
