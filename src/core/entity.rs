//! Entity, position and item identification.
//!
//! Every living thing the engine touches (players and mobs) is addressed by an
//! `EntityId`. World positions come in two flavours:
//!
//! - `BlockPos`: integer block coordinates, the key for block mutations
//! - `Location`: continuous coordinates for entities, explosions, lightning
//!
//! ## Usage
//!
//! ```
//! use enchant_engine::core::{BlockPos, Location};
//!
//! let loc = Location::new(10.7, 64.0, -3.2);
//! assert_eq!(loc.block(), BlockPos::new(10, 64, -4));
//! assert_eq!(BlockPos::new(1, 2, 3).offset(0, 1, 0), BlockPos::new(1, 3, 3));
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Unique identifier for a living entity (player or mob).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Integer block coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position shifted by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// All positions in the cube of the given radius centred here.
    ///
    /// Iteration order is x-major, then y, then z, so callers mutating
    /// blocks get a stable order.
    pub fn cube(self, radius: i32) -> impl Iterator<Item = BlockPos> {
        let r = radius.max(0);
        (-r..=r).flat_map(move |dx| {
            (-r..=r).flat_map(move |dy| (-r..=r).map(move |dz| self.offset(dx, dy, dz)))
        })
    }

    /// Centre of the block as a continuous location.
    #[must_use]
    pub fn center(self) -> Location {
        Location::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The block containing this location.
    #[must_use]
    pub fn block(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Euclidean distance to another location.
    #[must_use]
    pub fn distance(self, other: Location) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A material name such as `DIAMOND_BOOTS` or `IRON_ORE`.
///
/// Names are normalized to upper case so data files may use any casing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Material(String);

impl Material {
    /// Create a material, normalizing the name to upper case.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_uppercase())
    }

    /// The air material, used for "nothing here".
    #[must_use]
    pub fn air() -> Self {
        Self("AIR".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        matches!(self.0.as_str(), "AIR" | "CAVE_AIR" | "VOID_AIR")
    }
}

impl From<String> for Material {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Material {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Material> for String {
    fn from(value: Material) -> Self {
        value.0
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visible state of a block: its material plus an opaque host data string
/// (orientation, waterlogging and the like).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub material: Material,
    #[serde(default)]
    pub data: String,
}

impl BlockState {
    pub fn new(material: impl Into<Material>) -> Self {
        Self {
            material: material.into(),
            data: String::new(),
        }
    }

    /// Attach host-specific block data (builder pattern).
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    #[must_use]
    pub fn air() -> Self {
        Self::new(Material::air())
    }
}

/// Where on an entity an item is equipped.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EquipmentSlot {
    Helmet,
    Chest,
    Legs,
    Boots,
    MainHand,
    OffHand,
}

impl EquipmentSlot {
    /// The four armor slots, head to toe.
    pub const ARMOR: [EquipmentSlot; 4] = [Self::Helmet, Self::Chest, Self::Legs, Self::Boots];

    #[must_use]
    pub const fn is_armor(self) -> bool {
        matches!(self, Self::Helmet | Self::Chest | Self::Legs | Self::Boots)
    }
}

/// A stack of items, carrying its custom enchantment levels.
///
/// Enchantments are stored as `(ability name, level)` pairs; most items
/// carry a handful at most. A crystal carries its enchantment for delivery
/// only: its abilities never fire, it can only be applied to another item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u32,
    #[serde(default)]
    pub enchants: SmallVec<[(String, u32); 4]>,
    #[serde(default)]
    pub crystal: bool,
}

impl ItemStack {
    pub fn new(material: impl Into<Material>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            enchants: SmallVec::new(),
            crystal: false,
        }
    }

    /// Mark this stack as a crystal (builder pattern).
    #[must_use]
    pub fn as_crystal(mut self) -> Self {
        self.crystal = true;
        self
    }

    /// Add or replace a custom enchantment (builder pattern).
    #[must_use]
    pub fn with_enchant(mut self, ability: impl Into<String>, level: u32) -> Self {
        self.set_enchant(ability, level);
        self
    }

    /// Level of the named ability on this item; 0 means absent.
    #[must_use]
    pub fn enchant_level(&self, ability: &str) -> u32 {
        self.enchants
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(ability))
            .map_or(0, |(_, level)| *level)
    }

    /// Set an enchantment level. Level 0 removes the enchantment.
    pub fn set_enchant(&mut self, ability: impl Into<String>, level: u32) {
        let ability = ability.into();
        self.enchants.retain(|(name, _)| !name.eq_ignore_ascii_case(&ability));
        if level > 0 {
            self.enchants.push((ability, level));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_block_floors_negative() {
        assert_eq!(Location::new(-0.5, 0.0, 2.9).block(), BlockPos::new(-1, 0, 2));
    }

    #[test]
    fn test_cube_size() {
        assert_eq!(BlockPos::new(0, 0, 0).cube(1).count(), 27);
        assert_eq!(BlockPos::new(0, 0, 0).cube(0).count(), 1);
        assert_eq!(BlockPos::new(0, 0, 0).cube(-3).count(), 1);
    }

    #[test]
    fn test_material_normalized() {
        assert_eq!(Material::new("iron_ore"), Material::new("IRON_ORE"));
        assert!(Material::new("cave_air").is_air());
        assert!(!Material::new("STONE").is_air());
    }

    #[test]
    fn test_item_enchants() {
        let mut item = ItemStack::new("DIAMOND_BOOTS", 1).with_enchant("Speed", 2);
        assert_eq!(item.enchant_level("speed"), 2);
        assert_eq!(item.enchant_level("Haste"), 0);

        item.set_enchant("SPEED", 3);
        assert_eq!(item.enchants.len(), 1);
        assert_eq!(item.enchant_level("Speed"), 3);

        item.set_enchant("Speed", 0);
        assert!(item.enchants.is_empty());
    }

    #[test]
    fn test_equipment_slot_parse() {
        assert_eq!("boots".parse::<EquipmentSlot>(), Ok(EquipmentSlot::Boots));
        assert_eq!("MAIN_HAND".parse::<EquipmentSlot>(), Ok(EquipmentSlot::MainHand));
        assert!(EquipmentSlot::Helmet.is_armor());
        assert!(!EquipmentSlot::OffHand.is_armor());
    }
}
