//! Ability definitions - static enchantment data.
//!
//! An `AbilityDefinition` describes one custom enchantment: where it may be
//! equipped, which event makes it eligible, and per-level activation chance,
//! effect script and conditions. Which items carry the ability, and at what
//! level, is stored on the items themselves ([`ItemStack::enchants`]).
//!
//! [`ItemStack::enchants`]: crate::core::ItemStack

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::core::{EngineError, EquipmentSlot, Material, Result};
use crate::grammar::EncodedInstruction;
use crate::triggers::TriggerKind;

/// Where an ability's item must be found for the ability to apply.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Slot {
    Helmet,
    Chest,
    Legs,
    Boots,
    /// Main hand.
    Held,
    /// Any of the four armor slots.
    Armor,
    Any,
}

impl Slot {
    /// Whether an item found in `slot` satisfies this restriction.
    #[must_use]
    pub const fn accepts(self, slot: EquipmentSlot) -> bool {
        match self {
            Self::Helmet => matches!(slot, EquipmentSlot::Helmet),
            Self::Chest => matches!(slot, EquipmentSlot::Chest),
            Self::Legs => matches!(slot, EquipmentSlot::Legs),
            Self::Boots => matches!(slot, EquipmentSlot::Boots),
            Self::Held => matches!(slot, EquipmentSlot::MainHand),
            Self::Armor => slot.is_armor(),
            Self::Any => true,
        }
    }

    /// Whether an item of this material could ever sit in an accepted slot.
    ///
    /// Used for items that arrive with an event (crafting results, anvil
    /// output, enchanting) and so have no slot yet.
    #[must_use]
    pub fn accepts_material(self, material: &Material) -> bool {
        let name = material.as_str();
        let helmet = name.ends_with("_HELMET") || name.ends_with("_HEAD") || name.ends_with("_SKULL");
        let chest = name.ends_with("_CHESTPLATE") || name == "ELYTRA";
        let legs = name.ends_with("_LEGGINGS");
        let boots = name.ends_with("_BOOTS");
        let held = ["_SWORD", "_AXE", "_PICKAXE", "_SHOVEL", "_HOE"]
            .iter()
            .any(|suffix| name.ends_with(suffix))
            || matches!(name, "BOW" | "CROSSBOW" | "TRIDENT" | "FISHING_ROD" | "SHEARS");

        match self {
            Self::Helmet => helmet,
            Self::Chest => chest,
            Self::Legs => legs,
            Self::Boots => boots,
            Self::Held => held,
            Self::Armor => helmet || chest || legs || boots,
            Self::Any => true,
        }
    }
}

/// One level of an ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Activation chance in percent, `0..=100`.
    pub chance: u8,

    /// Effect script, run in order when the level fires. May be empty.
    #[serde(default)]
    pub effects: Vec<EncodedInstruction>,

    /// Conditions, all of which must hold.
    #[serde(default)]
    pub conditions: Vec<EncodedInstruction>,
}

impl LevelDefinition {
    /// A level that always fires the given effects.
    #[must_use]
    pub fn new(chance: u8, effects: &[&str]) -> Self {
        Self {
            chance,
            effects: effects.iter().copied().map(EncodedInstruction::parse).collect(),
            conditions: Vec::new(),
        }
    }

    /// Add a condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: &str) -> Self {
        self.conditions.push(EncodedInstruction::parse(condition));
        self
    }
}

fn default_tier() -> String {
    "Common".to_string()
}

/// Static ability definition.
///
/// ## Example
///
/// ```
/// use enchant_engine::abilities::{AbilityDefinition, LevelDefinition, Slot};
/// use enchant_engine::triggers::TriggerKind;
///
/// let speed = AbilityDefinition::new("Speed", Slot::Boots, TriggerKind::Passive)
///     .with_level(1, LevelDefinition::new(100, &["POTION:SPEED:1:100"]))
///     .with_level(2, LevelDefinition::new(100, &["POTION:SPEED:2:100"]));
///
/// assert_eq!(speed.max_level(), 2);
/// assert!(speed.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Catalogue key; filled in from the map key when loaded.
    #[serde(skip)]
    pub name: String,

    /// Name shown to players, with `&` colour codes.
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Tier this ability is sold under.
    #[serde(default = "default_tier")]
    pub tier: String,

    pub slot: Slot,

    pub trigger: TriggerKind,

    /// Also evaluated on every passive opportunity, whatever its trigger.
    #[serde(default)]
    pub passive: bool,

    /// Seconds between activations for one actor. Most abilities have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u64>,

    /// Level number to level data. Levels run from 1 with no gaps.
    pub levels: BTreeMap<u32, LevelDefinition>,
}

impl AbilityDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, slot: Slot, trigger: TriggerKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            tier: default_tier(),
            slot,
            trigger,
            passive: trigger == TriggerKind::Passive,
            cooldown: None,
            levels: BTreeMap::new(),
        }
    }

    /// Add a level (builder pattern).
    #[must_use]
    pub fn with_level(mut self, level: u32, definition: LevelDefinition) -> Self {
        self.levels.insert(level, definition);
        self
    }

    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Gate activations behind a per-actor cooldown (builder pattern).
    #[must_use]
    pub fn with_cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = Some(seconds);
        self
    }

    /// Whether an event of this kind makes the ability eligible.
    #[must_use]
    pub fn listens_to(&self, trigger: TriggerKind) -> bool {
        self.trigger == trigger || (self.passive && trigger == TriggerKind::Passive)
    }

    /// Level data for `level`. Level 0 means the ability is absent.
    #[must_use]
    pub fn level(&self, level: u32) -> Option<&LevelDefinition> {
        self.levels.get(&level)
    }

    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.cooldown.map(Duration::from_secs)
    }

    /// Check the structural invariants: at least one level, levels
    /// contiguous from 1, chances within `0..=100`.
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(EngineError::invalid(&self.name, "no levels defined"));
        }
        for (expected, (&level, definition)) in (1u32..).zip(&self.levels) {
            if level != expected {
                return Err(EngineError::invalid(
                    &self.name,
                    format!("levels must be contiguous from 1, found {level} where {expected} was expected"),
                ));
            }
            if definition.chance > 100 {
                return Err(EngineError::invalid(
                    &self.name,
                    format!("level {level} chance {} exceeds 100", definition.chance),
                ));
            }
        }
        Ok(())
    }
}
