//! Engine configuration.
//!
//! Hosts configure the engine at startup with an `EngineConfig`, usually
//! loaded from JSON. Every field has a default, so a partial (or empty)
//! file is valid and new fields never break old files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entity::Material;
use super::error::{EngineError, Result};

/// Price and identity of an enchantment tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Experience levels charged for a random enchantment of this tier.
    pub cost: u32,
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chat prefix substituted for `%prefix%` in messages.
    pub prefix: String,

    /// Open the tier GUI on a bare base command (players only).
    pub tier_gui: bool,

    /// Whether enchanting tables can roll custom enchantments.
    pub enchantment_table: bool,
    pub enchanting_table_min: u32,
    pub enchanting_table_max: u32,

    /// Ore/raw material to smelted result, used by `SMELT`.
    pub smelt: FxHashMap<Material, Material>,

    /// Blocks `INFUSION` never breaks.
    pub infusion_blacklist: Vec<Material>,

    /// Tier name to tier settings.
    pub tiers: BTreeMap<String, TierConfig>,

    /// Ticks between mutation revert sweeps.
    pub sweep_interval: u64,

    /// Ticks between user data saves.
    pub save_interval: u64,

    /// Where catalogue and user data live.
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let smelt = [
            ("IRON_ORE", "IRON_INGOT"),
            ("DEEPSLATE_IRON_ORE", "IRON_INGOT"),
            ("RAW_IRON", "IRON_INGOT"),
            ("RAW_GOLD", "GOLD_INGOT"),
            ("RAW_COPPER", "COPPER_INGOT"),
            ("GOLD_ORE", "GOLD_INGOT"),
            ("DEEPSLATE_GOLD_ORE", "GOLD_INGOT"),
            ("SAND", "GLASS"),
        ]
        .into_iter()
        .map(|(from, to)| (Material::new(from), Material::new(to)))
        .collect();

        let infusion_blacklist = ["BEDROCK", "SPAWNER", "CHEST", "TRAPPED_CHEST", "WATER", "LAVA"]
            .into_iter()
            .map(Material::new)
            .collect();

        let tiers = [("Common", 20), ("Elite", 40), ("Legendary", 60)]
            .into_iter()
            .map(|(name, cost)| (name.to_string(), TierConfig { cost }))
            .collect();

        Self {
            prefix: "&e&lIridiumEnchants &8»".to_string(),
            tier_gui: true,
            enchantment_table: true,
            enchanting_table_min: 1,
            enchanting_table_max: 3,
            smelt,
            infusion_blacklist,
            tiers,
            sweep_interval: 20,
            save_interval: 6000,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| EngineError::io(path, e))
    }

    /// Smelted result for a material, if it has one.
    #[must_use]
    pub fn smelted(&self, material: &Material) -> Option<&Material> {
        self.smelt.get(material)
    }

    #[must_use]
    pub fn is_infusion_blacklisted(&self, material: &Material) -> bool {
        self.infusion_blacklist.contains(material)
    }
}
