//! Ability catalogue storage and lookup.
//!
//! The `AbilityStore` holds every ability definition, keyed by name. The
//! catalogue is a JSON object mapping ability name to definition; it is
//! loaded at startup and replaced wholesale on reload, so abilities may be
//! added or removed between runs without any migration.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::core::{EngineError, Result};
use crate::grammar::{unknown_conditions, unknown_effects};
use crate::triggers::TriggerKind;

use super::definition::{AbilityDefinition, LevelDefinition, Slot};

/// Registry of ability definitions.
///
/// ## Example
///
/// ```
/// use enchant_engine::abilities::{AbilityDefinition, AbilityStore, LevelDefinition, Slot};
/// use enchant_engine::triggers::TriggerKind;
///
/// let mut store = AbilityStore::new();
/// store
///     .insert(
///         AbilityDefinition::new("Haste", Slot::Held, TriggerKind::Passive)
///             .with_level(1, LevelDefinition::new(100, &["POTION:HASTE:1:5"])),
///     )
///     .unwrap();
///
/// assert!(store.get("haste").is_some());
/// assert_eq!(store.listening_to(TriggerKind::Passive).count(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AbilityStore {
    abilities: BTreeMap<String, AbilityDefinition>,
}

impl AbilityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalogue written on first start.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut speed = (1..=3).fold(
            AbilityDefinition::new("Speed", Slot::Boots, TriggerKind::Passive)
                .with_description("Gives you an unlimited Speed effect"),
            |ability, level| {
                let effect = format!("POTION:SPEED:{level}:100");
                ability.with_level(level, LevelDefinition::new(100, &[effect.as_str()]))
            },
        );
        speed.display_name = "&7Speed".to_string();

        let mut store = Self::new();
        store.abilities.insert(speed.name.clone(), speed);
        store
    }

    /// Add or replace one ability after validating it.
    pub fn insert(&mut self, ability: AbilityDefinition) -> Result<()> {
        ability.validate()?;
        warn_unknown_names(&ability);
        self.abilities.insert(ability.name.clone(), ability);
        Ok(())
    }

    /// Remove an ability by exact name.
    pub fn remove(&mut self, name: &str) -> Option<AbilityDefinition> {
        self.abilities.remove(name)
    }

    /// Look up an ability; exact name first, then ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AbilityDefinition> {
        self.abilities.get(name).or_else(|| {
            self.abilities
                .values()
                .find(|a| a.name.eq_ignore_ascii_case(name))
        })
    }

    /// All abilities, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(String::as_str)
    }

    /// Abilities an event of this kind makes eligible.
    pub fn listening_to(&self, trigger: TriggerKind) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values().filter(move |a| a.listens_to(trigger))
    }

    /// Abilities sold under a tier (case-insensitive).
    pub fn in_tier<'a>(&'a self, tier: &'a str) -> impl Iterator<Item = &'a AbilityDefinition> {
        self.abilities
            .values()
            .filter(move |a| a.tier.eq_ignore_ascii_case(tier))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Parse a catalogue from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, AbilityDefinition> = serde_json::from_str(text)?;
        let mut store = Self::new();
        for (name, mut ability) in raw {
            ability.name = name;
            if ability.display_name.is_empty() {
                ability.display_name = ability.name.clone();
            }
            store.insert(ability)?;
        }
        Ok(store)
    }

    /// Serialize the catalogue as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.abilities)?)
    }

    /// Load a catalogue file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let store = Self::from_json(&text)?;
        info!(path = %path.display(), abilities = store.len(), "ability catalogue loaded");
        Ok(store)
    }

    /// Load a catalogue file, writing the built-in catalogue first if the
    /// file does not exist.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let defaults = Self::with_defaults();
            defaults.save(path)?;
            info!(path = %path.display(), "wrote default ability catalogue");
            return Ok(defaults);
        }
        Self::load(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| EngineError::io(path, e))
    }

    /// Replace the whole catalogue from a file.
    ///
    /// On error the current catalogue is left untouched.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        *self = Self::load(path)?;
        Ok(self.len())
    }
}

fn warn_unknown_names(ability: &AbilityDefinition) {
    for (level, definition) in &ability.levels {
        for name in unknown_effects(&definition.effects) {
            warn!(ability = %ability.name, level = *level, effect = name, "unknown effect will be ignored");
        }
        for name in unknown_conditions(&definition.conditions) {
            warn!(ability = %ability.name, level = *level, condition = name, "unknown condition always passes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = AbilityStore::with_defaults();
        let speed = store.get("Speed").unwrap();
        assert_eq!(speed.slot, Slot::Boots);
        assert_eq!(speed.max_level(), 3);
        assert_eq!(speed.level(2).unwrap().effects[0].as_str(), "POTION:SPEED:2:100");
        assert!(speed.validate().is_ok());
    }

    #[test]
    fn test_get_ignores_case() {
        let store = AbilityStore::with_defaults();
        assert!(store.get("speed").is_some());
        assert!(store.get("SPEED").is_some());
        assert!(store.get("Haste").is_none());
    }

    #[test]
    fn test_from_json_sets_names() {
        let store = AbilityStore::from_json(
            r#"{ "Blaze": { "slot": "HELD", "trigger": "ON_HIT", "tier": "Elite",
                 "levels": { "1": { "chance": 25, "effects": ["FIRE:3"] } } } }"#,
        )
        .unwrap();
        let blaze = store.get("Blaze").unwrap();
        assert_eq!(blaze.name, "Blaze");
        assert_eq!(blaze.display_name, "Blaze");
        assert_eq!(store.in_tier("elite").count(), 1);
        assert_eq!(store.in_tier("Common").count(), 0);
    }

    #[test]
    fn test_from_json_rejects_gaps() {
        let err = AbilityStore::from_json(
            r#"{ "Broken": { "slot": "ANY", "trigger": "ON_HIT",
                 "levels": { "2": { "chance": 25 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalogue { ref ability, .. } if ability == "Broken"));
    }

    #[test]
    fn test_unknown_names_still_load() {
        let store = AbilityStore::from_json(
            r#"{ "Future": { "slot": "ANY", "trigger": "ON_KILL",
                 "levels": { "1": { "chance": 50, "effects": ["SUMMON:DRAGON"], "conditions": ["MOON:FULL"] } } } }"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_listening_to() {
        let mut store = AbilityStore::with_defaults();
        store
            .insert(
                AbilityDefinition::new("Blaze", Slot::Held, TriggerKind::OnHit)
                    .with_level(1, LevelDefinition::new(10, &["FIRE:1"])),
            )
            .unwrap();

        let passive: Vec<&str> = store
            .listening_to(TriggerKind::Passive)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(passive, vec!["Speed"]);
        assert_eq!(store.listening_to(TriggerKind::OnHit).count(), 1);
        assert_eq!(store.listening_to(TriggerKind::OnKill).count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let store = AbilityStore::with_defaults();
        let restored = AbilityStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored.get("Speed"), store.get("Speed"));
    }
}
