//! Tier shop and enchanting-table rolls.
//!
//! Abilities are grouped into tiers. Players buy a random ability of a tier
//! for experience levels and receive it as a crystal item carrying the
//! enchantment at level 1. Applying the crystal to a compatible item moves
//! the enchantment onto it. Enchanting tables can also roll a random
//! compatible ability onto the item being enchanted.

use tracing::debug;

use crate::core::{EngineConfig, EngineRng, EntityId, ItemStack, TierConfig, World};

use super::definition::AbilityDefinition;
use super::store::AbilityStore;

/// Material of the item a purchased ability is delivered on.
pub const CRYSTAL_MATERIAL: &str = "NETHER_STAR";

/// Result of a tier purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Purchase {
    /// Levels were deducted and the crystal given to the buyer.
    Bought {
        ability: String,
        cost: u32,
        crystal: ItemStack,
    },
    /// No tier with that name is configured.
    UnknownTier,
    /// The tier has no abilities; nothing was charged.
    EmptyTier,
    /// The buyer cannot afford the tier; nothing was charged.
    InsufficientLevels { required: u32, available: u32 },
}

/// Result of applying a crystal to an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrystalApply {
    /// The enchantment was merged; `item` is the result the host should
    /// store in place of the target, and the crystal is used up.
    Applied {
        ability: String,
        level: u32,
        item: ItemStack,
    },
    /// The first item is not a crystal carrying exactly one enchantment.
    NotACrystal,
    /// The crystal's ability is not in the catalogue.
    UnknownAbility,
    /// The ability does not fit the target item.
    IncompatibleItem,
    /// The target already has the ability at its highest level.
    AlreadyMax,
}

/// Crystal item carrying one ability at level 1.
#[must_use]
pub fn crystal(ability: &AbilityDefinition) -> ItemStack {
    ItemStack::new(CRYSTAL_MATERIAL, 1)
        .with_enchant(ability.name.clone(), 1)
        .as_crystal()
}

/// Merge a crystal's enchantment onto `item`.
///
/// The crystal's level adds to the level the item already has, capped at
/// the ability's highest level. Neither input is changed.
pub fn apply_crystal(store: &AbilityStore, crystal: &ItemStack, item: &ItemStack) -> CrystalApply {
    let [(name, crystal_level)] = crystal.enchants.as_slice() else {
        return CrystalApply::NotACrystal;
    };
    if !crystal.crystal {
        return CrystalApply::NotACrystal;
    }
    let Some(ability) = store.get(name) else {
        return CrystalApply::UnknownAbility;
    };
    if item.crystal || !ability.slot.accepts_material(&item.material) {
        return CrystalApply::IncompatibleItem;
    }

    let max = ability.max_level();
    let current = item.enchant_level(&ability.name);
    if current >= max {
        return CrystalApply::AlreadyMax;
    }
    let level = current.saturating_add(*crystal_level).min(max);
    let mut item = item.clone();
    item.set_enchant(ability.name.clone(), level);
    debug!(ability = %ability.name, level, material = %item.material.as_str(), "crystal applied");

    CrystalApply::Applied {
        ability: ability.name.clone(),
        level,
        item,
    }
}

/// Shop over a catalogue and the configured tiers.
pub struct TierShop<'a> {
    store: &'a AbilityStore,
    config: &'a EngineConfig,
}

impl<'a> TierShop<'a> {
    #[must_use]
    pub fn new(store: &'a AbilityStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Configured tier by name, ignoring case.
    #[must_use]
    pub fn tier(&self, name: &str) -> Option<(&'a str, &'a TierConfig)> {
        self.config
            .tiers
            .iter()
            .find(|(tier, _)| tier.eq_ignore_ascii_case(name))
            .map(|(tier, config)| (tier.as_str(), config))
    }

    /// Every tier with its cost and number of abilities, ordered by name.
    pub fn listing(&self) -> impl Iterator<Item = (&'a str, u32, usize)> + '_ {
        self.config
            .tiers
            .iter()
            .map(|(name, tier)| (name.as_str(), tier.cost, self.store.in_tier(name).count()))
    }

    /// Buy a random ability of `tier` for `buyer`.
    pub fn purchase(
        &self,
        world: &mut dyn World,
        buyer: EntityId,
        tier: &str,
        rng: &mut EngineRng,
    ) -> Purchase {
        let Some((tier, settings)) = self.tier(tier) else {
            return Purchase::UnknownTier;
        };
        let candidates: Vec<&AbilityDefinition> = self.store.in_tier(tier).collect();
        if candidates.is_empty() {
            return Purchase::EmptyTier;
        }

        let available = world.experience_level(buyer);
        if available < settings.cost {
            return Purchase::InsufficientLevels {
                required: settings.cost,
                available,
            };
        }
        let Some(ability) = rng.choose(&candidates) else {
            return Purchase::EmptyTier;
        };

        world.set_experience_level(buyer, available - settings.cost);
        let crystal = crystal(ability);
        world.give_item(buyer, crystal.clone());
        debug!(%buyer, tier, ability = %ability.name, cost = settings.cost, "tier purchase");

        Purchase::Bought {
            ability: ability.name.clone(),
            cost: settings.cost,
            crystal,
        }
    }

    /// Pick an ability and level for an item being enchanted.
    ///
    /// Only abilities whose slot fits the item and that the item does not
    /// already carry are considered. The level is drawn from the configured
    /// range and capped at the ability's highest level.
    pub fn roll_enchanting_table(&self, item: &ItemStack, rng: &mut EngineRng) -> Option<(String, u32)> {
        if !self.config.enchantment_table {
            return None;
        }
        let candidates: Vec<&AbilityDefinition> = self
            .store
            .iter()
            .filter(|a| a.slot.accepts_material(&item.material) && item.enchant_level(&a.name) == 0)
            .collect();
        let ability = rng.choose(&candidates)?;

        let min = self.config.enchanting_table_min.max(1);
        let max = self.config.enchanting_table_max.max(min);
        let level = rng.gen_range_inclusive(min..=max).min(ability.max_level());
        Some((ability.name.clone(), level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{LevelDefinition, Slot};
    use crate::core::{EntityKind, Location};
    use crate::sim::SimWorld;
    use crate::triggers::TriggerKind;

    fn store() -> AbilityStore {
        let mut store = AbilityStore::with_defaults();
        store
            .insert(
                AbilityDefinition::new("Blaze", Slot::Held, TriggerKind::OnHit)
                    .with_tier("Elite")
                    .with_level(1, LevelDefinition::new(20, &["FIRE:2"]))
                    .with_level(2, LevelDefinition::new(40, &["FIRE:4"])),
            )
            .unwrap();
        store
    }

    fn buyer(levels: u32) -> (SimWorld, EntityId) {
        let mut world = SimWorld::new();
        let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
        world.set_experience_level(player, levels);
        (world, player)
    }

    #[test]
    fn test_purchase_deducts_and_gives_crystal() {
        let (store, config) = (store(), EngineConfig::default());
        let shop = TierShop::new(&store, &config);
        let (mut world, player) = buyer(45);
        let mut rng = EngineRng::new(7);

        let purchase = shop.purchase(&mut world, player, "elite", &mut rng);
        let Purchase::Bought { ability, cost, crystal } = purchase else {
            panic!("Expected Bought");
        };
        assert_eq!(ability, "Blaze");
        assert_eq!(cost, 40);
        assert_eq!(crystal.enchant_level("Blaze"), 1);
        assert_eq!(world.experience_level(player), 5);
        assert_eq!(world.inventory(player), &[crystal]);
    }

    #[test]
    fn test_purchase_refusals_charge_nothing() {
        let (store, config) = (store(), EngineConfig::default());
        let shop = TierShop::new(&store, &config);
        let (mut world, player) = buyer(10);
        let mut rng = EngineRng::new(7);

        assert_eq!(
            shop.purchase(&mut world, player, "Common", &mut rng),
            Purchase::InsufficientLevels { required: 20, available: 10 }
        );
        assert_eq!(shop.purchase(&mut world, player, "Mythic", &mut rng), Purchase::UnknownTier);

        world.set_experience_level(player, 100);
        assert_eq!(shop.purchase(&mut world, player, "Legendary", &mut rng), Purchase::EmptyTier);
        assert_eq!(world.experience_level(player), 100);
        assert!(world.inventory(player).is_empty());
    }

    #[test]
    fn test_purchased_crystal_is_marked() {
        let store = store();
        let crystal = crystal(store.get("Blaze").unwrap());
        assert!(crystal.crystal);
        assert_eq!(crystal.material.as_str(), CRYSTAL_MATERIAL);
    }

    #[test]
    fn test_apply_crystal_merges_and_caps() {
        let store = store();
        let crystal = crystal(store.get("Blaze").unwrap());
        let sword = ItemStack::new("IRON_SWORD", 1);

        let CrystalApply::Applied { ability, level, item } = apply_crystal(&store, &crystal, &sword) else {
            panic!("Expected Applied");
        };
        assert_eq!((ability.as_str(), level), ("Blaze", 1));
        assert_eq!(item.enchant_level("Blaze"), 1);
        assert!(!item.crystal);

        let CrystalApply::Applied { item, .. } = apply_crystal(&store, &crystal, &item) else {
            panic!("Expected Applied");
        };
        assert_eq!(item.enchant_level("Blaze"), 2);
        assert_eq!(apply_crystal(&store, &crystal, &item), CrystalApply::AlreadyMax);

        let strong = ItemStack::new(CRYSTAL_MATERIAL, 1).with_enchant("Blaze", 5).as_crystal();
        let CrystalApply::Applied { level, .. } = apply_crystal(&store, &strong, &sword) else {
            panic!("Expected Applied");
        };
        assert_eq!(level, 2);
    }

    #[test]
    fn test_apply_crystal_refusals() {
        let store = store();
        let blaze = crystal(store.get("Blaze").unwrap());
        let sword = ItemStack::new("IRON_SWORD", 1);

        assert_eq!(
            apply_crystal(&store, &blaze, &ItemStack::new("DIAMOND_BOOTS", 1)),
            CrystalApply::IncompatibleItem
        );
        assert_eq!(apply_crystal(&store, &blaze, &blaze), CrystalApply::IncompatibleItem);

        let plain = ItemStack::new("STICK", 1).with_enchant("Blaze", 1);
        assert_eq!(apply_crystal(&store, &plain, &sword), CrystalApply::NotACrystal);
        let empty = ItemStack::new(CRYSTAL_MATERIAL, 1).as_crystal();
        assert_eq!(apply_crystal(&store, &empty, &sword), CrystalApply::NotACrystal);

        let unknown = ItemStack::new(CRYSTAL_MATERIAL, 1).with_enchant("Vanished", 1).as_crystal();
        assert_eq!(apply_crystal(&store, &unknown, &sword), CrystalApply::UnknownAbility);
    }

    #[test]
    fn test_listing() {
        let (store, config) = (store(), EngineConfig::default());
        let shop = TierShop::new(&store, &config);
        let listing: Vec<_> = shop.listing().collect();
        assert_eq!(
            listing,
            vec![("Common", 20, 1), ("Elite", 40, 1), ("Legendary", 60, 0)]
        );
    }

    #[test]
    fn test_enchanting_table_roll() {
        let (store, config) = (store(), EngineConfig::default());
        let shop = TierShop::new(&store, &config);
        let mut rng = EngineRng::new(3);

        for _ in 0..50 {
            let (ability, level) = shop
                .roll_enchanting_table(&ItemStack::new("IRON_SWORD", 1), &mut rng)
                .unwrap();
            assert_eq!(ability, "Blaze");
            assert!((1..=2).contains(&level));
        }

        let enchanted = ItemStack::new("IRON_SWORD", 1).with_enchant("Blaze", 1);
        assert!(shop.roll_enchanting_table(&enchanted, &mut rng).is_none());
        assert!(shop.roll_enchanting_table(&ItemStack::new("STONE", 1), &mut rng).is_none());
    }

    #[test]
    fn test_enchanting_table_disabled() {
        let store = store();
        let config = EngineConfig {
            enchantment_table: false,
            ..EngineConfig::default()
        };
        let shop = TierShop::new(&store, &config);
        let mut rng = EngineRng::new(3);
        assert!(shop
            .roll_enchanting_table(&ItemStack::new("DIAMOND_BOOTS", 1), &mut rng)
            .is_none());
    }
}
