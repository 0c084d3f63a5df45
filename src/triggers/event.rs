//! Host events and the trigger kinds they map to.
//!
//! The host forwards each relevant game event as a [`GameEvent`]. One event
//! may produce several activations: a damage event is `ON_HIT` for the
//! attacker and `ON_DEFEND` for the victim. Events also carry mutable data
//! (damage, drops, the crafted item) that effects can rewrite; the
//! dispatcher hands it back as an [`EventPayload`] so the host can apply the
//! result.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::core::{BlockPos, EntityId, ItemStack};

/// The class of event an ability listens to.
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
pub enum TriggerKind {
    /// Re-evaluated on every passive opportunity while the item is worn or held.
    Passive,
    OnHit,
    OnDefend,
    OnShot,
    OnBlockBreak,
    OnKill,
    OnCraft,
    OnAnvilUse,
    OnEnchantApply,
}

impl TriggerKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Whether the ability's item comes with the event rather than from the
    /// actor's equipment.
    #[must_use]
    pub const fn uses_event_item(self) -> bool {
        matches!(self, Self::OnCraft | Self::OnAnvilUse | Self::OnEnchantApply)
    }
}

/// Event data effects may read and rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Damage dealt by the event, if it is a damage event.
    pub damage: Option<f64>,
    /// Items the event will drop (block break, death).
    pub drops: Vec<ItemStack>,
    /// The block the event happened at.
    pub block: Option<BlockPos>,
    /// The item the event produces (craft, anvil, enchant).
    pub item: Option<ItemStack>,
}

/// One trigger evaluation produced by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub trigger: TriggerKind,
    pub actor: EntityId,
    pub target: Option<EntityId>,
}

impl Activation {
    #[must_use]
    pub const fn new(trigger: TriggerKind, actor: EntityId, target: Option<EntityId>) -> Self {
        Self { trigger, actor, target }
    }

    /// Target, falling back to the actor for self-directed events.
    #[must_use]
    pub fn target_or_actor(&self) -> EntityId {
        self.target.unwrap_or(self.actor)
    }
}

/// An event notification from the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A passive opportunity for an entity (movement, periodic refresh).
    Passive { actor: EntityId },

    /// One entity damaged another.
    EntityDamage {
        attacker: EntityId,
        victim: EntityId,
        damage: f64,
    },

    ProjectileShot { shooter: EntityId },

    BlockBreak {
        actor: EntityId,
        block: BlockPos,
        drops: Vec<ItemStack>,
    },

    EntityDeath {
        killer: EntityId,
        victim: EntityId,
        drops: Vec<ItemStack>,
    },

    Craft { actor: EntityId, result: ItemStack },

    AnvilPrepare { actor: EntityId, result: ItemStack },

    /// An item was enchanted at an enchanting table.
    ItemEnchant { actor: EntityId, item: ItemStack },

    /// A player dropped a crystal onto an item to move its enchantment
    /// there. Nothing fires; the engine merges the enchantment.
    ApplyCrystal {
        actor: EntityId,
        crystal: ItemStack,
        item: ItemStack,
    },

    PlayerJoin { player: EntityId, name: String },

    PlayerQuit { player: EntityId },
}

impl GameEvent {
    /// Trigger evaluations for this event, in dispatch order.
    #[must_use]
    pub fn activations(&self) -> SmallVec<[Activation; 2]> {
        match *self {
            Self::Passive { actor } => smallvec![Activation::new(TriggerKind::Passive, actor, None)],
            Self::EntityDamage { attacker, victim, .. } => smallvec![
                Activation::new(TriggerKind::OnHit, attacker, Some(victim)),
                Activation::new(TriggerKind::OnDefend, victim, Some(attacker)),
            ],
            Self::ProjectileShot { shooter } => {
                smallvec![Activation::new(TriggerKind::OnShot, shooter, None)]
            }
            Self::BlockBreak { actor, .. } => {
                smallvec![Activation::new(TriggerKind::OnBlockBreak, actor, None)]
            }
            Self::EntityDeath { killer, victim, .. } => {
                smallvec![Activation::new(TriggerKind::OnKill, killer, Some(victim))]
            }
            Self::Craft { actor, .. } => smallvec![Activation::new(TriggerKind::OnCraft, actor, None)],
            Self::AnvilPrepare { actor, .. } => {
                smallvec![Activation::new(TriggerKind::OnAnvilUse, actor, None)]
            }
            Self::ItemEnchant { actor, .. } => {
                smallvec![Activation::new(TriggerKind::OnEnchantApply, actor, None)]
            }
            Self::ApplyCrystal { .. } | Self::PlayerJoin { .. } | Self::PlayerQuit { .. } => SmallVec::new(),
        }
    }

    /// The mutable data this event starts with.
    #[must_use]
    pub fn payload(&self) -> EventPayload {
        let mut payload = EventPayload::default();
        match self {
            Self::EntityDamage { damage, .. } => payload.damage = Some(*damage),
            Self::BlockBreak { block, drops, .. } => {
                payload.block = Some(*block);
                payload.drops = drops.clone();
            }
            Self::EntityDeath { drops, .. } => payload.drops = drops.clone(),
            Self::Craft { result, .. } | Self::AnvilPrepare { result, .. } => {
                payload.item = Some(result.clone());
            }
            Self::ItemEnchant { item, .. } => payload.item = Some(item.clone()),
            Self::Passive { .. }
            | Self::ProjectileShot { .. }
            | Self::ApplyCrystal { .. }
            | Self::PlayerJoin { .. }
            | Self::PlayerQuit { .. } => {}
        }
        payload
    }
}
