//! Trigger dispatch.
//!
//! For each activation an event produces, the dispatcher walks the
//! abilities listening to that trigger and, for every item carrying one:
//!
//! 1. checks the item was found in a slot the ability accepts
//! 2. resolves the level definition from the item's enchantment level
//! 3. checks the ability's cooldown, if it has one
//! 4. draws one chance roll against the level's weight
//! 5. evaluates the level's conditions
//! 6. runs the effect script in order
//! 7. starts the ability's cooldown, if it has one
//!
//! Stopping at any step is a fizzle: an ordinary outcome that changes
//! nothing and is never reported to the player.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::abilities::{AbilityDefinition, AbilityStore};
use crate::conditions::{ConditionContext, ConditionEvaluator};
use crate::cooldowns::CooldownRegistry;
use crate::core::{EngineConfig, EngineRng, EntityId, EquipmentSlot, ItemStack, Timestamp, World};
use crate::effects::{EffectContext, EffectInterpreter, ExecOutcome};
use crate::mutations::MutationTracker;
use crate::support::SupportRegistry;

use super::event::{Activation, EventPayload, GameEvent, TriggerKind};

/// Why an eligible ability did not fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fizzle {
    /// The actor used this ability too recently.
    Cooldown,
    /// The chance roll missed.
    ChanceRoll,
    /// A condition did not hold.
    Conditions,
}

/// What happened to one eligible ability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The effect script ran; one outcome per instruction.
    Fired(Vec<ExecOutcome>),
    Fizzled(Fizzle),
}

/// One ability considered during dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityActivation {
    pub ability: String,
    pub level: u32,
    pub trigger: TriggerKind,
    pub actor: EntityId,
    /// Where the item was found; `None` for items carried by the event.
    pub slot: Option<EquipmentSlot>,
    pub outcome: ActivationOutcome,
}

impl AbilityActivation {
    #[must_use]
    pub fn fired(&self) -> bool {
        matches!(self.outcome, ActivationOutcome::Fired(_))
    }
}

/// Result of dispatching one event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    /// Event data after effects ran; the host applies it (final damage,
    /// remaining drops, resulting item).
    pub payload: EventPayload,
    pub activations: Vec<AbilityActivation>,
}

impl DispatchReport {
    /// Activations that fired.
    pub fn fired(&self) -> impl Iterator<Item = &AbilityActivation> {
        self.activations.iter().filter(|a| a.fired())
    }

    #[must_use]
    pub fn fired_count(&self) -> usize {
        self.fired().count()
    }
}

/// The engine state an activation may read or change.
pub struct DispatchEnv<'a> {
    pub world: &'a mut dyn World,
    pub store: &'a AbilityStore,
    pub mutations: &'a mut MutationTracker,
    pub support: &'a SupportRegistry,
    pub config: &'a EngineConfig,
    pub now: Timestamp,
}

/// Matches events to abilities and runs them.
///
/// Owns the chance-roll RNG and the per-ability cooldowns. Nothing about an
/// individual dispatch is kept afterwards.
#[derive(Debug)]
pub struct TriggerDispatcher {
    rng: EngineRng,
    cooldowns: FxHashMap<String, CooldownRegistry>,
}

type CandidateItems = SmallVec<[(Option<EquipmentSlot>, ItemStack); 5]>;

impl TriggerDispatcher {
    #[must_use]
    pub fn new(rng: EngineRng) -> Self {
        Self {
            rng,
            cooldowns: FxHashMap::default(),
        }
    }

    pub fn rng_mut(&mut self) -> &mut EngineRng {
        &mut self.rng
    }

    /// Cooldowns of one ability, if it has been used.
    #[must_use]
    pub fn cooldowns(&self, ability: &str) -> Option<&CooldownRegistry> {
        self.cooldowns.get(ability)
    }

    /// Dispatch every activation of an event.
    pub fn dispatch(&mut self, event: &GameEvent, env: &mut DispatchEnv) -> DispatchReport {
        let mut report = DispatchReport {
            payload: event.payload(),
            activations: Vec::new(),
        };
        for activation in event.activations() {
            self.dispatch_activation(activation, env, &mut report);
        }
        report
    }

    /// Dispatch a single trigger evaluation, appending to `report`.
    pub fn dispatch_activation(
        &mut self,
        activation: Activation,
        env: &mut DispatchEnv,
        report: &mut DispatchReport,
    ) {
        let items = candidate_items(activation.trigger, activation.actor, &*env.world, &report.payload);
        if items.is_empty() {
            return;
        }
        let store = env.store;

        for ability in store.listening_to(activation.trigger) {
            for (slot, item) in &items {
                let fits = match slot {
                    Some(slot) => ability.slot.accepts(*slot),
                    None => ability.slot.accepts_material(&item.material),
                };
                if !fits {
                    continue;
                }
                let level = item.enchant_level(&ability.name);
                if level == 0 {
                    continue;
                }
                let outcome = self.activate(ability, level, activation, item, env, &mut report.payload);
                let Some(outcome) = outcome else {
                    continue;
                };
                report.activations.push(AbilityActivation {
                    ability: ability.name.clone(),
                    level,
                    trigger: activation.trigger,
                    actor: activation.actor,
                    slot: *slot,
                    outcome,
                });
            }
        }
    }

    // Steps 2 to 7 for one (ability, item) pair. `None` when the item's
    // level is not in the catalogue.
    fn activate(
        &mut self,
        ability: &AbilityDefinition,
        level: u32,
        activation: Activation,
        item: &ItemStack,
        env: &mut DispatchEnv,
        payload: &mut EventPayload,
    ) -> Option<ActivationOutcome> {
        let Some(definition) = ability.level(level) else {
            debug!(ability = %ability.name, level, "item level not in catalogue");
            return None;
        };
        let actor = activation.actor;
        let target = activation.target_or_actor();

        if let Some(cooldown) = ability.cooldown_duration() {
            let on_cooldown = self
                .cooldowns
                .get(&ability.name)
                .is_some_and(|c| c.is_on_cooldown(actor, cooldown, env.now));
            if on_cooldown {
                debug!(ability = %ability.name, %actor, "fizzled: cooldown");
                return Some(ActivationOutcome::Fizzled(Fizzle::Cooldown));
            }
        }

        if !self.rng.passes(definition.chance) {
            debug!(ability = %ability.name, %actor, chance = definition.chance, "fizzled: chance roll");
            return Some(ActivationOutcome::Fizzled(Fizzle::ChanceRoll));
        }

        let conditions_hold = {
            let ctx = ConditionContext::new(&*env.world, actor, target).with_item(item);
            ConditionEvaluator::evaluate_all(&definition.conditions, &ctx)
        };
        if !conditions_hold {
            debug!(ability = %ability.name, %actor, "fizzled: conditions");
            return Some(ActivationOutcome::Fizzled(Fizzle::Conditions));
        }

        let mut ctx = EffectContext {
            world: &mut *env.world,
            actor,
            target,
            payload,
            mutations: &mut *env.mutations,
            support: env.support,
            config: env.config,
            now: env.now,
        };
        let outcomes = EffectInterpreter::execute_all(&definition.effects, &mut ctx);
        debug!(ability = %ability.name, level, %actor, trigger = activation.trigger.name(), "fired");

        if ability.cooldown.is_some() {
            self.cooldowns
                .entry(ability.name.clone())
                .or_default()
                .apply_cooldown(actor, env.now);
        }
        Some(ActivationOutcome::Fired(outcomes))
    }
}

// Items whose abilities a trigger considers, with where they were found.
// Crystals are never candidates.
fn candidate_items(
    trigger: TriggerKind,
    actor: EntityId,
    world: &dyn World,
    payload: &EventPayload,
) -> CandidateItems {
    if trigger.uses_event_item() {
        return payload
            .item
            .iter()
            .filter(|item| !item.crystal)
            .map(|item| (None, item.clone()))
            .collect();
    }
    let slots: &[EquipmentSlot] = match trigger {
        TriggerKind::Passive => &[
            EquipmentSlot::Helmet,
            EquipmentSlot::Chest,
            EquipmentSlot::Legs,
            EquipmentSlot::Boots,
            EquipmentSlot::MainHand,
        ],
        TriggerKind::OnDefend => &EquipmentSlot::ARMOR,
        _ => &[EquipmentSlot::MainHand],
    };
    slots
        .iter()
        .filter_map(|&slot| world.equipment(actor, slot).map(|item| (Some(slot), item)))
        .filter(|(_, item)| !item.crystal)
        .collect()
}
