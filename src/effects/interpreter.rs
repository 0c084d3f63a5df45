//! Effect execution.
//!
//! The `EffectInterpreter` turns one encoded instruction into a change of
//! game state. Instructions in a list run in order and independently: a
//! skipped or unknown instruction never stops the rest, and nothing already
//! applied is rolled back.

use tracing::debug;

use crate::core::{
    ticks_to_duration, BlockPos, BlockState, EngineConfig, EntityId, EntityKind, ItemStack, Location,
    Material, PotionEffect, Timestamp, World,
};
use crate::grammar::{EffectKind, EncodedInstruction};
use crate::mutations::MutationTracker;
use crate::support::SupportRegistry;
use crate::triggers::EventPayload;

use super::effect::Effect;

/// Everything an effect may touch.
pub struct EffectContext<'a> {
    pub world: &'a mut dyn World,
    /// The entity whose ability fired.
    pub actor: EntityId,
    /// The other party (the actor itself when the event has none).
    pub target: EntityId,
    /// Event data effects can read and rewrite (damage, drops, block).
    pub payload: &'a mut EventPayload,
    pub mutations: &'a mut MutationTracker,
    pub support: &'a SupportRegistry,
    pub config: &'a EngineConfig,
    pub now: Timestamp,
}

impl EffectContext<'_> {
    /// Whether effects aimed at the target count as hostile action.
    ///
    /// Self-targeting and friendly pairs are not.
    #[must_use]
    pub fn target_is_hostile(&self) -> bool {
        self.target != self.actor && !self.support.is_friendly(self.actor, self.target)
    }

    fn can_build(&self, pos: BlockPos) -> bool {
        self.support.can_build(self.actor, pos.center())
    }

    fn revert_at(&self, ticks: u64) -> Option<Timestamp> {
        Some(self.now.after(ticks_to_duration(ticks)))
    }
}

/// Result of executing one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The effect ran.
    Applied(EffectKind),
    /// The name matched no effect; nothing happened.
    Unknown,
    /// The effect is known but could not run (missing tokens, no target,
    /// friendly target, missing event data).
    Skipped(EffectKind),
}

/// Runs encoded effect instructions.
pub struct EffectInterpreter;

impl EffectInterpreter {
    /// Execute one instruction.
    pub fn execute(instruction: &EncodedInstruction, ctx: &mut EffectContext) -> ExecOutcome {
        let Some(kind) = EffectKind::lookup(instruction.name()) else {
            debug!(effect = %instruction, "unknown effect ignored");
            return ExecOutcome::Unknown;
        };
        let Some(effect) = Effect::from_instruction(kind, instruction) else {
            debug!(effect = %instruction, "effect missing required arguments");
            return ExecOutcome::Skipped(kind);
        };
        if Self::apply(&effect, ctx) {
            ExecOutcome::Applied(kind)
        } else {
            ExecOutcome::Skipped(kind)
        }
    }

    /// Execute a list of instructions in order.
    pub fn execute_all<'i>(
        instructions: impl IntoIterator<Item = &'i EncodedInstruction>,
        ctx: &mut EffectContext,
    ) -> Vec<ExecOutcome> {
        instructions
            .into_iter()
            .map(|instruction| Self::execute(instruction, ctx))
            .collect()
    }

    /// Apply a parsed effect. Returns `false` if it had nothing to act on.
    pub fn apply(effect: &Effect, ctx: &mut EffectContext) -> bool {
        match effect {
            Effect::Potion { effect, on_target } => {
                let entity = if *on_target { ctx.target } else { ctx.actor };
                ctx.world.add_potion_effect(entity, *effect);
                true
            }

            Effect::Feed { amount, on_target } => {
                let entity = if *on_target { ctx.target } else { ctx.actor };
                let Some(food) = ctx.world.food_level(entity) else {
                    return false;
                };
                ctx.world.set_food_level(entity, food.saturating_add(*amount));
                true
            }

            Effect::Fire { ticks } => {
                if !ctx.target_is_hostile() {
                    return false;
                }
                ctx.world.set_fire_ticks(ctx.target, *ticks);
                true
            }

            Effect::Explode { power, break_blocks } => {
                if !ctx.target_is_hostile() {
                    return false;
                }
                let Some(at) = ctx.world.location(ctx.target) else {
                    return false;
                };
                let break_blocks = *break_blocks && ctx.can_build(at.block());
                ctx.world.create_explosion(at, *power, break_blocks, false);
                true
            }

            Effect::Smelt => {
                let config = ctx.config;
                let mut changed = false;
                for item in &mut ctx.payload.drops {
                    if let Some(smelted) = config.smelted(&item.material) {
                        item.material = smelted.clone();
                        changed = true;
                    }
                }
                changed
            }

            Effect::Infusion { radius } => Self::infuse(*radius, ctx),

            Effect::Aura { effect, radius } => {
                Self::aura(*effect, *radius, ctx);
                true
            }

            Effect::Lightning { on_self } => {
                let entity = if *on_self {
                    ctx.actor
                } else if ctx.target_is_hostile() {
                    ctx.target
                } else {
                    return false;
                };
                let Some(at) = ctx.world.location(entity) else {
                    return false;
                };
                ctx.world.strike_lightning(at);
                true
            }

            Effect::Experience { amount } => {
                ctx.world.give_experience(ctx.actor, *amount);
                true
            }

            Effect::Heal { amount, on_target } => {
                let entity = if *on_target { ctx.target } else { ctx.actor };
                let (Some(health), Some(max)) = (ctx.world.health(entity), ctx.world.max_health(entity))
                else {
                    return false;
                };
                ctx.world.set_health(entity, (health + amount).min(max));
                true
            }

            Effect::DamageModifier { multiplier } => match ctx.payload.damage.as_mut() {
                Some(damage) => {
                    *damage *= multiplier;
                    true
                }
                None => false,
            },

            Effect::DropHead => {
                if ctx.target == ctx.actor {
                    return false;
                }
                let Some(head) = ctx.world.entity_kind(ctx.target).and_then(head_for) else {
                    return false;
                };
                ctx.payload.drops.push(ItemStack::new(head, 1));
                true
            }

            Effect::Multishot { count, spread } => {
                for i in 1..=*count {
                    let step = ((i + 1) / 2) as f32;
                    let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                    ctx.world.launch_projectile(ctx.actor, side * step * spread);
                }
                *count > 0
            }

            Effect::ReplaceNear {
                from,
                to,
                radius,
                duration_ticks,
            } => Self::replace_near(from, to, *radius, *duration_ticks, ctx),

            Effect::Coat {
                material,
                duration_ticks,
            } => Self::coat(material, *duration_ticks, ctx),

            Effect::Telepathy => {
                if ctx.payload.drops.is_empty() {
                    return false;
                }
                for item in ctx.payload.drops.drain(..) {
                    ctx.world.give_item(ctx.actor, item);
                }
                true
            }
        }
    }

    fn infuse(radius: i32, ctx: &mut EffectContext) -> bool {
        let Some(center) = ctx.payload.block else {
            return false;
        };
        let mut broken = 0;
        for pos in center.cube(radius).filter(|&p| p != center) {
            let state = ctx.world.block(pos);
            if state.material.is_air()
                || ctx.config.is_infusion_blacklisted(&state.material)
                || ctx.mutations.is_mutated(pos)
                || !ctx.can_build(pos)
            {
                continue;
            }
            ctx.world.set_block(pos, BlockState::air());
            ctx.payload.drops.push(ItemStack::new(state.material, 1));
            broken += 1;
        }
        debug!(%center, broken, "infusion");
        broken > 0
    }

    fn aura(effect: PotionEffect, radius: f64, ctx: &mut EffectContext) {
        ctx.world.add_potion_effect(ctx.actor, effect);
        if radius <= 0.0 {
            return;
        }
        let Some(center) = ctx.world.location(ctx.actor) else {
            return;
        };
        let allies: Vec<EntityId> = ctx
            .world
            .nearby_entities(center, radius)
            .into_iter()
            .filter(|&e| e != ctx.actor && ctx.support.is_friendly(ctx.actor, e))
            .collect();
        for ally in allies {
            ctx.world.add_potion_effect(ally, effect);
        }
    }

    // Flat square one block below the actor's feet.
    fn replace_near(
        from: &Material,
        to: &Material,
        radius: i32,
        duration_ticks: u64,
        ctx: &mut EffectContext,
    ) -> bool {
        let Some(feet) = ctx.world.location(ctx.actor).map(Location::block) else {
            return false;
        };
        let floor = feet.offset(0, -1, 0);
        let revert_at = ctx.revert_at(duration_ticks);

        let mut replaced = 0;
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let pos = floor.offset(dx, 0, dz);
                let original = ctx
                    .mutations
                    .original(pos)
                    .map_or_else(|| ctx.world.block(pos).material, |s| s.material.clone());
                if &original != from || !ctx.can_build(pos) {
                    continue;
                }
                ctx.mutations
                    .mutate(&mut *ctx.world, pos, BlockState::new(to.clone()), revert_at);
                replaced += 1;
            }
        }
        replaced > 0
    }

    // Shell around the target's two-block-tall body, plus a cap.
    fn coat(material: &Material, duration_ticks: u64, ctx: &mut EffectContext) -> bool {
        if !ctx.target_is_hostile() {
            return false;
        }
        let Some(feet) = ctx.world.location(ctx.target).map(Location::block) else {
            return false;
        };
        let revert_at = ctx.revert_at(duration_ticks);

        let mut shell = Vec::with_capacity(9);
        for dy in 0..2 {
            for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                shell.push(feet.offset(dx, dy, dz));
            }
        }
        shell.push(feet.offset(0, 2, 0));

        let mut placed = 0;
        for pos in shell {
            let was_air = ctx
                .mutations
                .original(pos)
                .map_or_else(|| ctx.world.block(pos).material.is_air(), |s| s.material.is_air());
            if !was_air || !ctx.can_build(pos) {
                continue;
            }
            ctx.mutations
                .mutate(&mut *ctx.world, pos, BlockState::new(material.clone()), revert_at);
            placed += 1;
        }
        placed > 0
    }
}

/// Head item dropped by an entity kind, if it has one.
#[must_use]
pub fn head_for(kind: EntityKind) -> Option<Material> {
    let name = match kind {
        EntityKind::Player => "PLAYER_HEAD",
        EntityKind::Zombie => "ZOMBIE_HEAD",
        EntityKind::Skeleton => "SKELETON_SKULL",
        EntityKind::WitherSkeleton => "WITHER_SKELETON_SKULL",
        EntityKind::Creeper => "CREEPER_HEAD",
        EntityKind::EnderDragon => "DRAGON_HEAD",
        EntityKind::Piglin => "PIGLIN_HEAD",
        EntityKind::Other => return None,
    };
    Some(Material::new(name))
}
