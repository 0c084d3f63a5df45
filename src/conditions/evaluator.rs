//! Condition evaluation.
//!
//! A level's conditions are combined with logical AND. Evaluation only reads
//! the world, so the order of conditions does not matter.

use crate::core::{EntityId, EquipmentSlot, ItemStack, World};
use crate::grammar::EncodedInstruction;

use super::condition::{Comparison, Condition};

/// What a condition is evaluated against.
pub struct ConditionContext<'a> {
    /// Read access to the host world.
    pub world: &'a dyn World,
    /// The entity whose ability is activating.
    pub actor: EntityId,
    /// The other party of the event (the actor itself when there is none).
    pub target: EntityId,
    /// The item carrying the ability, if the trigger has one.
    pub item: Option<&'a ItemStack>,
}

impl<'a> ConditionContext<'a> {
    /// Create a context with no item.
    pub fn new(world: &'a dyn World, actor: EntityId, target: EntityId) -> Self {
        Self {
            world,
            actor,
            target,
            item: None,
        }
    }

    /// Attach the ability's item (builder pattern).
    #[must_use]
    pub fn with_item(mut self, item: &'a ItemStack) -> Self {
        self.item = Some(item);
        self
    }
}

/// Evaluator for ability conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check a parsed condition.
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext) -> bool {
        match condition {
            Condition::PlayerHealth(cmp) => Self::health_holds(ctx, ctx.actor, cmp),

            Condition::TargetHealth(cmp) => Self::health_holds(ctx, ctx.target, cmp),

            Condition::IsWearing(material) => match material {
                Some(material) => EquipmentSlot::ARMOR.iter().any(|&slot| {
                    ctx.world
                        .equipment(ctx.actor, slot)
                        .is_some_and(|item| &item.material == material)
                }),
                None => true,
            },

            Condition::IsHolding(material) => match material {
                Some(material) => ctx
                    .world
                    .equipment(ctx.actor, EquipmentSlot::MainHand)
                    .is_some_and(|item| &item.material == material),
                None => true,
            },
        }
    }

    /// Check one encoded condition. Unknown names pass.
    pub fn evaluate_instruction(instruction: &EncodedInstruction, ctx: &ConditionContext) -> bool {
        match Condition::parse(instruction) {
            Some(condition) => Self::evaluate(&condition, ctx),
            None => {
                tracing::debug!(condition = %instruction, "unknown condition treated as true");
                true
            }
        }
    }

    /// AND over every condition. An empty list passes.
    pub fn evaluate_all<'i>(
        instructions: impl IntoIterator<Item = &'i EncodedInstruction>,
        ctx: &ConditionContext,
    ) -> bool {
        instructions
            .into_iter()
            .all(|instruction| Self::evaluate_instruction(instruction, ctx))
    }

    // An entity that has vanished cannot be checked; the gate stays open.
    fn health_holds(ctx: &ConditionContext, entity: EntityId, cmp: &Comparison) -> bool {
        ctx.world.health(entity).map_or(true, |health| cmp.holds(health))
    }
}
