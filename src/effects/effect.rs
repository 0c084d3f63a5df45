//! Effect definitions.
//!
//! Each variant is one effect kind with its arguments already parsed.
//! Argument layouts (token 0 is the name):
//!
//! | Effect | Layout | Defaults |
//! |---|---|---|
//! | `POTION` | `TYPE:LEVEL:SECONDS[:TARGET]` | level 1, 1 s; needs all three |
//! | `FEED` | `AMOUNT[:TARGET]` | 1 |
//! | `FIRE` | `SECONDS` | 1 s |
//! | `EXPLODE` | `POWER[:BREAK]` | 1.0, no block damage |
//! | `SMELT` | - | |
//! | `INFUSION` | `RADIUS` | 1 |
//! | `AURA` | `TYPE:LEVEL:SECONDS[:RADIUS]` | radius 0 (self only) |
//! | `LIGHTNING` | `[SELF]` | strikes the target |
//! | `EXPERIENCE` | `AMOUNT` | 1 |
//! | `HEAL` | `AMOUNT[:TARGET]` | 1 |
//! | `DAMAGE_MODIFIER` | `MULTIPLIER` | 1.0 |
//! | `DROP_HEAD` | - | |
//! | `MULTISHOT` | `COUNT[:SPREAD]` | 1, 10 degrees |
//! | `REPLACE_NEAR` | `FROM:TO[:RADIUS[:SECONDS]]` | 1, 5 s |
//! | `COAT` | `MATERIAL[:SECONDS]` | 3 s |
//! | `TELEPATHY` | - | |
//!
//! A malformed number falls back to its default. Only a missing required
//! token (or an unknown potion type) makes the instruction unusable.

use serde::{Deserialize, Serialize};

use crate::core::{Material, PotionEffect, PotionType, TICKS_PER_SECOND};
use crate::grammar::{EffectKind, EncodedInstruction};

/// Keyword selecting the target instead of the actor.
pub const TARGET_KEYWORD: &str = "TARGET";

/// A parsed, ready-to-apply effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Apply a potion effect to the actor (or target).
    Potion { effect: PotionEffect, on_target: bool },

    /// Restore food points.
    Feed { amount: u32, on_target: bool },

    /// Set the target on fire.
    Fire { ticks: u64 },

    /// Explosion at the target.
    Explode { power: f32, break_blocks: bool },

    /// Replace event drops with their smelted form.
    Smelt,

    /// Break the blocks surrounding the broken block.
    Infusion { radius: i32 },

    /// Potion effect on the actor and friendly entities nearby.
    Aura { effect: PotionEffect, radius: f64 },

    /// Lightning at the target (or the actor).
    Lightning { on_self: bool },

    /// Grant experience to the actor.
    Experience { amount: u32 },

    /// Restore health.
    Heal { amount: f64, on_target: bool },

    /// Scale the event's damage.
    DamageModifier { multiplier: f64 },

    /// Add the victim's head to the death drops.
    DropHead,

    /// Launch extra projectiles around the shot.
    Multishot { count: u32, spread: f32 },

    /// Temporarily turn nearby `from` blocks under the actor into `to`.
    ReplaceNear {
        from: Material,
        to: Material,
        radius: i32,
        duration_ticks: u64,
    },

    /// Temporarily encase the target in a material.
    Coat { material: Material, duration_ticks: u64 },

    /// Move event drops straight into the actor's inventory.
    Telepathy,
}

impl Effect {
    /// Parse an instruction whose name is already known to be `kind`.
    ///
    /// Returns `None` when a required token is missing.
    #[must_use]
    pub fn from_instruction(kind: EffectKind, ins: &EncodedInstruction) -> Option<Self> {
        let effect = match kind {
            EffectKind::Potion => {
                if ins.len() < 4 {
                    return None;
                }
                Self::Potion {
                    effect: potion_from(ins)?,
                    on_target: ins.is_keyword(4, TARGET_KEYWORD),
                }
            }

            EffectKind::Feed => Self::Feed {
                amount: ins.u32_or(1, 1),
                on_target: ins.is_keyword(2, TARGET_KEYWORD),
            },

            EffectKind::Fire => Self::Fire {
                ticks: seconds_to_ticks(ins.u32_or(1, 1)),
            },

            EffectKind::Explode => Self::Explode {
                power: ins.f64_or(1, 1.0) as f32,
                break_blocks: ins.is_keyword(2, "BREAK"),
            },

            EffectKind::Smelt => Self::Smelt,

            EffectKind::Infusion => Self::Infusion {
                radius: ins.parse_or(1, 1i32).clamp(0, 3),
            },

            EffectKind::Aura => {
                if ins.len() < 4 {
                    return None;
                }
                Self::Aura {
                    effect: potion_from(ins)?,
                    radius: ins.f64_or(4, 0.0).max(0.0),
                }
            }

            EffectKind::Lightning => Self::Lightning {
                on_self: ins.is_keyword(1, "SELF"),
            },

            EffectKind::Experience => Self::Experience {
                amount: ins.u32_or(1, 1),
            },

            EffectKind::Heal => Self::Heal {
                amount: ins.f64_or(1, 1.0),
                on_target: ins.is_keyword(2, TARGET_KEYWORD),
            },

            EffectKind::DamageModifier => Self::DamageModifier {
                multiplier: ins.f64_or(1, 1.0).max(0.0),
            },

            EffectKind::DropHead => Self::DropHead,

            EffectKind::Multishot => Self::Multishot {
                count: ins.u32_or(1, 1).min(16),
                spread: ins.f64_or(2, 10.0) as f32,
            },

            EffectKind::ReplaceNear => Self::ReplaceNear {
                from: Material::new(ins.token(1).filter(|t| !t.is_empty())?),
                to: Material::new(ins.token(2).filter(|t| !t.is_empty())?),
                radius: ins.parse_or(3, 1i32).clamp(0, 8),
                duration_ticks: seconds_to_ticks(ins.u32_or(4, 5)),
            },

            EffectKind::Coat => Self::Coat {
                material: Material::new(ins.token(1).filter(|t| !t.is_empty())?),
                duration_ticks: seconds_to_ticks(ins.u32_or(2, 3)),
            },

            EffectKind::Telepathy => Self::Telepathy,
        };
        Some(effect)
    }

    /// Parse any instruction; `None` for unknown names or missing tokens.
    #[must_use]
    pub fn parse(ins: &EncodedInstruction) -> Option<Self> {
        Self::from_instruction(EffectKind::lookup(ins.name())?, ins)
    }

    #[must_use]
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Potion { .. } => EffectKind::Potion,
            Self::Feed { .. } => EffectKind::Feed,
            Self::Fire { .. } => EffectKind::Fire,
            Self::Explode { .. } => EffectKind::Explode,
            Self::Smelt => EffectKind::Smelt,
            Self::Infusion { .. } => EffectKind::Infusion,
            Self::Aura { .. } => EffectKind::Aura,
            Self::Lightning { .. } => EffectKind::Lightning,
            Self::Experience { .. } => EffectKind::Experience,
            Self::Heal { .. } => EffectKind::Heal,
            Self::DamageModifier { .. } => EffectKind::DamageModifier,
            Self::DropHead => EffectKind::DropHead,
            Self::Multishot { .. } => EffectKind::Multishot,
            Self::ReplaceNear { .. } => EffectKind::ReplaceNear,
            Self::Coat { .. } => EffectKind::Coat,
            Self::Telepathy => EffectKind::Telepathy,
        }
    }
}

fn seconds_to_ticks(seconds: u32) -> u64 {
    u64::from(seconds) * TICKS_PER_SECOND
}

// `TYPE:LEVEL:SECONDS` at tokens 1..=3. Level is 1-based in data.
fn potion_from(ins: &EncodedInstruction) -> Option<PotionEffect> {
    let kind: PotionType = ins.token(1)?.parse().ok()?;
    let amplifier = ins
        .token(2)
        .and_then(|t| t.parse::<i64>().ok())
        .map_or(0, |level| (level - 1).clamp(0, 255) as u32);
    Some(PotionEffect {
        kind,
        amplifier,
        duration_ticks: seconds_to_ticks(ins.u32_or(3, 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Effect> {
        Effect::parse(&EncodedInstruction::parse(text))
    }

    #[test]
    fn test_potion_speed() {
        let effect = parse("POTION:SPEED:1:100").unwrap();
        assert_eq!(
            effect,
            Effect::Potion {
                effect: PotionEffect {
                    kind: PotionType::Speed,
                    amplifier: 0,
                    duration_ticks: 2000,
                },
                on_target: false,
            }
        );
    }

    #[test]
    fn test_potion_needs_four_tokens() {
        assert!(parse("POTION:SPEED:1").is_none());
        assert!(parse("POTION:FLYING:1:10").is_none());
    }

    #[test]
    fn test_potion_malformed_numbers() {
        let Some(Effect::Potion { effect, on_target }) = parse("potion:strength:two:ten:target") else {
            panic!("Expected Potion");
        };
        assert_eq!(effect.kind, PotionType::Strength);
        assert_eq!(effect.amplifier, 0);
        assert_eq!(effect.duration_ticks, 20);
        assert!(on_target);
    }

    #[test]
    fn test_potion_legacy_name() {
        let Some(Effect::Potion { effect, .. }) = parse("POTION:INCREASE_DAMAGE:2:5") else {
            panic!("Expected Potion");
        };
        assert_eq!(effect.kind, PotionType::Strength);
        assert_eq!(effect.amplifier, 1);
        assert_eq!(effect.duration_ticks, 100);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse("FEED"), Some(Effect::Feed { amount: 1, on_target: false }));
        assert_eq!(parse("FIRE:x"), Some(Effect::Fire { ticks: 20 }));
        assert_eq!(parse("HEAL:4:target"), Some(Effect::Heal { amount: 4.0, on_target: true }));
        assert_eq!(parse("DAMAGE_MODIFIER:1.5"), Some(Effect::DamageModifier { multiplier: 1.5 }));
        assert_eq!(parse("MULTISHOT"), Some(Effect::Multishot { count: 1, spread: 10.0 }));
        assert_eq!(parse("LIGHTNING:self"), Some(Effect::Lightning { on_self: true }));
        assert_eq!(
            parse("EXPLODE:3:BREAK"),
            Some(Effect::Explode { power: 3.0, break_blocks: true })
        );
    }

    #[test]
    fn test_replace_near() {
        assert_eq!(
            parse("REPLACE_NEAR:WATER:ICE:2:10"),
            Some(Effect::ReplaceNear {
                from: Material::new("WATER"),
                to: Material::new("ICE"),
                radius: 2,
                duration_ticks: 200,
            })
        );
        assert!(parse("REPLACE_NEAR:WATER").is_none());
    }

    #[test]
    fn test_kind_round_trip() {
        for text in ["SMELT", "TELEPATHY", "DROP_HEAD", "INFUSION:2", "COAT:COBWEB", "EXPERIENCE:5"] {
            let ins = EncodedInstruction::parse(text);
            let effect = Effect::parse(&ins).unwrap();
            assert_eq!(effect.kind().name(), ins.name());
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(parse("SUMMON:DRAGON").is_none());
    }
}
