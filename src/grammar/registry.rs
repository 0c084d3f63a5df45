//! Instruction name registry.
//!
//! Maps instruction names to the closed set of effect and condition kinds.
//! A lookup miss is an ordinary outcome: effects with unknown names are
//! skipped and conditions with unknown names pass, so data written for a
//! newer engine still loads on an older one.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::instruction::EncodedInstruction;

/// Every effect the interpreter knows how to run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    Potion,
    Feed,
    Fire,
    Explode,
    Smelt,
    Infusion,
    Aura,
    Lightning,
    Experience,
    Heal,
    DamageModifier,
    DropHead,
    Multishot,
    ReplaceNear,
    Coat,
    Telepathy,
}

impl EffectKind {
    /// Look up an upper-cased instruction name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// The registry key for this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Every condition the evaluator knows how to check.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
pub enum ConditionKind {
    #[strum(serialize = "PLAYER_HEALTH")]
    PlayerHealth,
    #[strum(serialize = "TARGET_HEALTH")]
    TargetHealth,
    #[strum(serialize = "ISWEARING")]
    IsWearing,
    #[strum(serialize = "ISHOLDING")]
    IsHolding,
}

impl ConditionKind {
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Names in `instructions` that match no effect kind.
///
/// Used for load-time warnings only; unknown names stay in the data.
pub fn unknown_effects<'a>(
    instructions: impl IntoIterator<Item = &'a EncodedInstruction>,
) -> Vec<&'a str> {
    instructions
        .into_iter()
        .filter(|i| EffectKind::lookup(i.name()).is_none())
        .map(EncodedInstruction::as_str)
        .collect()
}

/// Names in `instructions` that match no condition kind.
pub fn unknown_conditions<'a>(
    instructions: impl IntoIterator<Item = &'a EncodedInstruction>,
) -> Vec<&'a str> {
    instructions
        .into_iter()
        .filter(|i| ConditionKind::lookup(i.name()).is_none())
        .map(EncodedInstruction::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_effect_lookup() {
        assert_eq!(EffectKind::lookup("POTION"), Some(EffectKind::Potion));
        assert_eq!(EffectKind::lookup("DAMAGE_MODIFIER"), Some(EffectKind::DamageModifier));
        assert_eq!(EffectKind::lookup("REPLACE_NEAR"), Some(EffectKind::ReplaceNear));
        assert_eq!(EffectKind::lookup("TELEPORT"), None);
        assert_eq!(EffectKind::lookup(""), None);
    }

    #[test]
    fn test_condition_lookup() {
        assert_eq!(ConditionKind::lookup("ISWEARING"), Some(ConditionKind::IsWearing));
        assert_eq!(ConditionKind::lookup("TARGET_HEALTH"), Some(ConditionKind::TargetHealth));
        assert_eq!(ConditionKind::lookup("IS_WEARING"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in EffectKind::iter() {
            assert_eq!(EffectKind::lookup(kind.name()), Some(kind));
        }
        for kind in ConditionKind::iter() {
            assert_eq!(ConditionKind::lookup(kind.name()), Some(kind));
        }
        assert_eq!(EffectKind::iter().count(), 16);
        assert_eq!(ConditionKind::iter().count(), 4);
    }

    #[test]
    fn test_unknown_names() {
        let effects = [
            EncodedInstruction::parse("POTION:SPEED:1:10"),
            EncodedInstruction::parse("SUMMON_DRAGON:1"),
        ];
        assert_eq!(unknown_effects(&effects), vec!["SUMMON_DRAGON:1"]);

        let conditions = [EncodedInstruction::parse("is_holding:STICK")];
        assert_eq!(unknown_conditions(&conditions), vec!["is_holding:STICK"]);
    }
}
