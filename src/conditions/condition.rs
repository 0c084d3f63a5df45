//! Condition definitions.
//!
//! Conditions are boolean gates on an ability level. They are written with
//! the same grammar as effects:
//!
//! - `PLAYER_HEALTH:<op>:<value>` - the acting entity's health
//! - `TARGET_HEALTH:<op>:<value>` - the target's health
//! - `ISWEARING:<material>` - any armor slot holds the material
//! - `ISHOLDING:<material>` - the main hand holds the material
//!
//! `<op>` is one of `==`, `!=`, `>`, `>=`, `<`, `<=`. An unparseable value
//! means 1. An unrecognized operator makes the comparison pass; this
//! permissive fallback is kept for compatibility with existing data.

use serde::{Deserialize, Serialize};

use crate::core::Material;
use crate::grammar::{ConditionKind, EncodedInstruction};

/// Threshold used when a comparison value is missing or is not a whole
/// number.
pub const DEFAULT_THRESHOLD: i64 = 1;

/// Numeric comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    /// All operators with their tokens.
    pub const ALL: [(Comparator, &'static str); 6] = [
        (Self::Eq, "=="),
        (Self::Ne, "!="),
        (Self::Gt, ">"),
        (Self::Ge, ">="),
        (Self::Lt, "<"),
        (Self::Le, "<="),
    ];

    /// Parse an operator token; `None` for anything else.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.iter().find(|(_, t)| *t == token).map(|(c, _)| *c)
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(c, _)| *c == self)
            .map_or("==", |(_, t)| *t)
    }

    /// Apply `lhs <op> rhs`.
    #[must_use]
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
        }
    }
}

/// A numeric comparison against a threshold.
///
/// `comparator` is `None` when the data used an unknown operator; such a
/// comparison always passes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub comparator: Option<Comparator>,
    /// Whole-number threshold; `5.5` in data is malformed and reads as the
    /// default.
    pub threshold: i64,
}

impl Comparison {
    /// Parse operator and value from tokens 1 and 2 of an instruction.
    #[must_use]
    pub fn from_instruction(ins: &EncodedInstruction) -> Self {
        Self {
            comparator: ins.token(1).and_then(Comparator::parse),
            threshold: ins.i64_or(2, DEFAULT_THRESHOLD),
        }
    }

    #[must_use]
    pub fn holds(&self, value: f64) -> bool {
        match self.comparator {
            Some(op) => op.compare(value, self.threshold as f64),
            None => true,
        }
    }
}

/// A parsed condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Acting entity's health compared to a threshold.
    PlayerHealth(Comparison),

    /// Target's health compared to a threshold.
    TargetHealth(Comparison),

    /// Acting entity wears the material in any armor slot.
    /// `None` when the data names no material (always passes).
    IsWearing(Option<Material>),

    /// Acting entity holds the material in its main hand.
    IsHolding(Option<Material>),
}

impl Condition {
    /// Parse an instruction; `None` when the name is not a known condition.
    #[must_use]
    pub fn parse(ins: &EncodedInstruction) -> Option<Self> {
        let material = || ins.token(1).filter(|t| !t.is_empty()).map(Material::new);

        let condition = match ConditionKind::lookup(ins.name())? {
            ConditionKind::PlayerHealth => Self::PlayerHealth(Comparison::from_instruction(ins)),
            ConditionKind::TargetHealth => Self::TargetHealth(Comparison::from_instruction(ins)),
            ConditionKind::IsWearing => Self::IsWearing(material()),
            ConditionKind::IsHolding => Self::IsHolding(material()),
        };
        Some(condition)
    }

    #[must_use]
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::PlayerHealth(_) => ConditionKind::PlayerHealth,
            Self::TargetHealth(_) => ConditionKind::TargetHealth,
            Self::IsWearing(_) => ConditionKind::IsWearing,
            Self::IsHolding(_) => ConditionKind::IsHolding,
        }
    }
}
