//! Node catalog: the building blocks of state evaluator trees.
//!
//! Every tree node holds exactly one of:
//!
//! - a [`FunctionKind`] - binary operator, only on internal nodes
//! - a [`TerminalKind`] - live measurement of the game state, only on leaves
//! - a floating-point constant - only on leaves
//!
//! Leaves are represented by [`Operand`], and the flattened form used for
//! serialization is [`NodeValue`].
//!
//! # Terminal Values
//!
//! | terminal          | value                                              |
//! |-------------------|----------------------------------------------------|
//! | `ghost-distance`  | Manhattan distance to the nearest ghost            |
//! | `pill-distance`   | Manhattan distance to the nearest pill             |
//! | `fruit-distance`  | Manhattan distance to the nearest fruit            |
//! | `adjacent-walls`  | number of walls orthogonally adjacent              |
//!
//! Distances to an absent target evaluate to [`NO_TARGET`] (`-1.0`), which
//! operators treat as an ordinary number.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Value of a distance terminal when there is nothing to measure against.
pub const NO_TARGET: f64 = -1.0;

/// Binary operator held by an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionKind {
    Add,
    Subtract,
    Multiply,
    /// Protected division: `0` when either operand is `0`.
    Divide,
    /// Uniform sample between the smaller and the larger operand, inclusive.
    RandomFloat,
}

impl FunctionKind {
    pub const ALL: [Self; 5] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::RandomFloat,
    ];

    /// Applies the operator to already-evaluated operands.
    ///
    /// `rng` is only drawn from by [`FunctionKind::RandomFloat`].
    pub fn apply<R>(self, lhs: f64, rhs: f64, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide => {
                if lhs == 0.0 || rhs == 0.0 {
                    0.0
                } else {
                    lhs / rhs
                }
            }
            Self::RandomFloat => {
                let low = f64::min(lhs, rhs);
                let high = f64::max(lhs, rhs);
                // uniform sampling needs a finite, non-empty span
                if low < high && (high - low).is_finite() {
                    rng.random_range(low..=high)
                } else {
                    low
                }
            }
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::RandomFloat => "rand",
        }
    }
}

/// Game-state measurement held by a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalKind {
    GhostDistance,
    PillDistance,
    FruitDistance,
    AdjacentWalls,
}

impl TerminalKind {
    pub const ALL: [Self; 4] = [
        Self::GhostDistance,
        Self::PillDistance,
        Self::FruitDistance,
        Self::AdjacentWalls,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GhostDistance => "ghost distance",
            Self::PillDistance => "pill distance",
            Self::FruitDistance => "fruit distance",
            Self::AdjacentWalls => "num adj walls",
        }
    }
}

/// Value held by a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Operand {
    Terminal(TerminalKind),
    Constant(f64),
}

/// Flattened node value, as listed by a breadth-first traversal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(untagged)]
pub enum NodeValue {
    Function(FunctionKind),
    Terminal(TerminalKind),
    Constant(f64),
}

impl From<Operand> for NodeValue {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Terminal(kind) => Self::Terminal(kind),
            Operand::Constant(value) => Self::Constant(value),
        }
    }
}

/// Random node source used while growing trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeCatalog {
    /// Upper bound for random constants; constants are drawn from `[0, max_constant]`.
    pub max_constant: f64,
}

impl NodeCatalog {
    #[must_use]
    pub fn random_function<R>(&self, rng: &mut R) -> FunctionKind
    where
        R: Rng + ?Sized,
    {
        FunctionKind::ALL[rng.random_range(0..FunctionKind::ALL.len())]
    }

    /// Draws a leaf value. Each terminal kind and "constant" are equally likely.
    #[must_use]
    pub fn random_operand<R>(&self, rng: &mut R) -> Operand
    where
        R: Rng + ?Sized,
    {
        let choice = rng.random_range(0..=TerminalKind::ALL.len());
        match TerminalKind::ALL.get(choice) {
            Some(kind) => Operand::Terminal(*kind),
            None => Operand::Constant(rng.random_range(0.0..=self.max_constant)),
        }
    }
}
