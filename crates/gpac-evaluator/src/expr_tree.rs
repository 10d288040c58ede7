//! Expression trees: the evolvable representation of a scoring strategy.
//!
//! An [`ExprNode`] is a binary tree whose leaves are numeric constants or feature
//! symbols and whose internal nodes are arithmetic [`Operator`]s. Evaluating a tree
//! against a [`FeatureLookup`] (usually a
//! [`FeatureVector`](crate::state_feature::FeatureVector)) yields a score.
//!
//! # Evaluation Rules
//!
//! - `Constant(c)` evaluates to `c`
//! - `Terminal(name)` evaluates to the looked-up feature value, or `0.0` when the
//!   lookup has no such feature
//! - `Operator { .. }` evaluates both children (an absent child counts as `0.0`) and
//!   applies the operator:
//!   - `+`, `-`, `*` are plain arithmetic
//!   - `/` returns `+∞` when the right operand is exactly zero
//!   - `RAND` draws uniformly from `[left, right)` on every evaluation
//!
//! Evaluation never fails. The only side effect is consuming the caller's RNG for
//! `RAND` nodes, so giving each game its own seeded RNG keeps runs reproducible.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use gpac_evaluator::expr_tree::{ExprNode, Operator};
//!
//! // (P * 2) - G
//! let tree = ExprNode::operator(
//!     Operator::Sub,
//!     ExprNode::operator(Operator::Mul, ExprNode::terminal("P"), ExprNode::Constant(2.0)),
//!     ExprNode::terminal("G"),
//! );
//! let features = HashMap::from([("P".to_owned(), 3.0), ("G".to_owned(), 1.5)]);
//! let score = tree.evaluate(&features, &mut rand::rng());
//! assert_eq!(score, 4.5);
//! assert_eq!(tree.to_string(), "((P * 2) - G)");
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Source of feature values for terminal lookups.
pub trait FeatureLookup {
    /// Value of the feature named `symbol`, or `None` if there is no such feature.
    fn lookup(&self, symbol: &str) -> Option<f64>;
}

impl FeatureLookup for HashMap<String, f64> {
    fn lookup(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).copied()
    }
}

impl FeatureLookup for BTreeMap<String, f64> {
    fn lookup(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).copied()
    }
}

impl FeatureLookup for [(&str, f64)] {
    fn lookup(&self, symbol: &str) -> Option<f64> {
        self.iter()
            .find_map(|(name, value)| (*name == symbol).then_some(*value))
    }
}

/// Binary operator of an internal tree node.
///
/// Serialized as its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    /// Uniform random real in `[left, right)`, re-drawn on every evaluation.
    #[serde(rename = "RAND")]
    Rand,
}

impl Operator {
    pub const ALL: [Self; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Rand];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rand => "RAND",
        }
    }

    /// Applies the operator to already evaluated operands.
    pub fn apply<R>(self, left: f64, right: f64, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => {
                if right == 0.0 {
                    f64::INFINITY
                } else {
                    left / right
                }
            }
            // same draw as `left + (right - left) * U[0, 1)`, which also tolerates
            // swapped or equal bounds
            Self::Rand => left + (right - left) * rng.random::<f64>(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown operator symbol: {_0:?}")]
pub struct ParseOperatorError(#[error(not(source))] pub String);

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| ParseOperatorError(s.to_owned()))
    }
}

/// One node of an expression tree. Each node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// A numeric constant, fixed when the tree is built.
    Constant(f64),
    /// A feature symbol resolved at evaluation time.
    Terminal(String),
    /// An operator applied to two subtrees.
    Operator {
        op: Operator,
        left: Option<Box<ExprNode>>,
        right: Option<Box<ExprNode>>,
    },
}

impl ExprNode {
    #[must_use]
    pub fn terminal(symbol: impl Into<String>) -> Self {
        Self::Terminal(symbol.into())
    }

    /// An operator node with both children present.
    #[must_use]
    pub fn operator(op: Operator, left: Self, right: Self) -> Self {
        Self::Operator {
            op,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Evaluates the tree against `features`.
    ///
    /// See the [module documentation](self) for the rules.
    pub fn evaluate<L, R>(&self, features: &L, rng: &mut R) -> f64
    where
        L: FeatureLookup + ?Sized,
        R: Rng + ?Sized,
    {
        match self {
            Self::Constant(value) => *value,
            Self::Terminal(symbol) => features.lookup(symbol).unwrap_or(0.0),
            Self::Operator { op, left, right } => {
                let left = left.as_ref().map_or(0.0, |n| n.evaluate(features, rng));
                let right = right.as_ref().map_or(0.0, |n| n.evaluate(features, rng));
                op.apply(left, right, rng)
            }
        }
    }

    /// A node is a leaf iff it has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }

    pub fn children(&self) -> impl Iterator<Item = &ExprNode> {
        let (left, right) = match self {
            Self::Operator { left, right, .. } => (left.as_deref(), right.as_deref()),
            Self::Constant(_) | Self::Terminal(_) => (None, None),
        };
        left.into_iter().chain(right)
    }

    /// Length of the longest root-to-leaf path; a lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children().map(ExprNode::size).sum::<usize>()
    }

    /// Depth of every leaf, in left-to-right order.
    #[must_use]
    pub fn leaf_depths(&self) -> Vec<usize> {
        fn collect(node: &ExprNode, depth: usize, out: &mut Vec<usize>) {
            if node.is_leaf() {
                out.push(depth);
                return;
            }
            for child in node.children() {
                collect(child, depth + 1, out);
            }
        }
        let mut depths = vec![];
        collect(self, 0, &mut depths);
        depths
    }
}

/// Infix rendering, e.g. `((G + 1.500) / RAND(P, W))`.
impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn child(f: &mut fmt::Formatter<'_>, node: Option<&ExprNode>) -> fmt::Result {
            match node {
                Some(node) => write!(f, "{node}"),
                None => f.write_str("0"),
            }
        }

        match self {
            Self::Constant(value) => {
                if value.fract() == 0.0 {
                    write!(f, "{value}")
                } else {
                    write!(f, "{value:.3}")
                }
            }
            Self::Terminal(symbol) => f.write_str(symbol),
            Self::Operator {
                op: Operator::Rand,
                left,
                right,
            } => {
                f.write_str("RAND(")?;
                child(f, left.as_deref())?;
                f.write_str(", ")?;
                child(f, right.as_deref())?;
                f.write_str(")")
            }
            Self::Operator { op, left, right } => {
                f.write_str("(")?;
                child(f, left.as_deref())?;
                write!(f, " {op} ")?;
                child(f, right.as_deref())?;
                f.write_str(")")
            }
        }
    }
}
