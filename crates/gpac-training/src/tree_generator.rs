//! Random construction of strategy trees.
//!
//! Two policies build an [`ExprNode`] recursively, with the root at depth 0:
//!
//! - **Full** - Every branch expands to exactly `max_depth`: nodes above `max_depth`
//!   are operators, nodes at `max_depth` are leaves. The result is a perfectly balanced
//!   tree.
//! - **Grow** - A node becomes a leaf at `max_depth`, or below the root with
//!   probability 1/2. The root is always an operator (unless `max_depth` is 0), so
//!   every leaf ends up at a depth between 1 and `max_depth`.
//!
//! Leaves pick a terminal symbol uniformly. The symbol [`RANDOM_CONSTANT_TERMINAL`]
//! (`"C"`) is special: instead of a feature lookup, the leaf becomes a
//! [`ExprNode::Constant`] sampled once from the generator's constant range. This value
//! is fixed for the lifetime of the tree, unlike the `RAND` operator which draws anew
//! on every evaluation.
//!
//! # Example
//!
//! ```
//! use gpac_training::tree_generator::{GenerationMethod, TreeGenerator};
//!
//! let generator = TreeGenerator::new(4);
//! let tree = generator
//!     .generate(GenerationMethod::Full, &mut rand::rng())
//!     .unwrap();
//! assert_eq!(tree.depth(), 4);
//! assert!(tree.leaf_depths().iter().all(|d| *d == 4));
//! ```

use std::str::FromStr;

use gpac_evaluator::{
    expr_tree::{ExprNode, Operator},
    state_feature::Feature,
};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

/// Terminal symbol replaced by a random constant at generation time.
pub const RANDOM_CONSTANT_TERMINAL: &str = "C";

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_CONSTANT_RANGE: (f64, f64) = (-10.0, 10.0);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenerateTreeError {
    #[display("terminal set is empty")]
    NoTerminals,
    #[display("operator set is empty")]
    NoOperators,
    #[display("constant range must be finite with min <= max")]
    InvalidConstantRange,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    #[display("full")]
    Full,
    #[display("grow")]
    #[default]
    Grow,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown generation method {_0:?}, expected \"full\" or \"grow\"")]
pub struct ParseGenerationMethodError(#[error(not(source))] String);

impl FromStr for GenerationMethod {
    type Err = ParseGenerationMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "grow" => Ok(Self::Grow),
            _ => Err(ParseGenerationMethodError(s.to_owned())),
        }
    }
}

/// Generator options, as read from configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub method: GenerationMethod,
    pub terminals: Vec<String>,
    pub operators: Vec<Operator>,
    /// `[min, max]` of the random constants.
    pub constant_range: (f64, f64),
}

impl Default for TreeConfig {
    fn default() -> Self {
        let generator = TreeGenerator::new(DEFAULT_MAX_DEPTH);
        Self {
            max_depth: generator.max_depth,
            method: GenerationMethod::default(),
            terminals: generator.terminals,
            operators: generator.operators,
            constant_range: generator.constant_range,
        }
    }
}

impl TreeConfig {
    #[must_use]
    pub fn generator(&self) -> TreeGenerator {
        TreeGenerator {
            terminals: self.terminals.clone(),
            operators: self.operators.clone(),
            max_depth: self.max_depth,
            constant_range: self.constant_range,
        }
    }

    /// Builds one tree with the configured method.
    pub fn generate<R>(&self, rng: &mut R) -> Result<ExprNode, GenerateTreeError>
    where
        R: Rng + ?Sized,
    {
        self.generator().generate(self.method, rng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeGenerator {
    terminals: Vec<String>,
    operators: Vec<Operator>,
    max_depth: usize,
    constant_range: (f64, f64),
}

impl TreeGenerator {
    /// A generator over every feature symbol and every operator.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            terminals: Feature::ALL
                .into_iter()
                .map(|f| f.symbol().to_owned())
                .collect(),
            operators: Operator::ALL.to_vec(),
            max_depth,
            constant_range: DEFAULT_CONSTANT_RANGE,
        }
    }

    #[must_use]
    pub fn with_terminals<I, S>(mut self, terminals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals = terminals.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_operators<I>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = Operator>,
    {
        self.operators = operators.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_constant_range(mut self, min: f64, max: f64) -> Self {
        self.constant_range = (min, max);
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn generate<R>(
        &self,
        method: GenerationMethod,
        rng: &mut R,
    ) -> Result<ExprNode, GenerateTreeError>
    where
        R: Rng + ?Sized,
    {
        let tree = match method {
            GenerationMethod::Full => self.full(rng)?,
            GenerationMethod::Grow => self.grow(rng)?,
        };
        log::debug!(
            "generated {method} tree: depth {}, {} nodes",
            tree.depth(),
            tree.size()
        );
        Ok(tree)
    }

    /// Builds a tree whose leaves all sit at exactly `max_depth`.
    pub fn full<R>(&self, rng: &mut R) -> Result<ExprNode, GenerateTreeError>
    where
        R: Rng + ?Sized,
    {
        self.check()?;
        Ok(self.build(0, rng, &mut |_: &mut R| false))
    }

    /// Builds a tree whose leaves sit between depth 1 and `max_depth`.
    pub fn grow<R>(&self, rng: &mut R) -> Result<ExprNode, GenerateTreeError>
    where
        R: Rng + ?Sized,
    {
        self.check()?;
        Ok(self.build(0, rng, &mut |rng: &mut R| rng.random_bool(0.5)))
    }

    fn check(&self) -> Result<(), GenerateTreeError> {
        if self.terminals.is_empty() {
            return Err(GenerateTreeError::NoTerminals);
        }
        if self.operators.is_empty() {
            return Err(GenerateTreeError::NoOperators);
        }
        let (min, max) = self.constant_range;
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(GenerateTreeError::InvalidConstantRange);
        }
        Ok(())
    }

    /// `stop_early` decides whether a non-root node above `max_depth` becomes a leaf.
    fn build<R, F>(&self, depth: usize, rng: &mut R, stop_early: &mut F) -> ExprNode
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> bool,
    {
        if depth >= self.max_depth || (depth > 0 && stop_early(rng)) {
            return self.leaf(rng);
        }
        let op = *self
            .operators
            .choose(rng)
            .expect("operator set checked non-empty");
        let left = self.build(depth + 1, rng, stop_early);
        let right = self.build(depth + 1, rng, stop_early);
        ExprNode::operator(op, left, right)
    }

    fn leaf<R>(&self, rng: &mut R) -> ExprNode
    where
        R: Rng + ?Sized,
    {
        let symbol = self
            .terminals
            .choose(rng)
            .expect("terminal set checked non-empty");
        if symbol == RANDOM_CONSTANT_TERMINAL {
            let (min, max) = self.constant_range;
            ExprNode::Constant(rng.random_range(min..=max))
        } else {
            ExprNode::terminal(symbol.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(17)
    }

    #[test]
    fn test_full_leaves_at_max_depth() {
        let mut rng = rng();
        for max_depth in 0..=5 {
            let generator = TreeGenerator::new(max_depth);
            for _ in 0..20 {
                let tree = generator.full(&mut rng).unwrap();
                let depths = tree.leaf_depths();
                assert_eq!(depths.len(), 1 << max_depth);
                assert!(depths.iter().all(|d| *d == max_depth), "{tree}");
                assert_eq!(tree.size(), (1 << (max_depth + 1)) - 1);
            }
        }
    }

    #[test]
    fn test_grow_leaves_within_bounds() {
        let mut rng = rng();
        let generator = TreeGenerator::new(5);
        let mut shallow = false;
        for _ in 0..100 {
            let tree = generator.grow(&mut rng).unwrap();
            let depths = tree.leaf_depths();
            assert!(depths.iter().all(|d| (1..=5).contains(d)), "{tree}");
            shallow |= tree.depth() < 5;
        }
        // early termination happens
        assert!(shallow);
    }

    #[test]
    fn test_grow_depth_zero_is_leaf() {
        let tree = TreeGenerator::new(0).grow(&mut rng()).unwrap();
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_constant_terminal_becomes_number() {
        let mut rng = rng();
        let generator = TreeGenerator::new(3)
            .with_terminals(["C"])
            .with_constant_range(-2.0, 2.0);
        let tree = generator.full(&mut rng).unwrap();
        let mut leaves = vec![tree];
        while let Some(node) = leaves.pop() {
            match node {
                ExprNode::Constant(value) => assert!((-2.0..=2.0).contains(&value)),
                ExprNode::Terminal(symbol) => panic!("unexpected terminal {symbol}"),
                ExprNode::Operator { left, right, .. } => {
                    leaves.extend(left.map(|n| *n));
                    leaves.extend(right.map(|n| *n));
                }
            }
        }
    }

    #[test]
    fn test_uses_only_given_symbols() {
        let mut rng = rng();
        let generator = TreeGenerator::new(4)
            .with_terminals(["G", "P"])
            .with_operators([Operator::Mul]);
        let tree = generator.full(&mut rng).unwrap();
        let text = tree.to_string();
        assert!(!text.contains('+') && !text.contains('/') && !text.contains("RAND"));
        assert!(!text.contains('F') && !text.contains('W'));
    }

    #[test]
    fn test_empty_sets_rejected() {
        let mut rng = rng();
        let no_terminals = TreeGenerator::new(2).with_terminals(Vec::<String>::new());
        assert_eq!(
            no_terminals.grow(&mut rng),
            Err(GenerateTreeError::NoTerminals)
        );
        let no_operators = TreeGenerator::new(2).with_operators([]);
        assert_eq!(
            no_operators.full(&mut rng),
            Err(GenerateTreeError::NoOperators)
        );
        let bad_range = TreeGenerator::new(2).with_constant_range(1.0, -1.0);
        assert_eq!(
            bad_range.full(&mut rng),
            Err(GenerateTreeError::InvalidConstantRange)
        );
    }

    #[test]
    fn test_method_parse() {
        for method in [GenerationMethod::Full, GenerationMethod::Grow] {
            assert_eq!(method.to_string().parse::<GenerationMethod>(), Ok(method));
        }
        assert!("half".parse::<GenerationMethod>().is_err());
    }

    #[test]
    fn test_same_seed_same_tree() {
        let config = TreeConfig {
            method: GenerationMethod::Full,
            ..TreeConfig::default()
        };
        let a = config.generate(&mut rng()).unwrap();
        let b = config.generate(&mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_from_json() {
        let config: TreeConfig = serde_json::from_str(
            r#"{ "max_depth": 2, "method": "full", "operators": ["+", "RAND"] }"#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.method, GenerationMethod::Full);
        assert_eq!(config.operators, [Operator::Add, Operator::Rand]);
        assert_eq!(config.terminals, TreeConfig::default().terminals);
        assert_eq!(config.generate(&mut rng()).unwrap().depth(), 2);
    }
}
