//! State evaluation: scoring a single candidate next-state.
//!
//! This is the lowest level of the decision architecture. A [`StateEvaluator`] turns the
//! [`FeatureVector`] of one candidate state into a score, higher is better. The turn
//! level ([`crate::turn_evaluator`]) compares these scores across the candidates of a
//! turn.
//!
//! Two evaluators are provided:
//!
//! - [`ExprNode`] evaluates an expression tree with the feature vector as its terminal
//!   mapping
//! - [`CompositeStateEvaluator`] returns the fixed composite heuristic, used as a
//!   baseline

use std::fmt;

use rand::RngCore;

use crate::{expr_tree::ExprNode, state_feature::FeatureVector};

/// Scores candidate states (higher is better).
pub trait StateEvaluator: fmt::Debug {
    /// Scores one candidate state.
    ///
    /// `rng` is consumed by non-deterministic evaluators such as trees containing
    /// `RAND` nodes.
    fn evaluate_state(&self, features: &FeatureVector, rng: &mut dyn RngCore) -> f64;
}

impl StateEvaluator for ExprNode {
    fn evaluate_state(&self, features: &FeatureVector, rng: &mut dyn RngCore) -> f64 {
        self.evaluate(features, rng)
    }
}

impl<T> StateEvaluator for &T
where
    T: StateEvaluator + ?Sized,
{
    fn evaluate_state(&self, features: &FeatureVector, rng: &mut dyn RngCore) -> f64 {
        (**self).evaluate_state(features, rng)
    }
}

impl<T> StateEvaluator for Box<T>
where
    T: StateEvaluator + ?Sized,
{
    fn evaluate_state(&self, features: &FeatureVector, rng: &mut dyn RngCore) -> f64 {
        (**self).evaluate_state(features, rng)
    }
}

/// Scores states by the composite heuristic alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeStateEvaluator;

impl StateEvaluator for CompositeStateEvaluator {
    #[inline]
    fn evaluate_state(&self, features: &FeatureVector, _rng: &mut dyn RngCore) -> f64 {
        features.composite()
    }
}

#[cfg(test)]
mod tests {
    use gpac_engine::{GameMap, GameSnapshot, PlayerId};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::expr_tree::Operator;

    fn features() -> FeatureVector {
        let snapshot = GameSnapshot::new(GameMap::from_fn(5, 5, |_, _| false))
            .with_player(PlayerId::pacman(), (0, 0).into())
            .with_player(PlayerId::ghost(0), (4, 4).into())
            .with_pills([(0, 3).into()]);
        FeatureVector::extract(&snapshot, &PlayerId::pacman(), None).unwrap()
    }

    #[test]
    fn test_tree_reads_features() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        // G - P = 8 - 3
        let tree = ExprNode::operator(
            Operator::Sub,
            ExprNode::terminal("G"),
            ExprNode::terminal("P"),
        );
        assert_eq!(tree.evaluate_state(&features(), &mut rng), 5.0);

        let tree = ExprNode::terminal("composite");
        let boxed: Box<dyn StateEvaluator> = Box::new(tree);
        assert_eq!(
            boxed.evaluate_state(&features(), &mut rng),
            features().composite()
        );
    }

    #[test]
    fn test_composite_evaluator() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let fv = features();
        assert_eq!(
            CompositeStateEvaluator.evaluate_state(&fv, &mut rng),
            fv.composite()
        );
    }
}
