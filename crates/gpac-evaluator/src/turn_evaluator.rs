//! Turn evaluation: choosing one agent's action for the current turn.
//!
//! This is the middle level of the decision architecture. For one agent and one turn,
//! the engine supplies the legal actions and the index-aligned candidate next-states
//! (a [`TurnView`]). An [`ActionSelector`] picks an action from them, and
//! [`decide_turn`] makes sure whatever it picked is actually legal.
//!
//! # Selectors
//!
//! - [`GreedySelector`] scores every candidate with a
//!   [`StateEvaluator`](crate::state_evaluator::StateEvaluator) and takes the best one
//!   (first occurrence wins ties). With probability `exploration_rate` it then
//!   discards that choice for a uniformly random legal action.
//! - [`RandomSelector`] picks uniformly at random. It is the policy for agents without
//!   a strategy.
//!
//! # Recovery
//!
//! A selector may return nothing, or an action outside the legal set. [`decide_turn`]
//! never forwards such a choice: it logs a warning and substitutes a uniformly random
//! legal action instead.

use std::fmt;

use gpac_engine::{Action, GameSnapshot, PlayerId, Position};
use rand::{Rng as _, RngCore, seq::IndexedRandom as _};

use crate::{state_evaluator::StateEvaluator, state_feature::FeatureVector};

/// Everything an agent can see when choosing its action for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub player: &'a PlayerId,
    /// Legal actions, as reported by the engine.
    pub actions: &'a [Action],
    /// Resulting state of each action, index-aligned with `actions`.
    pub observations: &'a [GameSnapshot],
    /// Where `player` stood after its previous decision, if it has made one.
    pub previous_position: Option<Position>,
}

impl TurnView<'_> {
    /// Features of every candidate state, index-aligned with `actions`.
    ///
    /// A candidate is `None` if it has no observation or the player is missing from it.
    pub fn candidate_features(&self) -> impl Iterator<Item = Option<FeatureVector>> + '_ {
        (0..self.actions.len()).map(|i| {
            self.observations.get(i).and_then(|snapshot| {
                FeatureVector::extract(snapshot, self.player, self.previous_position)
            })
        })
    }
}

/// Chooses an action for one agent and one turn.
pub trait ActionSelector: fmt::Debug {
    /// Returns the chosen action, or `None` if the selector has no opinion.
    ///
    /// The result is not trusted; see [`decide_turn`].
    fn select_action(&self, view: &TurnView<'_>, rng: &mut dyn RngCore) -> Option<Action>;
}

impl<T> ActionSelector for Box<T>
where
    T: ActionSelector + ?Sized,
{
    fn select_action(&self, view: &TurnView<'_>, rng: &mut dyn RngCore) -> Option<Action> {
        (**self).select_action(view, rng)
    }
}

/// Picks a uniformly random legal action.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl ActionSelector for RandomSelector {
    fn select_action(&self, view: &TurnView<'_>, rng: &mut dyn RngCore) -> Option<Action> {
        view.actions.choose(rng).copied()
    }
}

/// Picks the best-scoring candidate, with an exploration override.
#[derive(Debug, Clone)]
pub struct GreedySelector<E> {
    evaluator: E,
    exploration_rate: f64,
}

impl<E> GreedySelector<E>
where
    E: StateEvaluator,
{
    /// # Panics
    ///
    /// Panics if `exploration_rate` is not in `[0, 1]`.
    #[must_use]
    pub fn new(evaluator: E, exploration_rate: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&exploration_rate),
            "exploration rate must be in [0, 1], got {exploration_rate}"
        );
        Self {
            evaluator,
            exploration_rate,
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    #[must_use]
    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Index of the best-scoring candidate of `view`.
    ///
    /// Candidates without features and `NaN` scores rank as `-∞`. Ties go to the
    /// lowest index. Returns `None` only if there are no actions.
    pub fn best_index(&self, view: &TurnView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, features) in view.candidate_features().enumerate() {
            let score = features
                .map(|fv| self.evaluator.evaluate_state(&fv, rng))
                .filter(|s| !s.is_nan())
                .unwrap_or(f64::NEG_INFINITY);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl<E> ActionSelector for GreedySelector<E>
where
    E: StateEvaluator,
{
    fn select_action(&self, view: &TurnView<'_>, rng: &mut dyn RngCore) -> Option<Action> {
        let best = self.best_index(view, rng)?;
        if rng.random_bool(self.exploration_rate) {
            return view.actions.choose(rng).copied();
        }
        view.actions.get(best).copied()
    }
}

/// Outcome of [`decide_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDecision {
    /// A member of the legal action list.
    pub action: Action,
    /// Position of the player in the observation of `action`.
    pub next_position: Option<Position>,
    /// Whether the selector's choice was replaced by a random legal action.
    pub recovered: bool,
}

/// Asks `selector` for an action and validates it against the legal set.
///
/// Returns `None` only if `view` has no legal actions.
pub fn decide_turn(
    selector: &dyn ActionSelector,
    view: &TurnView<'_>,
    rng: &mut dyn RngCore,
) -> Option<TurnDecision> {
    let selected = selector.select_action(view, rng);
    let legal_index = selected.and_then(|a| view.actions.iter().position(|b| *b == a));
    let recovered = legal_index.is_none();
    let index = match legal_index {
        Some(index) => index,
        None if view.actions.is_empty() => return None,
        None => rng.random_range(0..view.actions.len()),
    };
    let action = view.actions[index];
    if recovered {
        log::warn!(
            "player {}: selected action {selected:?} is not legal, substituting {action}",
            view.player
        );
    }
    let next_position = view
        .observations
        .get(index)
        .and_then(|snapshot| snapshot.position(view.player));
    Some(TurnDecision {
        action,
        next_position,
        recovered,
    })
}
