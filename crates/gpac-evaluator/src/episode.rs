//! Episode evaluation: playing one whole game with a pair of strategies.
//!
//! This is the top level of the decision architecture. [`play_episode`] drives any
//! [`GameEngine`] to completion:
//!
//! 1. For each player in engine order, build a [`TurnView`] from the legal actions
//!    and their observations
//! 2. Let the player's [`ActionSelector`] choose, validated by [`decide_turn`]
//! 3. Register the choice with the engine and remember the player's new position
//! 4. Step the engine, and repeat until it reports game over
//!
//! Pac-Man and the ghosts each get their own selector. [`run_episode`] is the
//! convenience entry point on the reference [`GPacGame`]: a strategy tree becomes a
//! [`GreedySelector`], a missing tree becomes a [`RandomSelector`].
//!
//! # Example
//!
//! ```
//! use gpac_engine::{GameConfig, MapCache, MapSource};
//! use gpac_evaluator::{
//!     episode::{EpisodeConfig, run_episode},
//!     expr_tree::{ExprNode, Operator},
//! };
//!
//! // chase pills, keep away from ghosts
//! let tree = ExprNode::operator(Operator::Sub, ExprNode::terminal("G"), ExprNode::terminal("P"));
//! let game_config = GameConfig { seed: Some(42), ..GameConfig::default() };
//! let cache = MapCache::new();
//! let outcome = run_episode(
//!     Some(&tree),
//!     None,
//!     &MapSource::Default,
//!     &cache,
//!     &game_config,
//!     &EpisodeConfig::default(),
//! )
//! .unwrap();
//! assert!(outcome.turns > 0);
//! assert_eq!(outcome.log.turns.len(), outcome.turns + 1);
//! ```

use std::collections::BTreeMap;

use gpac_engine::{
    ConfigError, GPacGame, GameConfig, GameEngine, GameLog, MapCache, MapSource, PlayerId,
    Position, Role,
};
use rand::{RngCore, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    EpisodeError,
    expr_tree::ExprNode,
    turn_evaluator::{ActionSelector, GreedySelector, RandomSelector, TurnView, decide_turn},
};

/// Added to the game seed to derive the seed of the decision RNG, so that decisions
/// and game events draw from different streams.
const DECISION_SEED_OFFSET: u64 = 0x9e37_79b9_7f4a_7c15;

/// Decision loop options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EpisodeConfig {
    /// Probability that Pac-Man discards its best action for a random one.
    pub pacman_exploration_rate: f64,
    /// Same as `pacman_exploration_rate`, for ghosts driven by a tree.
    pub ghost_exploration_rate: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            pacman_exploration_rate: 0.1,
            ghost_exploration_rate: 0.0,
        }
    }
}

impl EpisodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.pacman_exploration_rate) {
            return Err(ConfigError {
                field: "pacman_exploration_rate",
                reason: "must be in [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.ghost_exploration_rate) {
            return Err(ConfigError {
                field: "ghost_exploration_rate",
                reason: "must be in [0, 1]",
            });
        }
        Ok(())
    }
}

/// Selectors for both sides of a game.
#[derive(Debug, Clone, Copy)]
pub struct Policies<'a> {
    pub pacman: &'a dyn ActionSelector,
    pub ghost: &'a dyn ActionSelector,
}

impl<'a> Policies<'a> {
    #[must_use]
    pub fn for_player(&self, player: &PlayerId) -> &'a dyn ActionSelector {
        match player.role() {
            Role::Pacman => self.pacman,
            Role::Ghost => self.ghost,
        }
    }
}

/// Last known position of every player that has made a decision.
pub type PreviousPositions = BTreeMap<PlayerId, Position>;

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome<L> {
    pub score: f64,
    pub log: L,
    /// Number of engine steps played.
    pub turns: usize,
    /// Number of selections replaced by a random legal action.
    pub recovered_actions: usize,
}

/// Plays one turn: every player decides and registers, then the engine steps.
///
/// `previous` carries each player's position from one turn to the next and is
/// updated with the outcome of this turn's decisions. Returns the number of
/// recovered selections.
pub fn play_turn<E>(
    engine: &mut E,
    policies: Policies<'_>,
    previous: &mut PreviousPositions,
    rng: &mut dyn RngCore,
) -> usize
where
    E: GameEngine,
{
    let mut recovered = 0;
    for player in engine.players().to_vec() {
        let actions = engine.actions(&player);
        let observations = engine.observations(&actions, &player);
        let view = TurnView {
            player: &player,
            actions: &actions,
            observations: &observations,
            previous_position: previous.get(&player).copied(),
        };
        let Some(decision) = decide_turn(policies.for_player(&player), &view, rng) else {
            log::warn!("player {player} has no legal action");
            continue;
        };
        log::debug!("player {player} chose {}", decision.action);
        if decision.recovered {
            recovered += 1;
        }
        if let Err(e) = engine.register_action(decision.action, &player) {
            log::warn!("{e}");
        }
        if let Some(pos) = decision.next_position {
            previous.insert(player, pos);
        }
    }
    engine.step();
    recovered
}

/// Plays `engine` until game over.
pub fn play_episode<E>(
    engine: &mut E,
    policies: Policies<'_>,
    rng: &mut dyn RngCore,
) -> EpisodeOutcome<E::Log>
where
    E: GameEngine,
    E::Log: Clone,
{
    let mut previous = PreviousPositions::new();
    let mut turns = 0;
    let mut recovered_actions = 0;
    while !engine.is_gameover() {
        recovered_actions += play_turn(engine, policies, &mut previous, rng);
        turns += 1;
    }
    EpisodeOutcome {
        score: engine.score(),
        log: engine.log().clone(),
        turns,
        recovered_actions,
    }
}

/// Plays one [`GPacGame`] on `map`.
///
/// Pac-Man follows `pacman_tree` and ghosts follow `ghost_tree`; a side without a
/// tree plays uniformly at random. All errors come from setup, before the first turn.
pub fn run_episode(
    pacman_tree: Option<&ExprNode>,
    ghost_tree: Option<&ExprNode>,
    map: &MapSource,
    cache: &MapCache,
    game_config: &GameConfig,
    config: &EpisodeConfig,
) -> Result<EpisodeOutcome<GameLog>, EpisodeError> {
    config.validate()?;
    let map = cache.load(map)?;
    let mut game = GPacGame::new(map, game_config.clone())?;
    let mut rng = match game_config.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed.wrapping_add(DECISION_SEED_OFFSET)),
        None => Pcg64Mcg::from_os_rng(),
    };

    let pacman = selector(pacman_tree, config.pacman_exploration_rate);
    let ghost = selector(ghost_tree, config.ghost_exploration_rate);
    let policies = Policies {
        pacman: pacman.as_ref(),
        ghost: ghost.as_ref(),
    };

    log::info!(
        "episode start: {} players, pacman strategy {}",
        game.players().len(),
        pacman_tree.map_or_else(|| "random".to_owned(), ToString::to_string)
    );
    let outcome = play_episode(&mut game, policies, &mut rng);
    log::info!(
        "episode finished after {} turns with score {:.2} ({} recovered actions)",
        outcome.turns,
        outcome.score,
        outcome.recovered_actions
    );
    Ok(outcome)
}

fn selector(tree: Option<&ExprNode>, exploration_rate: f64) -> Box<dyn ActionSelector + '_> {
    match tree {
        Some(tree) => Box::new(GreedySelector::new(tree, exploration_rate)),
        None => Box::new(RandomSelector),
    }
}
