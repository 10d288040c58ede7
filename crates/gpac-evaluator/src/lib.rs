//! Strategy evaluation for the G-Pac game.
//!
//! A strategy is an expression tree ([`expr_tree`]) that scores candidate game states.
//! This crate plays games with such strategies through a three-level architecture:
//!
//! 1. **State Evaluation** ([`state_evaluator`]) - Scores one candidate next-state from
//!    its [`state_feature::FeatureVector`] (threat, pill and fruit distances, adjacent
//!    walls, a constant and the composite heuristic).
//!
//! 2. **Turn Evaluation** ([`turn_evaluator`]) - Picks one agent's action for the
//!    current turn by comparing the scores of all candidates, with an exploration
//!    override and recovery from illegal choices.
//!
//! 3. **Episode Evaluation** ([`episode`]) - Plays a whole game to the end and returns
//!    its score and log. [`episode::run_episode`] is the main entry point.
//!
//! # Architecture
//!
//! ```text
//! Episode Evaluation (play a game to the end)
//!     ↓ uses
//! Turn Evaluation (select one action per agent)
//!     ↓ uses
//! State Evaluation (score a candidate state)
//!     ↓ uses
//! Expression Tree / Features
//! ```
//!
//! # Randomness
//!
//! Every random draw (the `RAND` operator, exploration, random policies, recovery)
//! comes from an RNG passed in by the caller. [`episode::run_episode`] seeds its RNG
//! from [`gpac_engine::GameConfig::seed`], so a seeded game replays exactly.

use gpac_engine::{ConfigError, GameSetupError, MapParseError};

pub mod episode;
pub mod expr_tree;
pub mod state_evaluator;
pub mod state_feature;
pub mod turn_evaluator;

/// Setup failure of [`episode::run_episode`]. Once a game starts it always runs to the
/// end.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EpisodeError {
    #[display("failed to load map")]
    Map(MapParseError),
    #[display("failed to set up game")]
    Setup(GameSetupError),
    #[display("{_0}")]
    Config(ConfigError),
}
