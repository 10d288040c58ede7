//! Game engine interface and the reference G-Pac game.
//!
//! Decision loops drive a game exclusively through [`GameEngine`]:
//!
//! 1. Read [`GameEngine::players`] in engine order
//! 2. For each player, query [`GameEngine::actions`] and the index-aligned
//!    [`GameEngine::observations`] (one [`GameSnapshot`] per action)
//! 3. Submit one action per player with [`GameEngine::register_action`]
//! 4. Advance with [`GameEngine::step`]
//! 5. Repeat until [`GameEngine::is_gameover`], then read [`GameEngine::score`] and
//!    [`GameEngine::log`]
//!
//! [`GPacGame`] implements these rules on a [`GameMap`](crate::GameMap):
//!
//! - Pac-Man (`"m"`) starts in the top-left open cell, ghosts (`"0"`, `"1"`, ...) in
//!   the bottom-right one
//! - Pills are scattered over open cells according to [`GameConfig::pill_density`];
//!   a fruit may appear on any turn when none is on the board
//! - The game ends when a ghost catches Pac-Man, when every pill is eaten, or when
//!   the turn limit (`time_multiplier × width × height`) runs out
//!
//! # Example
//!
//! ```
//! use gpac_engine::{GPacGame, GameConfig, GameEngine, GameMap};
//!
//! let config = GameConfig { seed: Some(7), ..GameConfig::default() };
//! let mut game = GPacGame::new(GameMap::default_cross(), config).unwrap();
//! while !game.is_gameover() {
//!     for player in game.players().to_vec() {
//!         let action = game.actions(&player)[0];
//!         game.register_action(action, &player).unwrap();
//!     }
//!     game.step();
//! }
//! println!("final score: {}", game.score());
//! ```

use arrayvec::ArrayVec;

use crate::{Action, PlayerId, RegisterActionError};

pub use self::{game_config::*, game_log::*, gpac_game::*, snapshot::*};

mod game_config;
mod game_log;
mod gpac_game;
mod snapshot;

/// Legal actions of one player for one turn.
pub type ActionList = ArrayVec<Action, 5>;

/// A turn-based game that agents play by submitting one action per player per turn.
pub trait GameEngine {
    /// Record of the whole game, returned alongside the final score.
    type Log;

    /// Players in the order they should be asked for actions.
    fn players(&self) -> &[PlayerId];

    fn is_gameover(&self) -> bool;

    /// Legal actions of `player` for the current turn. Never empty while the game is
    /// running.
    fn actions(&self, player: &PlayerId) -> ActionList;

    /// The state that results from `player` taking each of `actions`, index-aligned
    /// with `actions`.
    fn observations(&self, actions: &[Action], player: &PlayerId) -> Vec<GameSnapshot>;

    /// Buffers `action` for `player` until the next [`step`](Self::step).
    fn register_action(
        &mut self,
        action: Action,
        player: &PlayerId,
    ) -> Result<(), RegisterActionError>;

    /// Applies every buffered action and advances the game by one turn.
    fn step(&mut self);

    fn score(&self) -> f64;

    fn log(&self) -> &Self::Log;
}
