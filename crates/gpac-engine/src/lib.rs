//! Grid pursuit game engine used to evaluate agent strategies.
//!
//! The [`core`] module holds the grid primitives (positions, actions, player
//! identifiers, wall maps and their parsing cache). The [`engine`] module defines the
//! [`GameEngine`] interface that decision loops drive, and the reference
//! [`GPacGame`] implementation: Pac-Man collects pills and fruit while ghosts chase it.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MapParseError {
    #[display("failed to read map file")]
    Io(std::io::Error),
    #[display("map source is empty")]
    #[from(ignore)]
    Empty,
    #[display("map header must contain width and height")]
    #[from(ignore)]
    MissingDimensions,
    #[display("invalid map dimension: {_0:?}")]
    #[from(ignore)]
    InvalidDimension(#[error(not(source))] String),
    #[display("map of {width}x{height} cells exceeds the supported size")]
    #[from(ignore)]
    TooLarge { width: usize, height: usize },
    #[display("wall at column {x} of row {row} lies outside the declared map size")]
    #[from(ignore)]
    WallOutOfBounds { x: usize, row: usize },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid config: {field} {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: &'static str,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum GameSetupError {
    #[display("{_0}")]
    Config(ConfigError),
    #[display("map has no open cell to place players on")]
    #[from(ignore)]
    NoOpenCells,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RegisterActionError {
    #[display("player {_0} is not part of this game")]
    UnknownPlayer(#[error(not(source))] PlayerId),
    #[display("action {action} is not legal for player {player}")]
    IllegalAction { player: PlayerId, action: Action },
}
