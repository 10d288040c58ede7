use std::fmt;

use serde::{Deserialize, Serialize};

/// Substring that marks a player identifier as the protagonist (Pac-Man).
pub const PACMAN_MARKER: char = 'm';

/// Identifier of an agent taking part in a game.
///
/// Identifiers containing [`PACMAN_MARKER`] belong to the protagonist role; every
/// other identifier is a ghost.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PlayerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn pacman() -> Self {
        Self(PACMAN_MARKER.to_string())
    }

    #[must_use]
    pub fn ghost(index: usize) -> Self {
        Self(index.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn role(&self) -> Role {
        if self.0.contains(PACMAN_MARKER) {
            Role::Pacman
        } else {
            Role::Ghost
        }
    }

    #[must_use]
    pub fn is_pacman(&self) -> bool {
        self.role().is_pacman()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Role {
    #[display("pacman")]
    Pacman,
    #[display("ghost")]
    Ghost,
}
