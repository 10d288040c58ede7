use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the game grid.
///
/// `x` grows to the right and `y` grows upwards, so `(0, 0)` is the bottom-left
/// corner of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance (sum of absolute coordinate differences).
    ///
    /// # Example
    ///
    /// ```
    /// use gpac_engine::Position;
    ///
    /// let a = Position::new(2, 2);
    /// let b = Position::new(2, 5);
    /// assert_eq!(a.manhattan(b), 3);
    /// assert_eq!(b.manhattan(a), 3);
    /// ```
    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighbouring cell in `direction`, or `None` when it would leave
    /// the non-negative quadrant. Upper bounds are checked by the map.
    #[must_use]
    pub fn step(self, direction: Action) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

/// A move a player can submit for one turn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Action {
    #[display("hold")]
    Hold,
    #[display("up")]
    Up,
    #[display("down")]
    Down,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

impl Action {
    pub const ALL: [Self; 5] = [Self::Hold, Self::Up, Self::Down, Self::Left, Self::Right];
    pub const MOVES: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Hold => (0, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}
