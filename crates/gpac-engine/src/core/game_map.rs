use std::{fmt, fs, path::Path, sync::Arc};

use crate::MapParseError;

use super::position::{Action, Position};

/// Side length of the default map.
pub const DEFAULT_MAP_SIZE: usize = 21;
/// Largest cell count a parsed map may declare.
pub const MAX_MAP_CELLS: usize = 1 << 24;

/// Immutable wall-occupancy grid.
///
/// Cells are indexed `[x][y]` with `y` growing upwards. The grid is shared through an
/// [`Arc`], so clones are cheap and clones of one parse compare pointer-equal
/// (see [`GameMap::ptr_eq`]).
#[derive(Clone, PartialEq, Eq)]
pub struct GameMap {
    width: usize,
    height: usize,
    walls: Arc<[bool]>,
}

impl fmt::Debug for GameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GameMap {}x{}", self.width, self.height)?;
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let c = if self.walls[self.index(x, y)] { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Default for GameMap {
    fn default() -> Self {
        Self::default_cross()
    }
}

impl GameMap {
    /// Builds a map from a wall predicate evaluated for every `(x, y)`.
    pub fn from_fn<F>(width: usize, height: usize, mut is_wall: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut walls = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                walls.push(is_wall(x, y));
            }
        }
        Self {
            width,
            height,
            walls: walls.into(),
        }
    }

    /// The generic 21×21 layout: an open border and an open cross through the centre
    /// row and column, every other cell a wall.
    ///
    /// # Example
    ///
    /// ```
    /// use gpac_engine::{GameMap, Position};
    ///
    /// let map = GameMap::default_cross();
    /// assert_eq!((map.width(), map.height()), (21, 21));
    /// assert!(!map.is_wall(Position::new(10, 10)));
    /// assert!(map.is_wall(Position::new(5, 5)));
    /// ```
    #[must_use]
    pub fn default_cross() -> Self {
        let size = DEFAULT_MAP_SIZE;
        let mid = size / 2;
        Self::from_fn(size, size, |x, y| {
            let open = x == 0 || y == 0 || x == size - 1 || y == size - 1 || x == mid || y == mid;
            !open
        })
    }

    /// Parses a map from its text form.
    ///
    /// The first line holds `"<width> <height>"`; the following lines are rows from
    /// top to bottom where `#` marks a wall. Rows or columns beyond the declared size
    /// are ignored as long as they carry no wall.
    pub fn parse_lines<S>(lines: &[S]) -> Result<Self, MapParseError>
    where
        S: AsRef<str>,
    {
        let (header, rows) = lines.split_first().ok_or(MapParseError::Empty)?;
        let (width, height) = parse_header(header.as_ref())?;

        let mut walls = vec![false; width * height];
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            for (x, c) in line.chars().enumerate() {
                if c != '#' {
                    continue;
                }
                if x >= width || row >= height {
                    return Err(MapParseError::WallOutOfBounds { x, row });
                }
                let y = height - 1 - row;
                walls[x * height + y] = true;
            }
        }

        Ok(Self {
            width,
            height,
            walls: walls.into(),
        })
    }

    /// Parses a map from a single multi-line string.
    pub fn parse_str(contents: &str) -> Result<Self, MapParseError> {
        let lines = contents.split('\n').collect::<Vec<_>>();
        Self::parse_lines(&lines)
    }

    /// Reads and parses a map file.
    pub fn from_file<P>(path: P) -> Result<Self, MapParseError>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;
        Self::parse_str(&contents)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Returns whether `pos` is a wall. Cells outside the grid count as walls.
    #[must_use]
    pub fn is_wall(&self, pos: Position) -> bool {
        !self.contains(pos) || self.walls[self.index(pos.x, pos.y)]
    }

    #[must_use]
    pub fn is_open(&self, pos: Position) -> bool {
        !self.is_wall(pos)
    }

    /// Neighbouring cell in `direction` if it lies inside the grid.
    #[must_use]
    pub fn neighbor(&self, pos: Position, direction: Action) -> Option<Position> {
        pos.step(direction).filter(|p| self.contains(*p))
    }

    /// Number of the four orthogonal neighbours of `pos` that are walls.
    ///
    /// Neighbours outside the grid are not counted.
    #[must_use]
    pub fn adjacent_walls(&self, pos: Position) -> usize {
        Action::MOVES
            .into_iter()
            .filter_map(|dir| self.neighbor(pos, dir))
            .filter(|p| self.is_wall(*p))
            .count()
    }

    /// Iterates over every open cell, column by column.
    pub fn open_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.height).map(move |y| Position::new(x, y)))
            .filter(|p| self.is_open(*p))
    }

    /// Renders the map back into its text form, header line first.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.height + 1);
        lines.push(format!("{} {}", self.width, self.height));
        for y in (0..self.height).rev() {
            let row = (0..self.width)
                .map(|x| if self.walls[self.index(x, y)] { '#' } else { '.' })
                .collect();
            lines.push(row);
        }
        lines
    }

    /// Whether two maps share the same parsed storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.walls, &other.walls)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), MapParseError> {
    let mut fields = header.split_whitespace();
    let mut next_dim = || -> Result<usize, MapParseError> {
        let field = fields.next().ok_or(MapParseError::MissingDimensions)?;
        field
            .parse()
            .map_err(|_| MapParseError::InvalidDimension(field.to_owned()))
    };
    let width = next_dim()?;
    let height = next_dim()?;
    let cells = width.checked_mul(height);
    if width == 0 || height == 0 {
        return Err(MapParseError::InvalidDimension(header.trim().to_owned()));
    }
    if cells.is_none_or(|cells| cells > MAX_MAP_CELLS) {
        return Err(MapParseError::TooLarge { width, height });
    }
    Ok((width, height))
}
