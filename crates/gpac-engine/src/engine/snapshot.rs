use std::collections::{BTreeMap, BTreeSet};

use crate::{GameMap, PlayerId, Position};

/// Read-only view of a game state handed to evaluators.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    players: BTreeMap<PlayerId, Position>,
    pills: BTreeSet<Position>,
    fruit: Option<Position>,
    walls: GameMap,
}

impl GameSnapshot {
    /// Creates an empty snapshot on `walls`; populate it with the `with_*` builders.
    #[must_use]
    pub fn new(walls: GameMap) -> Self {
        Self {
            players: BTreeMap::new(),
            pills: BTreeSet::new(),
            fruit: None,
            walls,
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId, pos: Position) -> Self {
        self.players.insert(player, pos);
        self
    }

    #[must_use]
    pub fn with_pills<I>(mut self, pills: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        self.pills.extend(pills);
        self
    }

    #[must_use]
    pub fn with_fruit(mut self, fruit: Option<Position>) -> Self {
        self.fruit = fruit;
        self
    }

    #[must_use]
    pub fn players(&self) -> &BTreeMap<PlayerId, Position> {
        &self.players
    }

    #[must_use]
    pub fn position(&self, player: &PlayerId) -> Option<Position> {
        self.players.get(player).copied()
    }

    /// Positions of every player other than `player`.
    pub fn others<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = Position> + 'a {
        self.players
            .iter()
            .filter(move |(id, _)| *id != player)
            .map(|(_, pos)| *pos)
    }

    #[must_use]
    pub fn pills(&self) -> &BTreeSet<Position> {
        &self.pills
    }

    #[must_use]
    pub fn fruit(&self) -> Option<Position> {
        self.fruit
    }

    #[must_use]
    pub fn walls(&self) -> &GameMap {
        &self.walls
    }

    pub(crate) fn move_player(&mut self, player: &PlayerId, pos: Position) {
        if let Some(current) = self.players.get_mut(player) {
            *current = pos;
        }
    }

    /// Removes the pill and fruit under `pos`, if any.
    pub(crate) fn consume_at(&mut self, pos: Position) {
        self.pills.remove(&pos);
        if self.fruit == Some(pos) {
            self.fruit = None;
        }
    }
}
