use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, GameMap, PlayerId, Position};

/// Full record of a [`GPacGame`](super::GPacGame), enough to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    /// Map in its text form (header line first).
    pub map: Vec<String>,
    pub initial_pills: Vec<Position>,
    pub turns: Vec<TurnRecord>,
}

/// State after one turn. Turn 0 is the initial layout with no actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub actions: BTreeMap<PlayerId, Action>,
    pub positions: BTreeMap<PlayerId, Position>,
    pub pills_remaining: usize,
    pub fruit: Option<Position>,
    pub score: f64,
}

impl GameLog {
    pub(crate) fn new(map: &GameMap, initial_pills: Vec<Position>) -> Self {
        Self {
            map: map.to_lines(),
            initial_pills,
            turns: vec![],
        }
    }

    pub(crate) fn push(&mut self, record: TurnRecord) {
        self.turns.push(record);
    }

    #[must_use]
    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.turns.last()
    }
}
