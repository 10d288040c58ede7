//! State features: the measurements a strategy tree reads from a candidate state.
//!
//! Every candidate next-state of a turn is reduced to a [`FeatureVector`] holding one
//! value per [`Feature`]. Distances use the Manhattan metric; a distance to something
//! that does not exist on the board (no other agents, no pills left, no fruit) is
//! `+∞`.
//!
//! | symbol      | feature                                         |
//! |-------------|-------------------------------------------------|
//! | `G`         | distance to the nearest other agent (threat)    |
//! | `P`         | distance to the nearest pill                    |
//! | `F`         | distance to the fruit                           |
//! | `W`         | number of orthogonally adjacent walls           |
//! | `C`         | constant `5.0`                                  |
//! | `composite` | fixed weighted heuristic, see [`composite_score`] |
//!
//! The composite heuristic is
//!
//! ```text
//! 100 / (1 + P) + 200 / (1 + F) - 50 / (1 + G) - (10 if the agent did not move)
//! ```
//!
//! and doubles as the scoring function of
//! [`CompositeStateEvaluator`](crate::state_evaluator::CompositeStateEvaluator).

use std::fmt;

use gpac_engine::{GameSnapshot, PlayerId, Position};

use crate::expr_tree::FeatureLookup;

pub const PILL_WEIGHT: f64 = 100.0;
pub const FRUIT_WEIGHT: f64 = 200.0;
pub const THREAT_WEIGHT: f64 = 50.0;
/// Deducted from the composite score when the agent stays in place.
pub const STAY_PENALTY: f64 = 10.0;
/// Value of the constant feature `C`.
pub const CONSTANT_FEATURE_VALUE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ThreatDistance,
    PillDistance,
    FruitDistance,
    AdjacentWalls,
    Constant,
    Composite,
}

impl Feature {
    pub const ALL: [Self; 6] = [
        Self::ThreatDistance,
        Self::PillDistance,
        Self::FruitDistance,
        Self::AdjacentWalls,
        Self::Constant,
        Self::Composite,
    ];

    /// Symbol used for this feature in expression tree terminals.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ThreatDistance => "G",
            Self::PillDistance => "P",
            Self::FruitDistance => "F",
            Self::AdjacentWalls => "W",
            Self::Constant => "C",
            Self::Composite => "composite",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.symbol() == symbol)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Feature values of one candidate state, as seen by one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    position: Position,
    values: [f64; Feature::ALL.len()],
}

impl FeatureVector {
    /// Extracts the features of `player` in `snapshot`.
    ///
    /// `previous` is where the player stood on the previous turn; `None` on the first
    /// turn, in which case no stay penalty applies. Returns `None` if `player` is not
    /// on the board.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn extract(
        snapshot: &GameSnapshot,
        player: &PlayerId,
        previous: Option<Position>,
    ) -> Option<Self> {
        let position = snapshot.position(player)?;

        let threat = nearest(position, snapshot.others(player));
        let pill = nearest(position, snapshot.pills().iter().copied());
        let fruit = nearest(position, snapshot.fruit());
        let walls = snapshot.walls().adjacent_walls(position);
        let stayed = previous == Some(position);

        let mut values = [0.0; Feature::ALL.len()];
        values[Feature::ThreatDistance.index()] = threat;
        values[Feature::PillDistance.index()] = pill;
        values[Feature::FruitDistance.index()] = fruit;
        values[Feature::AdjacentWalls.index()] = walls as f64;
        values[Feature::Constant.index()] = CONSTANT_FEATURE_VALUE;
        values[Feature::Composite.index()] = composite_score(threat, pill, fruit, stayed);

        Some(Self { position, values })
    }

    /// Position of the agent in the evaluated state.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    #[must_use]
    pub fn composite(&self) -> f64 {
        self.get(Feature::Composite)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

impl FeatureLookup for FeatureVector {
    fn lookup(&self, symbol: &str) -> Option<f64> {
        Feature::from_symbol(symbol).map(|f| self.get(f))
    }
}

/// The composite heuristic over already measured distances.
///
/// Infinite distances contribute nothing to their term.
#[must_use]
pub fn composite_score(threat: f64, pill: f64, fruit: f64, stayed: bool) -> f64 {
    let penalty = if stayed { STAY_PENALTY } else { 0.0 };
    PILL_WEIGHT / (1.0 + pill) + FRUIT_WEIGHT / (1.0 + fruit) - THREAT_WEIGHT / (1.0 + threat)
        - penalty
}

#[expect(clippy::cast_precision_loss)]
fn nearest<I>(from: Position, targets: I) -> f64
where
    I: IntoIterator<Item = Position>,
{
    targets
        .into_iter()
        .map(|target| from.manhattan(target))
        .min()
        .map_or(f64::INFINITY, |d| d as f64)
}

#[cfg(test)]
mod tests {
    use gpac_engine::GameMap;

    use super::*;

    fn open_map() -> GameMap {
        GameMap::from_fn(7, 7, |_, _| false)
    }

    fn pacman_at(pos: (usize, usize)) -> GameSnapshot {
        GameSnapshot::new(open_map())
            .with_player(PlayerId::pacman(), pos.into())
            .with_player(PlayerId::ghost(0), (2, 5).into())
            .with_pills([(2, 0).into()])
    }

    #[test]
    fn test_distances() {
        let snapshot = pacman_at((2, 2));
        let fv = FeatureVector::extract(&snapshot, &PlayerId::pacman(), None).unwrap();
        assert_eq!(fv.get(Feature::ThreatDistance), 3.0);
        assert_eq!(fv.get(Feature::PillDistance), 2.0);
        assert_eq!(fv.get(Feature::FruitDistance), f64::INFINITY);
        assert_eq!(fv.get(Feature::AdjacentWalls), 0.0);
        assert_eq!(fv.get(Feature::Constant), CONSTANT_FEATURE_VALUE);
        assert_eq!(fv.position(), Position::new(2, 2));
    }

    #[test]
    fn test_composite_prefers_approaching_pill() {
        let player = PlayerId::pacman();
        let previous = Some(Position::new(2, 2));
        let score = |pos| {
            FeatureVector::extract(&pacman_at(pos), &player, previous)
                .unwrap()
                .composite()
        };
        // toward the pill, toward the ghost, sideways
        let toward_pill = score((2, 1));
        let toward_ghost = score((2, 3));
        let sideways = score((1, 2));
        assert!(toward_pill > toward_ghost);
        assert!(toward_pill > sideways);
        assert!(sideways > toward_ghost);
    }

    #[test]
    fn test_stay_penalty() {
        let snapshot = pacman_at((2, 2));
        let player = PlayerId::pacman();
        let moved = FeatureVector::extract(&snapshot, &player, Some(Position::new(2, 3))).unwrap();
        let stayed = FeatureVector::extract(&snapshot, &player, Some(Position::new(2, 2))).unwrap();
        let first = FeatureVector::extract(&snapshot, &player, None).unwrap();
        assert!((moved.composite() - stayed.composite() - STAY_PENALTY).abs() < 1e-9);
        assert_eq!(moved.composite(), first.composite());
    }

    #[test]
    fn test_missing_targets_are_infinite() {
        let snapshot = GameSnapshot::new(open_map()).with_player(PlayerId::pacman(), (3, 3).into());
        let fv = FeatureVector::extract(&snapshot, &PlayerId::pacman(), None).unwrap();
        assert_eq!(fv.get(Feature::ThreatDistance), f64::INFINITY);
        assert_eq!(fv.get(Feature::PillDistance), f64::INFINITY);
        assert_eq!(fv.get(Feature::FruitDistance), f64::INFINITY);
        assert_eq!(fv.composite(), 0.0);
    }

    #[test]
    fn test_threat_includes_every_other_agent() {
        let snapshot = GameSnapshot::new(open_map())
            .with_player(PlayerId::ghost(0), (0, 0).into())
            .with_player(PlayerId::ghost(1), (6, 6).into())
            .with_player(PlayerId::pacman(), (5, 6).into());
        let fv = FeatureVector::extract(&snapshot, &PlayerId::ghost(0), None).unwrap();
        assert_eq!(fv.get(Feature::ThreatDistance), 11.0);
        let fv = FeatureVector::extract(&snapshot, &PlayerId::pacman(), None).unwrap();
        assert_eq!(fv.get(Feature::ThreatDistance), 1.0);
    }

    #[test]
    fn test_adjacent_walls_and_fruit() {
        let map = GameMap::parse_str("3 3\n###\n#..\n###").unwrap();
        let snapshot = GameSnapshot::new(map)
            .with_player(PlayerId::pacman(), (1, 1).into())
            .with_fruit(Some((2, 1).into()));
        let fv = FeatureVector::extract(&snapshot, &PlayerId::pacman(), None).unwrap();
        assert_eq!(fv.get(Feature::AdjacentWalls), 3.0);
        assert_eq!(fv.get(Feature::FruitDistance), 1.0);
    }

    #[test]
    fn test_lookup_by_symbol() {
        let fv = FeatureVector::extract(&pacman_at((2, 2)), &PlayerId::pacman(), None).unwrap();
        for (feature, value) in fv.iter() {
            assert_eq!(fv.lookup(feature.symbol()), Some(value));
        }
        assert_eq!(fv.lookup("X"), None);
        assert!(FeatureVector::extract(&pacman_at((2, 2)), &PlayerId::ghost(4), None).is_none());
    }
}
