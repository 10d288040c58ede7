use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng as _, seq::IteratorRandom as _};
use rand_pcg::Pcg64Mcg;

use crate::{
    Action, ConfigError, GameMap, GameSetupError, PlayerId, Position, RegisterActionError,
};

use super::{ActionList, GameConfig, GameEngine, GameLog, GameSnapshot, TurnRecord};

/// Points shared by all pills of a game; each pill is worth `PILL_POINTS / pill count`.
const PILL_POINTS: f64 = 100.0;
/// Points for clearing the board, scaled by the fraction of turns left.
const TIME_BONUS_POINTS: f64 = 100.0;

/// Reference implementation of the G-Pac rules.
///
/// See the [module documentation](super) for the rules.
#[derive(Debug, Clone)]
pub struct GPacGame {
    map: GameMap,
    config: GameConfig,
    rng: Pcg64Mcg,
    players: Vec<PlayerId>,
    positions: BTreeMap<PlayerId, Position>,
    pending: BTreeMap<PlayerId, Action>,
    pills: BTreeSet<Position>,
    initial_pill_count: usize,
    fruit: Option<Position>,
    time: usize,
    time_limit: usize,
    score: f64,
    gameover: bool,
    log: GameLog,
}

impl GPacGame {
    /// Sets up a new game on `map`.
    ///
    /// Pill placement and fruit spawns draw from an RNG seeded with
    /// [`GameConfig::seed`], so two games with the same seed, map and actions play out
    /// identically.
    pub fn new(map: GameMap, config: GameConfig) -> Result<Self, GameSetupError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_os_rng(),
        };
        Self::with_rng(map, config, rng)
    }

    fn with_rng(
        map: GameMap,
        config: GameConfig,
        mut rng: Pcg64Mcg,
    ) -> Result<Self, GameSetupError> {
        let time_limit = config
            .time_multiplier
            .checked_mul(map.width())
            .and_then(|limit| limit.checked_mul(map.height()))
            .ok_or(ConfigError {
                field: "time_multiplier",
                reason: "makes the turn limit overflow for this map",
            })?;

        // top-left for Pac-Man, bottom-right for ghosts
        let pacman_start = (0..map.height())
            .rev()
            .flat_map(|y| (0..map.width()).map(move |x| Position::new(x, y)))
            .find(|p| map.is_open(*p))
            .ok_or(GameSetupError::NoOpenCells)?;
        let ghost_start = (0..map.height())
            .flat_map(|y| (0..map.width()).rev().map(move |x| Position::new(x, y)))
            .find(|p| map.is_open(*p))
            .ok_or(GameSetupError::NoOpenCells)?;

        let mut players = vec![PlayerId::pacman()];
        players.extend((0..config.num_ghosts).map(PlayerId::ghost));
        let positions = players
            .iter()
            .map(|p| {
                let start = if p.is_pacman() { pacman_start } else { ghost_start };
                (p.clone(), start)
            })
            .collect();

        let candidates = map
            .open_cells()
            .filter(|p| *p != pacman_start && *p != ghost_start)
            .collect::<Vec<_>>();
        let mut pills = candidates
            .iter()
            .copied()
            .filter(|_| rng.random_bool(config.pill_density))
            .collect::<BTreeSet<_>>();
        if pills.is_empty()
            && let Some(pill) = candidates.iter().copied().choose(&mut rng)
        {
            pills.insert(pill);
        }

        let log = GameLog::new(&map, pills.iter().copied().collect());
        let mut game = Self {
            initial_pill_count: pills.len(),
            gameover: pills.is_empty(),
            map,
            config,
            rng,
            players,
            positions,
            pending: BTreeMap::new(),
            pills,
            fruit: None,
            time: 0,
            time_limit,
            score: 0.0,
            log,
        };
        game.record_turn(BTreeMap::new());
        Ok(game)
    }

    #[must_use]
    pub fn map(&self) -> &GameMap {
        &self.map
    }

    #[must_use]
    pub fn time(&self) -> usize {
        self.time
    }

    #[must_use]
    pub fn time_limit(&self) -> usize {
        self.time_limit
    }

    #[must_use]
    pub fn position(&self, player: &PlayerId) -> Option<Position> {
        self.positions.get(player).copied()
    }

    #[must_use]
    pub fn pills(&self) -> &BTreeSet<Position> {
        &self.pills
    }

    #[must_use]
    pub fn fruit(&self) -> Option<Position> {
        self.fruit
    }

    /// The current state as seen by evaluators.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new(self.map.clone())
            .with_pills(self.pills.iter().copied())
            .with_fruit(self.fruit);
        for (player, pos) in &self.positions {
            snapshot = snapshot.with_player(player.clone(), *pos);
        }
        snapshot
    }

    fn destination(&self, player: &PlayerId, action: Action) -> Option<Position> {
        let pos = self.positions.get(player)?;
        self.map
            .neighbor(*pos, action)
            .filter(|p| self.map.is_open(*p))
    }

    fn fallback_action(&self, player: &PlayerId) -> Action {
        let actions = self.actions(player);
        if actions.contains(&Action::Hold) {
            Action::Hold
        } else {
            actions.first().copied().unwrap_or(Action::Hold)
        }
    }

    fn spawn_fruit(&mut self) {
        if self.fruit.is_some() || !self.rng.random_bool(self.config.fruit_spawn_probability) {
            return;
        }
        let occupied = self.positions.values().copied().collect::<BTreeSet<_>>();
        self.fruit = self
            .map
            .open_cells()
            .filter(|p| !self.pills.contains(p) && !occupied.contains(p))
            .choose(&mut self.rng);
    }

    fn record_turn(&mut self, actions: BTreeMap<PlayerId, Action>) {
        self.log.push(TurnRecord {
            turn: self.time,
            actions,
            positions: self.positions.clone(),
            pills_remaining: self.pills.len(),
            fruit: self.fruit,
            score: self.score,
        });
    }
}

impl GameEngine for GPacGame {
    type Log = GameLog;

    fn players(&self) -> &[PlayerId] {
        &self.players
    }

    fn is_gameover(&self) -> bool {
        self.gameover
    }

    /// Moves into open cells are always legal. Pac-Man may also hold still; a ghost
    /// may only hold when boxed in.
    fn actions(&self, player: &PlayerId) -> ActionList {
        let mut actions = ActionList::new();
        if player.is_pacman() {
            actions.push(Action::Hold);
        }
        for direction in Action::MOVES {
            if self.destination(player, direction).is_some() {
                actions.push(direction);
            }
        }
        if actions.is_empty() && self.positions.contains_key(player) {
            actions.push(Action::Hold);
        }
        actions
    }

    fn observations(&self, actions: &[Action], player: &PlayerId) -> Vec<GameSnapshot> {
        let current = self.snapshot();
        actions
            .iter()
            .map(|action| {
                let mut snapshot = current.clone();
                if let Some(pos) = self.destination(player, *action) {
                    snapshot.move_player(player, pos);
                    if player.is_pacman() {
                        snapshot.consume_at(pos);
                    }
                }
                snapshot
            })
            .collect()
    }

    fn register_action(
        &mut self,
        action: Action,
        player: &PlayerId,
    ) -> Result<(), RegisterActionError> {
        if !self.positions.contains_key(player) {
            return Err(RegisterActionError::UnknownPlayer(player.clone()));
        }
        if !self.actions(player).contains(&action) {
            return Err(RegisterActionError::IllegalAction {
                player: player.clone(),
                action,
            });
        }
        self.pending.insert(player.clone(), action);
        Ok(())
    }

    fn step(&mut self) {
        if self.gameover {
            return;
        }

        let mut actions = BTreeMap::new();
        for player in &self.players {
            let action = match self.pending.get(player) {
                Some(action) => *action,
                None => {
                    log::debug!("no action registered for {player}, using fallback");
                    self.fallback_action(player)
                }
            };
            actions.insert(player.clone(), action);
        }
        self.pending.clear();

        let previous = self.positions.clone();
        for (player, action) in &actions {
            if let Some(pos) = self.destination(player, *action) {
                self.positions.insert(player.clone(), pos);
            }
        }
        self.time += 1;

        let pacman = PlayerId::pacman();
        let pacman_pos = self.positions[&pacman];
        let pacman_prev = previous[&pacman];
        let caught = self.positions.iter().any(|(player, pos)| {
            !player.is_pacman()
                && (*pos == pacman_pos
                    || (*pos == pacman_prev && previous[player] == pacman_pos))
        });

        if caught {
            self.gameover = true;
        } else {
            if self.pills.remove(&pacman_pos) {
                #[expect(clippy::cast_precision_loss)]
                let pill_score = PILL_POINTS / self.initial_pill_count as f64;
                self.score += pill_score;
            }
            if self.fruit == Some(pacman_pos) {
                self.score += self.config.fruit_score;
                self.fruit = None;
            }
            if self.pills.is_empty() {
                #[expect(clippy::cast_precision_loss)]
                let remaining = (self.time_limit - self.time) as f64 / self.time_limit as f64;
                self.score += TIME_BONUS_POINTS * remaining;
                self.gameover = true;
            } else if self.time >= self.time_limit {
                self.gameover = true;
            } else {
                self.spawn_fruit();
            }
        }

        self.record_turn(actions);
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn log(&self) -> &GameLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_game(num_ghosts: usize) -> GPacGame {
        // single open row: m . . . . g
        let map = GameMap::parse_str("6 3\n######\n......\n######").unwrap();
        let config = GameConfig {
            num_ghosts,
            pill_density: 1.0,
            fruit_spawn_probability: 0.0,
            seed: Some(1),
            ..GameConfig::default()
        };
        GPacGame::new(map, config).unwrap()
    }

    fn register_all(game: &mut GPacGame, pacman: Action, ghosts: Action) {
        for player in game.players().to_vec() {
            let action = if player.is_pacman() { pacman } else { ghosts };
            game.register_action(action, &player).unwrap();
        }
    }

    #[test]
    fn test_initial_layout() {
        let game = corridor_game(2);
        assert_eq!(
            game.players(),
            [PlayerId::pacman(), PlayerId::ghost(0), PlayerId::ghost(1)]
        );
        assert_eq!(game.position(&PlayerId::pacman()), Some(Position::new(0, 1)));
        assert_eq!(game.position(&PlayerId::ghost(0)), Some(Position::new(5, 1)));
        // every open cell except both start cells
        assert_eq!(game.pills().len(), 4);
        assert_eq!(game.time_limit(), 2 * 6 * 3);
        assert_eq!(game.log().turns.len(), 1);
        assert!(!game.is_gameover());
    }

    #[test]
    fn test_legal_actions() {
        let game = corridor_game(1);
        let pacman = game.actions(&PlayerId::pacman());
        assert_eq!(pacman.as_slice(), [Action::Hold, Action::Right]);
        let ghost = game.actions(&PlayerId::ghost(0));
        assert_eq!(ghost.as_slice(), [Action::Left]);
    }

    #[test]
    fn test_register_rejects_illegal_action() {
        let mut game = corridor_game(1);
        assert_eq!(
            game.register_action(Action::Up, &PlayerId::pacman()),
            Err(RegisterActionError::IllegalAction {
                player: PlayerId::pacman(),
                action: Action::Up,
            })
        );
        assert_eq!(
            game.register_action(Action::Hold, &PlayerId::new("x")),
            Err(RegisterActionError::UnknownPlayer(PlayerId::new("x")))
        );
    }

    #[test]
    fn test_observations_are_index_aligned() {
        let game = corridor_game(1);
        let pacman = PlayerId::pacman();
        let actions = game.actions(&pacman);
        let observations = game.observations(&actions, &pacman);
        assert_eq!(observations.len(), actions.len());
        assert_eq!(observations[0].position(&pacman), Some(Position::new(0, 1)));
        assert_eq!(observations[1].position(&pacman), Some(Position::new(1, 1)));
        // the pill under Pac-Man's new cell is gone in that observation only
        assert!(observations[0].pills().contains(&Position::new(1, 1)));
        assert!(!observations[1].pills().contains(&Position::new(1, 1)));
        // the live game is untouched
        assert!(game.pills().contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_eating_pills_scores() {
        let mut game = corridor_game(1);
        register_all(&mut game, Action::Right, Action::Left);
        game.step();
        assert_eq!(game.position(&PlayerId::pacman()), Some(Position::new(1, 1)));
        assert_eq!(game.pills().len(), 3);
        assert!((game.score() - 25.0).abs() < 1e-9);
        assert_eq!(game.log().turns.len(), 2);
    }

    #[test]
    fn test_swap_is_caught() {
        let map = GameMap::parse_str("2 1\n..").unwrap();
        let config = GameConfig {
            num_ghosts: 1,
            pill_density: 1.0,
            seed: Some(3),
            ..GameConfig::default()
        };
        let mut game = GPacGame::new(map, config).unwrap();
        // no cell is left for pills, so the game is already over
        assert!(game.is_gameover());

        let map = GameMap::parse_str("3 1\n...").unwrap();
        game = GPacGame::new(
            map,
            GameConfig {
                num_ghosts: 1,
                seed: Some(3),
                ..GameConfig::default()
            },
        )
        .unwrap();
        // Pac-Man at x=0, ghost at x=2, one pill at x=1
        register_all(&mut game, Action::Hold, Action::Left);
        game.step();
        assert!(!game.is_gameover());
        register_all(&mut game, Action::Right, Action::Left);
        game.step();
        assert!(game.is_gameover());
    }

    #[test]
    fn test_clearing_board_ends_game_with_bonus() {
        let map = GameMap::parse_str("3 1\n...").unwrap();
        let mut game = GPacGame::new(
            map,
            GameConfig {
                num_ghosts: 0,
                seed: Some(5),
                ..GameConfig::default()
            },
        )
        .unwrap();
        register_all(&mut game, Action::Right, Action::Hold);
        game.step();
        assert!(game.is_gameover());
        // 100 for the only pill plus 100 * (5 / 6) of the time left
        let expected = 100.0 + 100.0 * 5.0 / 6.0;
        assert!((game.score() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_turn_limit_overflow_rejected() {
        let config = GameConfig {
            time_multiplier: usize::MAX,
            seed: Some(1),
            ..GameConfig::default()
        };
        config.validate().unwrap();
        let result = GPacGame::new(GameMap::default_cross(), config);
        assert!(matches!(
            result,
            Err(GameSetupError::Config(ConfigError {
                field: "time_multiplier",
                ..
            }))
        ));
    }

    #[test]
    fn test_time_limit_ends_game() {
        let mut game = corridor_game(0);
        while !game.is_gameover() {
            register_all(&mut game, Action::Hold, Action::Hold);
            game.step();
        }
        assert_eq!(game.time(), game.time_limit());
        assert_eq!(game.log().turns.len(), game.time_limit() + 1);
    }

    #[test]
    fn test_missing_action_uses_fallback() {
        let mut game = corridor_game(1);
        game.step();
        assert_eq!(game.position(&PlayerId::pacman()), Some(Position::new(0, 1)));
        assert_eq!(game.position(&PlayerId::ghost(0)), Some(Position::new(4, 1)));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GPacGame::new(
            GameMap::default_cross(),
            GameConfig {
                seed: Some(42),
                ..GameConfig::default()
            },
        )
        .unwrap();
        let b = GPacGame::new(
            GameMap::default_cross(),
            GameConfig {
                seed: Some(42),
                ..GameConfig::default()
            },
        )
        .unwrap();
        assert_eq!(a.pills(), b.pills());
    }

    #[test]
    fn test_log_serializes() {
        let mut game = corridor_game(1);
        register_all(&mut game, Action::Right, Action::Left);
        game.step();
        let json = serde_json::to_string(game.log()).unwrap();
        let parsed: GameLog = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, game.log());
    }
}
