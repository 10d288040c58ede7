use chrono::{DateTime, Utc};
use gpac_engine::GameLog;
use serde::{Deserialize, Serialize};

use crate::schema::run_config::RunConfig;

/// One played episode, saved for replay and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Timestamp when the episode finished (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Configuration the episode was played with
    pub config: RunConfig,
    /// Pac-Man strategy in infix form, `None` for random play
    pub pacman_tree: Option<String>,
    /// Ghost strategy in infix form, `None` for random play
    pub ghost_tree: Option<String>,
    pub score: f64,
    pub turns: usize,
    pub recovered_actions: usize,
    pub log: GameLog,
}

/// Scores of one strategy over several episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub recorded_at: DateTime<Utc>,
    pub config: RunConfig,
    pub pacman_tree: Option<String>,
    pub ghost_tree: Option<String>,
    pub scores: Vec<f64>,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}
