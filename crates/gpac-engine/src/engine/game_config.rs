use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Match parameters of a [`GPacGame`](super::GPacGame).
///
/// Every field has a default, so partial JSON objects deserialize cleanly.
///
/// # Example
///
/// ```
/// use gpac_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "num_ghosts": 1 }"#).unwrap();
/// assert_eq!(config.num_ghosts, 1);
/// assert_eq!(config.time_multiplier, GameConfig::default().time_multiplier);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of ghosts chasing Pac-Man.
    pub num_ghosts: usize,
    /// Probability that an open cell starts with a pill.
    pub pill_density: f64,
    /// Per-turn probability that a fruit appears while none is on the board.
    pub fruit_spawn_probability: f64,
    /// Points awarded for eating a fruit.
    pub fruit_score: f64,
    /// Turn limit as a multiple of the map area.
    pub time_multiplier: usize,
    /// Seed for pill placement and fruit spawns; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_ghosts: 3,
            pill_density: 1.0 / 3.0,
            fruit_spawn_probability: 0.01,
            fruit_score: 10.0,
            time_multiplier: 2,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pill_density > 0.0 && self.pill_density <= 1.0) {
            return Err(ConfigError {
                field: "pill_density",
                reason: "must be in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.fruit_spawn_probability) {
            return Err(ConfigError {
                field: "fruit_spawn_probability",
                reason: "must be in [0, 1]",
            });
        }
        if !self.fruit_score.is_finite() {
            return Err(ConfigError {
                field: "fruit_score",
                reason: "must be finite",
            });
        }
        if self.time_multiplier == 0 {
            return Err(ConfigError {
                field: "time_multiplier",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = GameConfig {
            pill_density: 0.0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "pill_density");

        let config = GameConfig {
            fruit_spawn_probability: 1.5,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field,
            "fruit_spawn_probability"
        );

        let config = GameConfig {
            time_multiplier: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "time_multiplier");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<GameConfig>(r#"{ "ghosts": 2 }"#);
        assert!(result.is_err());
    }
}
