use gpac_engine::GameConfig;
use gpac_evaluator::episode::EpisodeConfig;
use gpac_training::tree_generator::TreeConfig;
use serde::{Deserialize, Serialize};

/// Contents of a `--config` file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub game: GameConfig,
    pub episode: EpisodeConfig,
    pub tree: TreeConfig,
}

#[cfg(test)]
mod tests {
    use gpac_training::tree_generator::GenerationMethod;

    use super::*;

    #[test]
    fn test_partial_sections() {
        let config: RunConfig = serde_json::from_str(
            r#"{
                "game": { "num_ghosts": 2, "seed": 9 },
                "tree": { "method": "full" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.game.num_ghosts, 2);
        assert_eq!(config.game.seed, Some(9));
        assert_eq!(config.episode, EpisodeConfig::default());
        assert_eq!(config.tree.method, GenerationMethod::Full);
        assert_eq!(config.tree.max_depth, TreeConfig::default().max_depth);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(serde_json::from_str::<RunConfig>(r#"{ "ghosts": {} }"#).is_err());
    }
}
