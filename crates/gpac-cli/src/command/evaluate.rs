use std::path::PathBuf;

use chrono::Utc;
use gpac_engine::{GameConfig, MapCache};
use gpac_evaluator::episode::run_episode;

use crate::{command::SetupArg, schema::episode_record::EvaluationRecord, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    #[clap(flatten)]
    setup: SetupArg,
    /// Number of episodes to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Let Pac-Man play at random instead of generating a strategy tree
    #[arg(long)]
    random: bool,
    /// Also generate a strategy tree for the ghosts
    #[arg(long)]
    ghost_tree: bool,
    /// Write the scores as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        setup,
        games,
        random,
        ghost_tree,
        output,
    } = arg;
    anyhow::ensure!(*games > 0, "--games must be at least 1");

    let config = setup.load_config()?;
    let (pacman, ghost) = super::generate_trees(&config, *random, *ghost_tree)?;
    match &pacman {
        Some(tree) => eprintln!("Pac-Man tree: {tree}"),
        None => eprintln!("Pac-Man tree: <random>"),
    }

    let cache = MapCache::new();
    let map = setup.map_source();
    let mut scores = Vec::with_capacity(*games);
    for game in 0..*games {
        // one seed per game, so a seeded evaluation is reproducible as a whole
        let game_config = GameConfig {
            seed: config.game.seed.map(|seed| seed.wrapping_add(game as u64)),
            ..config.game.clone()
        };
        let outcome = run_episode(
            pacman.as_ref(),
            ghost.as_ref(),
            &map,
            &cache,
            &game_config,
            &config.episode,
        )?;
        eprintln!(
            "  Game #{game:3}: score {:8.3} in {:4} turns",
            outcome.score, outcome.turns
        );
        scores.push(outcome.score);
    }

    let (min, mean, max) = summarize(&scores);
    eprintln!("Scores over {games} games:");
    eprintln!("  Min:  {min:.3}");
    eprintln!("  Mean: {mean:.3}");
    eprintln!("  Max:  {max:.3}");

    if output.is_some() {
        let record = EvaluationRecord {
            recorded_at: Utc::now(),
            config,
            pacman_tree: pacman.as_ref().map(ToString::to_string),
            ghost_tree: ghost.as_ref().map(ToString::to_string),
            scores,
            min,
            mean,
            max,
        };
        Output::save_json(&record, output.clone())?;
    }
    Ok(())
}

/// Minimum, mean and maximum of `scores`.
fn summarize(scores: &[f64]) -> (f64, f64, f64) {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    #[expect(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (min, mean, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let (min, mean, max) = summarize(&[3.0, 1.0, 5.0, 3.0]);
        assert_eq!(min, 1.0);
        assert_eq!(mean, 3.0);
        assert_eq!(max, 5.0);
    }
}
