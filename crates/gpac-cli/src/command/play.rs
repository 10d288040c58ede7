use std::path::PathBuf;

use chrono::Utc;
use gpac_engine::MapCache;
use gpac_evaluator::episode::run_episode;

use crate::{command::SetupArg, schema::episode_record::EpisodeRecord, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    setup: SetupArg,
    /// Let Pac-Man play at random instead of generating a strategy tree
    #[arg(long)]
    random: bool,
    /// Also generate a strategy tree for the ghosts
    #[arg(long)]
    ghost_tree: bool,
    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        setup,
        random,
        ghost_tree,
        output,
    } = arg;
    let config = setup.load_config()?;
    let (pacman, ghost) = super::generate_trees(&config, *random, *ghost_tree)?;

    match &pacman {
        Some(tree) => eprintln!("Pac-Man tree: {tree}"),
        None => eprintln!("Pac-Man tree: <random>"),
    }
    if let Some(tree) = &ghost {
        eprintln!("Ghost tree:   {tree}");
    }

    let cache = MapCache::new();
    let outcome = run_episode(
        pacman.as_ref(),
        ghost.as_ref(),
        &setup.map_source(),
        &cache,
        &config.game,
        &config.episode,
    )?;
    eprintln!(
        "Score: {:.3} after {} turns ({} recovered actions)",
        outcome.score, outcome.turns, outcome.recovered_actions
    );

    let record = EpisodeRecord {
        recorded_at: Utc::now(),
        config,
        pacman_tree: pacman.as_ref().map(ToString::to_string),
        ghost_tree: ghost.as_ref().map(ToString::to_string),
        score: outcome.score,
        turns: outcome.turns,
        recovered_actions: outcome.recovered_actions,
        log: outcome.log,
    };
    Output::save_json(&record, output.clone())?;
    Ok(())
}
