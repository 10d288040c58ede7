use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use gpac_engine::MapSource;
use gpac_evaluator::expr_tree::ExprNode;
use gpac_training::tree_generator::GenerationMethod;
use log::LevelFilter;
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use crate::{schema::run_config::RunConfig, util};

use self::{evaluate::EvaluateArg, generate_tree::GenerateTreeArg, play::PlayArg};

mod evaluate;
mod generate_tree;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: info, -vv: debug); `RUST_LOG` overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play one episode and save its record
    Play(#[clap(flatten)] PlayArg),
    /// Generate a random strategy tree and print it
    GenerateTree(#[clap(flatten)] GenerateTreeArg),
    /// Play several episodes with one strategy and report its scores
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logger(args.verbose);
    match &args.mode {
        Mode::Play(arg) => play::run(arg)?,
        Mode::GenerateTree(arg) => generate_tree::run(arg)?,
        Mode::Evaluate(arg) => evaluate::run(arg)?,
    }
    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Options shared by every command: configuration file and its overrides.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SetupArg {
    /// Run configuration file with optional `game`, `episode` and `tree` sections
    #[arg(long)]
    config: Option<PathBuf>,
    /// Map file path or inline map text (default: built-in cross map)
    #[arg(long)]
    map: Option<String>,
    /// Seed for tree generation and the game
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum depth of generated trees
    #[arg(long, visible_alias = "max-depth")]
    tree_depth: Option<usize>,
    /// Tree generation method (full or grow)
    #[arg(long)]
    method: Option<GenerationMethod>,
}

impl SetupArg {
    /// Loads the configuration file, if any, and applies command-line overrides.
    pub(crate) fn load_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_run_config_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
        }
        if let Some(depth) = self.tree_depth {
            config.tree.max_depth = depth;
        }
        if let Some(method) = self.method {
            config.tree.method = method;
        }
        Ok(config)
    }

    pub(crate) fn map_source(&self) -> MapSource {
        self.map
            .as_deref()
            .map_or(MapSource::Default, MapSource::from_arg)
    }
}

/// Added to the game seed to derive the tree generation seed, keeping trees apart from
/// the pill layout drawn from the game seed itself.
const TREE_SEED_OFFSET: u64 = 0x6a09_e667_f3bc_c909;

/// RNG for tree generation, derived from the game seed when there is one.
pub(crate) fn tree_rng(config: &RunConfig) -> Pcg64Mcg {
    match config.game.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed.wrapping_add(TREE_SEED_OFFSET)),
        None => Pcg64Mcg::from_os_rng(),
    }
}

/// Generates the strategy trees requested on the command line.
pub(crate) fn generate_trees(
    config: &RunConfig,
    random_pacman: bool,
    ghost_tree: bool,
) -> anyhow::Result<(Option<ExprNode>, Option<ExprNode>)> {
    let mut rng = tree_rng(config);
    let pacman = if random_pacman {
        None
    } else {
        Some(config.tree.generate(&mut rng)?)
    };
    let ghost = if ghost_tree {
        Some(config.tree.generate(&mut rng)?)
    } else {
        None
    };
    Ok((pacman, ghost))
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};

    use super::*;

    #[test]
    fn test_tree_rng_separate_from_game_seed() {
        let mut config = RunConfig::default();
        config.game.seed = Some(7);
        let tree_draw = tree_rng(&config).random::<u64>();
        assert_ne!(tree_draw, Pcg64Mcg::seed_from_u64(7).random::<u64>());
        assert_eq!(tree_draw, tree_rng(&config).random::<u64>());
    }

    #[test]
    fn test_seed_and_method_override_config() {
        let setup = SetupArg {
            seed: Some(3),
            tree_depth: Some(5),
            method: Some(GenerationMethod::Full),
            ..SetupArg::default()
        };
        let config = setup.load_config().unwrap();
        assert_eq!(config.game.seed, Some(3));
        assert_eq!(config.tree.max_depth, 5);
        assert_eq!(config.tree.method, GenerationMethod::Full);
    }
}
