use crate::command::{SetupArg, tree_rng};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GenerateTreeArg {
    #[clap(flatten)]
    setup: SetupArg,
    /// Number of trees to generate
    #[arg(long, default_value_t = 1)]
    count: usize,
}

pub(crate) fn run(arg: &GenerateTreeArg) -> anyhow::Result<()> {
    let GenerateTreeArg { setup, count } = arg;
    let config = setup.load_config()?;
    let mut rng = tree_rng(&config);

    eprintln!(
        "Generating {count} tree(s) with method {} and max depth {}",
        config.tree.method, config.tree.max_depth
    );
    for i in 0..*count {
        let tree = config.tree.generate(&mut rng)?;
        println!("{tree}");
        eprintln!(
            "  #{i}: depth {}, {} nodes, leaf depths {:?}",
            tree.depth(),
            tree.size(),
            tree.leaf_depths()
        );
    }
    Ok(())
}
