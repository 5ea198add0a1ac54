//! Local Geary.
//!
//! lisa geary --values data.tsv --columns income --gal tracts.gal --output geary.tsv
//!
//! Several columns run the multivariate form.

use anyhow::Result;
use clap::Args;
use tracing::info;

use lisa_core::{local_geary, local_geary_mv, Parallelism};

use super::common::{report, OutputArgs, RandomizationArgs, ValuesArgs, WeightsArgs};

#[derive(Args)]
pub struct GearyArgs {
    #[command(flatten)]
    values: ValuesArgs,

    /// Continuous value column(s), comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    #[command(flatten)]
    weights: WeightsArgs,

    #[command(flatten)]
    randomization: RandomizationArgs,

    #[command(flatten)]
    output: OutputArgs,
}

pub fn run(args: GearyArgs, parallelism: Parallelism) -> Result<()> {
    info!("=== Local Geary ===");
    let graph = args.weights.load()?;
    let table = args.values.load(&args.columns, &graph)?;
    let config = args.randomization.config(parallelism);

    let layers = table.layers();
    let fit = match layers.as_slice() {
        [x] => local_geary(&graph, x, &config)?,
        _ => local_geary_mv(&graph, &layers, &config)?,
    };

    report(&fit, 0.05);
    args.output.write(&graph, &fit)
}
