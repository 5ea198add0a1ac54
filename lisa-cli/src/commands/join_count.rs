//! Local join counts.
//!
//! lisa join-count --values data.tsv --columns x --lattice 10x10 --output jc.tsv
//! lisa join-count --values data.tsv --columns x,z --case CLC --gal units.gal --output bv.tsv
//!
//! One column runs the univariate count; two columns with --case run the
//! bivariate count; otherwise the columns are combined as a multivariate
//! co-location count.

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use lisa_core::{
    local_join_count, local_join_count_bv, local_join_count_mv, JoinCase, Parallelism,
};

use super::common::{report, OutputArgs, RandomizationArgs, ValuesArgs, WeightsArgs};

#[derive(Args)]
pub struct JoinCountArgs {
    #[command(flatten)]
    values: ValuesArgs,

    /// Binary (0/1) value column(s), comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    /// Bivariate join pattern: BJC or CLC (two columns only)
    #[arg(long)]
    case: Option<JoinCase>,

    #[command(flatten)]
    weights: WeightsArgs,

    #[command(flatten)]
    randomization: RandomizationArgs,

    #[command(flatten)]
    output: OutputArgs,
}

pub fn run(args: JoinCountArgs, parallelism: Parallelism) -> Result<()> {
    info!("=== Local Join Count ===");
    if args.case.is_some() && args.columns.len() != 2 {
        bail!(
            "--case applies to exactly two columns, got {}",
            args.columns.len()
        );
    }

    let graph = args.weights.load()?;
    let table = args.values.load(&args.columns, &graph)?;
    let config = args.randomization.config(parallelism);

    let layers = table.layers();
    let fit = match (layers.as_slice(), args.case) {
        ([y], _) => local_join_count(&graph, y, &config)?,
        ([x, z], Some(case)) => local_join_count_bv(&graph, x, z, case, &config)?,
        _ => local_join_count_mv(&graph, &layers, &config)?,
    };

    report(&fit, 0.05);
    args.output.write(&graph, &fit)
}
