//! Local spatial heteroscedasticity.
//!
//! lisa losh --values data.tsv --column price --gal units.gal --inference chi-square --output losh.tsv

use anyhow::Result;
use clap::Args;
use tracing::info;

use lisa_core::{losh, LoshConfig, LoshInference};

use super::common::{report, OutputArgs, ValuesArgs, WeightsArgs};

#[derive(Args)]
pub struct LoshArgs {
    #[command(flatten)]
    values: ValuesArgs,

    /// Continuous value column
    #[arg(long)]
    column: String,

    #[command(flatten)]
    weights: WeightsArgs,

    /// Residual exponent
    #[arg(long, default_value = "2")]
    exponent: f64,

    /// Inference mode: none or chi-square
    #[arg(long, default_value = "none")]
    inference: LoshInference,

    #[command(flatten)]
    output: OutputArgs,
}

pub fn run(args: LoshArgs) -> Result<()> {
    info!("=== LOSH ===");
    let graph = args.weights.load()?;
    let table = args.values.load(std::slice::from_ref(&args.column), &graph)?;

    let config = LoshConfig {
        exponent: args.exponent,
        inference: args.inference,
    };
    let fit = losh(&graph, &table.values[0], &config)?;

    report(&fit, 0.05);
    args.output.write(&graph, &fit)
}
