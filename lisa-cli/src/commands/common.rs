//! Arguments and helpers shared by every subcommand.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use lisa_core::{CrandConfig, LocalFit, Parallelism};
use lisa_io::{
    read_gal, read_value_table, read_weights_mtx, write_local_json, write_local_results,
    ValueTable,
};
use lisa_weights::{lattice, Contiguity, WeightsGraph};

/// Where the neighbor graph comes from. Exactly one source is required.
#[derive(Args)]
pub struct WeightsArgs {
    /// GAL contiguity file
    #[arg(long)]
    gal: Option<PathBuf>,

    /// MatrixMarket weight matrix (requires --mtx-ids)
    #[arg(long, requires = "mtx_ids")]
    mtx: Option<PathBuf>,

    /// Unit ids for --mtx, one per line in row order
    #[arg(long)]
    mtx_ids: Option<PathBuf>,

    /// Regular lattice ROWSxCOLS; units are numbered 0..n row-major
    #[arg(long, value_name = "RxC")]
    lattice: Option<String>,

    /// Use queen instead of rook contiguity for --lattice
    #[arg(long)]
    queen: bool,
}

impl WeightsArgs {
    pub fn load(&self) -> Result<WeightsGraph> {
        let sources =
            self.gal.is_some() as u8 + self.mtx.is_some() as u8 + self.lattice.is_some() as u8;
        if sources != 1 {
            bail!("Specify exactly one of --gal, --mtx or --lattice");
        }

        let graph = if let Some(path) = &self.gal {
            read_gal(path)?
        } else if let (Some(mtx), Some(ids)) = (&self.mtx, &self.mtx_ids) {
            read_weights_mtx(mtx, ids)?
        } else if let Some(shape) = &self.lattice {
            let (rows, cols) = parse_lattice(shape)?;
            let contiguity = if self.queen {
                Contiguity::Queen
            } else {
                Contiguity::Rook
            };
            lattice(rows, cols, contiguity)?
        } else {
            bail!("--mtx requires --mtx-ids");
        };

        info!(
            "Weights: {} units, {} edges, max cardinality {}",
            graph.n(),
            graph.n_edges(),
            graph.max_cardinality()
        );
        let islands = graph.islands();
        if !islands.is_empty() {
            warn!("{} unit(s) have no neighbors", islands.len());
        }
        Ok(graph)
    }
}

/// Parse `ROWSxCOLS`, e.g. `10x12`.
pub fn parse_lattice(shape: &str) -> Result<(usize, usize)> {
    let (r, c) = shape
        .split_once(|ch: char| ch == 'x' || ch == 'X')
        .with_context(|| format!("Lattice '{}' is not of the form ROWSxCOLS", shape))?;
    let rows = r
        .trim()
        .parse()
        .with_context(|| format!("Invalid lattice row count '{}'", r))?;
    let cols = c
        .trim()
        .parse()
        .with_context(|| format!("Invalid lattice column count '{}'", c))?;
    Ok((rows, cols))
}

/// Value table input.
#[derive(Args)]
pub struct ValuesArgs {
    /// Value table with a header line (tab, comma or whitespace delimited)
    #[arg(long)]
    values: PathBuf,

    /// Name of the unit id column
    #[arg(long, default_value = "id")]
    id_col: String,
}

impl ValuesArgs {
    /// Read `columns` and align the rows to the graph's id order.
    pub fn load(&self, columns: &[String], graph: &WeightsGraph) -> Result<ValueTable> {
        let table = read_value_table(&self.values, &self.id_col, columns)?;
        info!(
            "Read {} rows, columns {:?} from {}",
            table.n_rows(),
            columns,
            self.values.display()
        );
        table.align_to(graph.id_order())
    }
}

/// Conditional randomization options.
#[derive(Args)]
pub struct RandomizationArgs {
    /// Number of conditional permutations per unit (0 disables inference)
    #[arg(long, default_value = "999")]
    permutations: usize,

    /// Random seed; drawn from OS entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Include the simulated null distribution in --json output
    #[arg(long)]
    keep_simulations: bool,
}

impl RandomizationArgs {
    pub fn config(&self, parallelism: Parallelism) -> CrandConfig {
        CrandConfig {
            permutations: self.permutations,
            seed: self.seed,
            parallelism,
            keep_simulations: self.keep_simulations,
        }
    }
}

/// Output destinations.
#[derive(Args)]
pub struct OutputArgs {
    /// Tab-separated per-unit results
    #[arg(long)]
    output: PathBuf,

    /// Also write the full result as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl OutputArgs {
    pub fn write(&self, graph: &WeightsGraph, fit: &LocalFit) -> Result<()> {
        write_local_results(&self.output, graph.id_order(), fit)?;
        if let Some(path) = &self.json {
            write_local_json(path, graph.id_order(), fit)?;
        }
        Ok(())
    }
}

/// Log a one-line summary of a fitted statistic.
pub fn report(fit: &LocalFit, alpha: f64) {
    if let Some(seed) = fit.seed {
        info!("Randomization seed: {}", seed);
    }
    let p = fit
        .p_sim
        .as_ref()
        .or_else(|| fit.losh.as_ref().and_then(|d| d.p_chi2.as_ref()));
    match p {
        Some(p) => {
            let defined = p.iter().filter(|v| !v.is_nan()).count();
            let significant = p.iter().filter(|&&v| v < alpha).count();
            info!(
                "{}: {} units, {} with defined p-values, {} below {}",
                fit.statistic.name(),
                fit.n(),
                defined,
                significant,
                alpha
            );
        }
        None => info!("{}: {} units, no inference", fit.statistic.name(), fit.n()),
    }
}
