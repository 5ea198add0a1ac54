//! Weight matrices in MatrixMarket coordinate format.
//!
//! Two files describe a weighted graph:
//! - `.mtx`: `%%MatrixMarket matrix coordinate real general`, then
//!   `nrows ncols nnz` and one 1-indexed `row col weight` entry per edge
//! - ids file: unit ids, one per line, in row order

use std::path::Path;

use anyhow::{bail, Context, Result};
use sprs::TriMatI;
use tracing::info;

use lisa_weights::WeightsGraph;

/// Read a weighted graph from a MatrixMarket file and its id list.
///
/// Files declared `symmetric` store one triangle; the mirror entries are
/// added on read.
pub fn read_weights_mtx(mtx_path: &Path, ids_path: &Path) -> Result<WeightsGraph> {
    let ids: Vec<String> = std::fs::read_to_string(ids_path)
        .with_context(|| format!("Failed to read unit ids: {}", ids_path.display()))?
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    let n = ids.len();

    let contents = std::fs::read_to_string(mtx_path)
        .with_context(|| format!("Failed to read weight matrix: {}", mtx_path.display()))?;

    let mut symmetric = false;
    let mut dims: Option<(usize, usize)> = None;
    let mut tri = TriMatI::<f64, usize>::new((n, n));

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.starts_with("%%") {
            symmetric = line.to_ascii_lowercase().contains("symmetric");
            continue;
        }
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if dims.is_none() {
            if fields.len() < 2 {
                bail!("Line {}: expected 'nrows ncols nnz'", line_num + 1);
            }
            let (rows, cols) = (fields[0].parse::<usize>()?, fields[1].parse::<usize>()?);
            if rows != n || cols != n {
                bail!(
                    "Matrix is {}x{} but {} unit ids were given",
                    rows,
                    cols,
                    n
                );
            }
            dims = Some((rows, cols));
            continue;
        }
        if fields.len() < 3 {
            bail!("Line {}: expected 'row col weight'", line_num + 1);
        }
        let row = fields[0].parse::<usize>()?;
        let col = fields[1].parse::<usize>()?;
        if row == 0 || col == 0 || row > n || col > n {
            bail!("Line {}: entry ({}, {}) out of range", line_num + 1, row, col);
        }
        let val: f64 = fields[2].parse()?;
        tri.add_triplet(row - 1, col - 1, val);
        if symmetric && row != col {
            tri.add_triplet(col - 1, row - 1, val);
        }
    }

    if dims.is_none() {
        bail!("Missing size line in {}", mtx_path.display());
    }

    let graph = WeightsGraph::from_sparse(&tri.to_csr(), ids)?;
    info!(
        "Read weight matrix: {} units, {} edges",
        graph.n(),
        graph.n_edges()
    );
    Ok(graph)
}

/// Write the graph's current weights as a general MatrixMarket file plus ids.
pub fn write_weights_mtx(graph: &WeightsGraph, mtx_path: &Path, ids_path: &Path) -> Result<()> {
    use std::io::Write;

    let mut f = std::fs::File::create(ids_path)
        .with_context(|| format!("Failed to create id file: {}", ids_path.display()))?;
    for id in graph.id_order() {
        writeln!(f, "{}", id)?;
    }

    let f = std::fs::File::create(mtx_path)
        .with_context(|| format!("Failed to create weight matrix: {}", mtx_path.display()))?;
    let mut w = std::io::BufWriter::new(f);
    writeln!(w, "%%MatrixMarket matrix coordinate real general")?;
    writeln!(w, "{} {} {}", graph.n(), graph.n(), graph.n_edges())?;
    for edge in graph.edges() {
        writeln!(w, "{} {} {}", edge.focal + 1, edge.neighbor + 1, edge.weight)?;
    }
    w.flush()?;
    Ok(())
}
