//! GAL contiguity file reader/writer.
//!
//! A GAL file starts with a header that is either a single unit count `n`
//! or the four-field form `0 n <source> <key>`. Each unit then takes two
//! lines:
//!
//! ```text
//! <id> <k>
//! <neighbor id 1> ... <neighbor id k>
//! ```
//!
//! Unit order in the file becomes the graph's id order. Weights are binary.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use lisa_weights::WeightsGraph;

/// Read a GAL file into a binary weights graph.
pub fn read_gal(path: &Path) -> Result<WeightsGraph> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read GAL file: {}", path.display()))?;
    let graph = parse_gal(&contents)
        .with_context(|| format!("Malformed GAL file: {}", path.display()))?;
    info!(
        "Read GAL weights: {} units, {} edges, {} islands",
        graph.n(),
        graph.n_edges(),
        graph.islands().len()
    );
    Ok(graph)
}

fn parse_gal(contents: &str) -> Result<WeightsGraph> {
    let mut lines = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty GAL file"))?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    let n: usize = match header_fields.as_slice() {
        [n] => n.parse()?,
        [_, n, _, _] => n.parse()?,
        _ => bail!("Unrecognized GAL header '{}'", header),
    };

    let mut ids = Vec::with_capacity(n);
    let mut neighbor_ids: Vec<Vec<String>> = Vec::with_capacity(n);
    while let Some(record) = lines.next() {
        let fields: Vec<&str> = record.split_whitespace().collect();
        let (id, k) = match fields.as_slice() {
            [id, k] => (id.to_string(), k.parse::<usize>()?),
            _ => bail!("Expected '<id> <count>' record, got '{}'", record),
        };
        let nbrs: Vec<String> = if k == 0 {
            Vec::new()
        } else {
            let line = lines
                .next()
                .ok_or_else(|| anyhow::anyhow!("Unit '{}' is missing its neighbor line", id))?;
            line.split_whitespace().map(str::to_string).collect()
        };
        if nbrs.len() != k {
            bail!(
                "Unit '{}' declares {} neighbors but lists {}",
                id,
                k,
                nbrs.len()
            );
        }
        ids.push(id);
        neighbor_ids.push(nbrs);
    }

    if ids.len() != n {
        bail!("Header declares {} units, found {}", n, ids.len());
    }

    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let neighbors = neighbor_ids
        .iter()
        .zip(&ids)
        .map(|(nbrs, id)| {
            nbrs.iter()
                .map(|j| {
                    index.get(j.as_str()).copied().ok_or_else(|| {
                        anyhow::anyhow!("Unit '{}' lists unknown neighbor '{}'", id, j)
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeightsGraph::from_binary_neighbors(ids, neighbors)?)
}

/// Write the graph's neighbor structure as a GAL file.
///
/// Weights are not stored; reading the file back yields binary weights.
pub fn write_gal(path: &Path, graph: &WeightsGraph) -> Result<()> {
    use std::io::Write;

    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create GAL file: {}", path.display()))?;
    let mut w = std::io::BufWriter::new(f);
    let ids = graph.id_order();

    writeln!(w, "{}", graph.n())?;
    for (i, id) in ids.iter().enumerate() {
        let nbrs = graph.neighbors(i);
        writeln!(w, "{} {}", id, nbrs.len())?;
        if !nbrs.is_empty() {
            let line: Vec<&str> = nbrs.iter().map(|&j| ids[j].as_str()).collect();
            writeln!(w, "{}", line.join(" "))?;
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lisa_weights::{lattice, Contiguity};
    use std::io::Write as IoWrite;

    #[test]
    fn test_read_gal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.gal");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "0 4 units POLY_ID").unwrap();
        writeln!(f, "10 2").unwrap();
        writeln!(f, "20 30").unwrap();
        writeln!(f, "20 1").unwrap();
        writeln!(f, "10").unwrap();
        writeln!(f, "30 1").unwrap();
        writeln!(f, "10").unwrap();
        writeln!(f, "40 0").unwrap();

        let g = read_gal(&path).unwrap();
        assert_eq!(g.id_order(), &["10", "20", "30", "40"]);
        assert_eq!(g.neighbors(0), &[1, 2]);
        assert_eq!(g.weights(0), &[1.0, 1.0]);
        assert_eq!(g.islands(), vec![3]);
    }

    #[test]
    fn test_gal_roundtrip_lattice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.gal");
        let g = lattice(3, 4, Contiguity::Queen).unwrap();
        write_gal(&path, &g).unwrap();
        let back = read_gal(&path).unwrap();
        assert_eq!(back.id_order(), g.id_order());
        for i in 0..g.n() {
            assert_eq!(back.neighbors(i), g.neighbors(i));
        }
    }

    #[test]
    fn test_gal_unknown_neighbor() {
        let err = parse_gal("2\na 1\nb\nb 1\nc\n").unwrap_err();
        assert!(err.to_string().contains("unknown neighbor 'c'"));
    }

    #[test]
    fn test_gal_count_mismatch() {
        assert!(parse_gal("1\na 2\nb\n").is_err());
        assert!(parse_gal("3\na 0\nb 0\n").is_err());
    }
}
