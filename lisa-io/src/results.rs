//! Per-unit result writers.
//!
//! The TSV layout is one row per unit in graph id order:
//!
//! ```text
//! id  statistic  [p_sim]  [var_hi  p_chi2]
//! ```
//!
//! `p_sim` appears when randomization ran; `var_hi` appears for LOSH and
//! `p_chi2` when chi-square inference was requested. Undefined values are
//! written as `NA`.

use std::io::Write;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use tracing::info;

use lisa_core::LocalFit;

/// Write a fit as tab-separated values.
pub fn write_local_results(path: &Path, ids: &[String], fit: &LocalFit) -> Result<()> {
    ensure!(
        ids.len() == fit.n(),
        "Got {} ids for {} results",
        ids.len(),
        fit.n()
    );

    let mut columns: Vec<(&str, &[f64])> = vec![("statistic", fit.values.as_slice())];
    if let Some(p) = &fit.p_sim {
        columns.push(("p_sim", p.as_slice()));
    }
    if let Some(details) = &fit.losh {
        columns.push(("var_hi", details.var_hi.as_slice()));
        if let Some(p) = &details.p_chi2 {
            columns.push(("p_chi2", p.as_slice()));
        }
    }

    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut w = std::io::BufWriter::new(f);

    write!(w, "id")?;
    for (name, _) in &columns {
        write!(w, "\t{}", name)?;
    }
    writeln!(w)?;
    for (i, id) in ids.iter().enumerate() {
        write!(w, "{}", id)?;
        for (_, col) in &columns {
            write!(w, "\t{}", format_value(col[i]))?;
        }
        writeln!(w)?;
    }
    w.flush()?;

    info!(
        "Wrote {} results ({}) to {}",
        ids.len(),
        fit.statistic.name(),
        path.display()
    );
    Ok(())
}

/// Write a fit, ids included, as pretty-printed JSON. NaN becomes `null`.
pub fn write_local_json(path: &Path, ids: &[String], fit: &LocalFit) -> Result<()> {
    ensure!(
        ids.len() == fit.n(),
        "Got {} ids for {} results",
        ids.len(),
        fit.n()
    );
    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut w = std::io::BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &serde_json::json!({ "ids": ids, "fit": fit }))?;
    writeln!(w)?;
    w.flush()?;
    info!("Wrote JSON results to {}", path.display());
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else {
        format!("{}", v)
    }
}
