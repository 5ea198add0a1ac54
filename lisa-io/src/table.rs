//! Delimited value tables keyed by unit id.
//!
//! The first line is a header; the delimiter is detected from it (tab,
//! then comma, otherwise runs of whitespace). Missing values (`NA`, `.`,
//! empty, ...) parse to NaN and are rejected when the table is aligned to
//! a weights graph.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Selected value columns for every row of a table.
#[derive(Debug, Clone)]
pub struct ValueTable {
    /// Unit ids in row order.
    pub ids: Vec<String>,
    /// Column names, in the order requested.
    pub columns: Vec<String>,
    /// `values[c][i]` = column c, row i (NaN for missing).
    pub values: Vec<Vec<f64>>,
}

#[derive(Clone, Copy)]
enum Delimiter {
    Char(char),
    Whitespace,
}

impl Delimiter {
    fn detect(header: &str) -> Self {
        if header.contains('\t') {
            Delimiter::Char('\t')
        } else if header.contains(',') {
            Delimiter::Char(',')
        } else {
            Delimiter::Whitespace
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        match self {
            Delimiter::Char(c) => line.split(c).map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Parse a value table, keeping the id column and the named value columns.
pub fn read_value_table(path: &Path, id_col: &str, columns: &[String]) -> Result<ValueTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read value table: {}", path.display()))?;
    parse_table(&contents, id_col, columns)
        .with_context(|| format!("Malformed value table: {}", path.display()))
}

fn parse_table(contents: &str, id_col: &str, columns: &[String]) -> Result<ValueTable> {
    let mut lines = contents.lines();
    let header_line = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty value table"))?;
    let delim = Delimiter::detect(header_line);
    let headers = delim.split(header_line.trim());

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|&h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in header", name))
    };
    let id_idx = column_index(id_col)?;
    let value_indices = columns
        .iter()
        .map(|name| column_index(name.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let width = value_indices.iter().copied().fold(id_idx, usize::max) + 1;

    let mut ids = Vec::new();
    let mut values = vec![Vec::new(); columns.len()];
    for (line_num, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = delim.split(line);
        if fields.len() < width {
            bail!(
                "Line {} has too few fields (expected at least {})",
                line_num + 2,
                width
            );
        }
        ids.push(fields[id_idx].to_string());
        for (col, &idx) in values.iter_mut().zip(&value_indices) {
            col.push(parse_value(fields[idx]));
        }
    }

    Ok(ValueTable {
        ids,
        columns: columns.to_vec(),
        values,
    })
}

/// Parse a string value to f64, treating NA/missing as NaN.
fn parse_value(s: &str) -> f64 {
    match s {
        "NA" | "na" | "Na" | "." | "" | "-" | "NaN" | "nan" => f64::NAN,
        _ => s.parse().unwrap_or(f64::NAN),
    }
}

impl ValueTable {
    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Borrow every column as a layer, in requested order.
    pub fn layers(&self) -> Vec<&[f64]> {
        self.values.iter().map(Vec::as_slice).collect()
    }

    /// Reorder rows to follow `id_order`.
    ///
    /// Every id must appear exactly once in the table, and every selected
    /// value must be present. Rows for ids outside `id_order` are dropped.
    pub fn align_to(&self, id_order: &[String]) -> Result<ValueTable> {
        let mut row_of: HashMap<&str, usize> = HashMap::with_capacity(self.ids.len());
        for (i, id) in self.ids.iter().enumerate() {
            if row_of.insert(id.as_str(), i).is_some() {
                bail!("Duplicate unit id '{}' in value table", id);
            }
        }

        let rows = id_order
            .iter()
            .map(|id| {
                row_of
                    .get(id.as_str())
                    .copied()
                    .ok_or_else(|| anyhow::anyhow!("Unit '{}' has no row in value table", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut values = Vec::with_capacity(self.values.len());
        for (name, col) in self.columns.iter().zip(&self.values) {
            let aligned: Vec<f64> = rows.iter().map(|&r| col[r]).collect();
            if let Some(pos) = aligned.iter().position(|v| v.is_nan()) {
                bail!("Missing value in column '{}' for unit '{}'", name, id_order[pos]);
            }
            values.push(aligned);
        }

        Ok(ValueTable {
            ids: id_order.to_vec(),
            columns: self.columns.clone(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("1.5"), 1.5);
        assert_eq!(parse_value("0"), 0.0);
        assert!(parse_value("NA").is_nan());
        assert!(parse_value(".").is_nan());
        assert!(parse_value("").is_nan());
    }

    #[test]
    fn test_read_value_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.tsv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "id\tincome\tcrime\tzone").unwrap();
        writeln!(f, "a\t10.5\t1\tN").unwrap();
        writeln!(f, "b\t12\t0\tS").unwrap();
        writeln!(f, "c\tNA\t1\tS").unwrap();

        let table = read_value_table(&path, "id", &cols(&["crime", "income"])).unwrap();
        assert_eq!(table.ids, vec!["a", "b", "c"]);
        assert_eq!(table.column("crime").unwrap(), &[1.0, 0.0, 1.0]);
        let income = table.column("income").unwrap();
        assert_eq!(income[0], 10.5);
        assert!(income[2].is_nan());
        assert_eq!(table.layers().len(), 2);
    }

    #[test]
    fn test_csv_and_missing_column() {
        let table = parse_table("id,x\n1,3\n2,4\n", "id", &cols(&["x"])).unwrap();
        assert_eq!(table.column("x").unwrap(), &[3.0, 4.0]);
        let err = parse_table("id,x\n1,3\n", "id", &cols(&["y"])).unwrap_err();
        assert!(err.to_string().contains("Column 'y' not found"));
    }

    #[test]
    fn test_align_to_graph_order() {
        let table = parse_table("id x\nb 2\na 1\nz 9\n", "id", &cols(&["x"])).unwrap();
        let aligned = table.align_to(&cols(&["a", "b"])).unwrap();
        assert_eq!(aligned.ids, vec!["a", "b"]);
        assert_eq!(aligned.values[0], vec![1.0, 2.0]);
    }

    #[test]
    fn test_align_rejects_missing_rows_and_values() {
        let table = parse_table("id x\na 1\nb NA\n", "id", &cols(&["x"])).unwrap();
        assert!(table.align_to(&cols(&["a", "c"])).is_err());
        let err = table.align_to(&cols(&["a", "b"])).unwrap_err();
        assert!(err.to_string().contains("unit 'b'"));
    }

    #[test]
    fn test_align_rejects_duplicate_ids() {
        let table = parse_table("id x\na 1\na 2\n", "id", &cols(&["x"])).unwrap();
        assert!(table.align_to(&cols(&["a"])).is_err());
    }
}
