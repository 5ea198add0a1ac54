//! lisa-io: File formats for LISA-RS
//!
//! Reads spatial weights (GAL contiguity files, MatrixMarket weight
//! matrices), delimited value tables keyed by unit id, and writes
//! per-unit results as TSV or JSON.

pub mod gal;
pub mod mtx;
pub mod results;
pub mod table;

pub use gal::{read_gal, write_gal};
pub use mtx::{read_weights_mtx, write_weights_mtx};
pub use results::{write_local_json, write_local_results};
pub use table::{read_value_table, ValueTable};
