//! lisa-weights: Spatial weights graphs for LISA-RS
//!
//! Provides the neighbor graph consumed by the local statistics:
//! a flat CSR edge arena with per-unit offsets, weight transforms
//! (binary, row-standardized), lattice builders and sprs interop.

pub mod error;
pub mod graph;
pub mod lattice;
pub mod transform;

pub use error::WeightsError;
pub use graph::{Edge, WeightsGraph};
pub use lattice::{lattice, Contiguity};
pub use transform::Transform;
