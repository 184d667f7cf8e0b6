//! calnn-core: Core traits and types for calorimeter hit clustering.
//!
//! This crate provides the foundational abstractions shared by the
//! clustering algorithms: hit records, cell ids, neighbor lookup, and
//! clustering configuration.
//!

pub mod clustering;
pub mod error;
pub mod hit;
pub mod neighbors;

pub use clustering::{ClusteringStatistics, NnConfig};
pub use error::{Error, Result};
pub use hit::{hit_map, CalHit, CellId, Hit, HitMap};
pub use neighbors::{GridIndex, GridNeighbors, LinearNeighbors, NeighborProvider, NeighborWindow};
