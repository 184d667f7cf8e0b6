//! calnn-algorithms: Nearest-neighbor clustering of calorimeter hits.
//!
//! This crate provides:
//! - **Cells** - index arena of ring-linked cells
//! - **Clusters** - ordered accumulators for extracted rings
//! - **Nearest-neighbor clustering** - greedy local-equivalence linking
//! - **Processing** - parallel clustering of independent events
//!
#![warn(missing_docs)]

pub mod cell;
mod cluster;
mod nn;
mod processing;

pub use cell::{Cell, CellRing};
pub use cluster::NnCluster;
pub use nn::{NnClustering, NnState};
pub use processing::{cluster_event, cluster_events, EventClusters};

// Re-export core clustering types
pub use calnn_core::{ClusteringStatistics, NeighborProvider, NeighborWindow, NnConfig};
