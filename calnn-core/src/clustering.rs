//! Clustering configuration and statistics.

use crate::error::{Error, Result};
use crate::neighbors::NeighborWindow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for nearest-neighbor clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NnConfig {
    /// A cluster is kept only if its summed value is strictly above this.
    pub min_value: f64,
    /// Neighbor search window.
    pub window: NeighborWindow,
}

impl Default for NnConfig {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            window: NeighborWindow::default(),
        }
    }
}

impl NnConfig {
    /// Creates a new clustering configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum cluster value.
    #[must_use]
    pub fn with_min_value(mut self, min_value: f64) -> Self {
        self.min_value = min_value;
        self
    }

    /// Sets the neighbor search window.
    #[must_use]
    pub fn with_window(mut self, window: NeighborWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the window reach along each axis.
    #[must_use]
    pub fn with_deltas(self, delta_layer: u32, delta_u: u32, delta_v: u32) -> Self {
        self.with_window(NeighborWindow::new(delta_layer, delta_u, delta_v))
    }

    /// Checks that the configuration describes a meaningful pass.
    ///
    /// Any finite threshold is accepted, including zero and negative values
    /// (which keep every cluster).
    pub fn validate(&self) -> Result<()> {
        if !self.min_value.is_finite() {
            return Err(Error::InvalidMinValue(self.min_value));
        }
        Ok(())
    }
}

/// Statistics from one clustering invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteringStatistics {
    /// Number of hits handed to the clusterer.
    pub hits_processed: usize,
    /// Clusters above threshold, returned to the caller.
    pub clusters_found: usize,
    /// Clusters at or below threshold, discarded.
    pub clusters_rejected: usize,
    /// Hits still present in the caller's map afterwards.
    pub hits_remaining: usize,
}

impl ClusteringStatistics {
    /// Number of hits consumed by accepted clusters.
    #[must_use]
    pub fn hits_clustered(&self) -> usize {
        self.hits_processed.saturating_sub(self.hits_remaining)
    }
}
