//! Nearest-neighbor (local equivalence) clustering.
//!
//! Every hit is linked to its highest-valued neighbor, which chains hits
//! into rings of cells around local maxima. Each ring becomes one cluster;
//! clusters whose summed value does not exceed the threshold are dropped.
//!
//! Key characteristics:
//! - Single greedy linking pass over cells in descending value order
//! - O(1) ring splicing on an index arena
//! - Accepted clusters drain their hits from the caller's map

use std::collections::HashMap;
use std::fmt;

use calnn_core::{
    CellId, ClusteringStatistics, Hit, HitMap, NeighborProvider, NeighborWindow, NnConfig,
};
use log::{debug, trace};

use crate::cell::CellRing;
use crate::cluster::NnCluster;

/// Per-invocation clustering state.
#[derive(Debug, Default)]
pub struct NnState {
    hits_processed: usize,
    clusters_found: usize,
    clusters_rejected: usize,
    hits_remaining: usize,
    candidates: Vec<CellId>,
}

impl NnState {
    /// Clears the counters of the previous invocation.
    pub fn reset(&mut self) {
        self.hits_processed = 0;
        self.clusters_found = 0;
        self.clusters_rejected = 0;
        self.hits_remaining = 0;
        self.candidates.clear();
    }
}

/// Nearest-neighbor clusterer.
///
/// Hits of clusters above threshold are removed from the map passed to
/// [`NnClustering::cluster`]. Hits of rejected clusters stay in that map
/// untouched, even though they were considered by the pass; callers that
/// run several passes over the residual map will see them again.
#[derive(Debug, Clone, Default)]
pub struct NnClustering {
    config: NnConfig,
}

impl NnClustering {
    /// Create with custom configuration.
    #[must_use]
    pub fn new(config: NnConfig) -> Self {
        Self { config }
    }

    /// Create with a minimum cluster value and the default 1x1x1 window.
    #[must_use]
    pub fn with_min_value(min_value: f64) -> Self {
        Self::new(NnConfig::new().with_min_value(min_value))
    }

    /// Create with a minimum cluster value and a search window.
    #[must_use]
    pub fn with_window(min_value: f64, delta_layer: u32, delta_u: u32, delta_v: u32) -> Self {
        Self::new(
            NnConfig::new()
                .with_min_value(min_value)
                .with_deltas(delta_layer, delta_u, delta_v),
        )
    }

    /// Algorithm name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "NearestNeighbor"
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &NnConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn configure(&mut self, config: NnConfig) {
        self.config = config;
    }

    /// Set the minimum cluster value.
    pub fn set_min_value(&mut self, min_value: f64) {
        self.config.min_value = min_value;
    }

    /// Cluster `hits`, removing the hits of accepted clusters from the map.
    ///
    /// Clusters are returned in the order they were extracted.
    pub fn cluster<H, N>(&self, hits: &mut HitMap<H>, neighbors: &N) -> Vec<NnCluster<H>>
    where
        H: Hit + Clone,
        N: NeighborProvider + ?Sized,
    {
        let mut state = NnState::default();
        self.cluster_with_state(hits, neighbors, &mut state)
    }

    /// Same as [`NnClustering::cluster`], recording counters in `state`.
    pub fn cluster_with_state<H, N>(
        &self,
        hits: &mut HitMap<H>,
        neighbors: &N,
        state: &mut NnState,
    ) -> Vec<NnCluster<H>>
    where
        H: Hit + Clone,
        N: NeighborProvider + ?Sized,
    {
        state.reset();
        state.hits_processed = hits.len();

        if hits.is_empty() {
            return Vec::new();
        }

        let (mut ring, mut working) = self.build_linked(hits, neighbors, &mut state.candidates);
        let clusters = self.extract(&mut ring, &mut working, hits, state);

        state.hits_remaining = hits.len();
        debug!(
            "{}: {} hits, {} clusters kept, {} rejected, {} hits left",
            self.name(),
            state.hits_processed,
            state.clusters_found,
            state.clusters_rejected,
            state.hits_remaining
        );

        clusters
    }

    /// Build and link the cells of `hits` without extracting clusters.
    ///
    /// The returned arena shows the rings the extraction pass would walk;
    /// `hits` is left untouched.
    #[must_use]
    pub fn linked_cells<H, N>(&self, hits: &HitMap<H>, neighbors: &N) -> CellRing<H>
    where
        H: Hit + Clone,
        N: NeighborProvider + ?Sized,
    {
        let mut candidates = Vec::new();
        self.build_linked(hits, neighbors, &mut candidates).0
    }

    /// Statistics of the invocation recorded in `state`.
    #[must_use]
    pub fn statistics(&self, state: &NnState) -> ClusteringStatistics {
        ClusteringStatistics {
            hits_processed: state.hits_processed,
            clusters_found: state.clusters_found,
            clusters_rejected: state.clusters_rejected,
            hits_remaining: state.hits_remaining,
        }
    }

    /// One singleton cell per hit plus the working map `id -> slot`, then
    /// the linking pass.
    fn build_linked<H, N>(
        &self,
        hits: &HitMap<H>,
        neighbors: &N,
        candidates: &mut Vec<CellId>,
    ) -> (CellRing<H>, HashMap<CellId, usize>)
    where
        H: Hit + Clone,
        N: NeighborProvider + ?Sized,
    {
        let mut ring = CellRing::with_capacity(hits.len());
        let mut working = HashMap::with_capacity(hits.len());
        for (&id, hit) in hits {
            let slot = ring.push(id, hit.value(), hit.clone());
            working.insert(id, slot);
        }

        self.link(&mut ring, &working, neighbors, candidates);
        (ring, working)
    }

    /// Link every cell into the ring of its highest neighbor.
    ///
    /// Cells are visited from the highest value down (ties: higher id
    /// first), so a cell is still a singleton when its turn comes and every
    /// higher cell has already settled. Only a strictly greater neighbor
    /// replaces the current best.
    fn link<H, N>(
        &self,
        ring: &mut CellRing<H>,
        working: &HashMap<CellId, usize>,
        neighbors: &N,
        candidates: &mut Vec<CellId>,
    ) where
        N: NeighborProvider + ?Sized,
    {
        let window: NeighborWindow = self.config.window;
        let mut order: Vec<usize> = (0..ring.len()).collect();
        order.sort_unstable_by(|&a, &b| ring.cell(b).cmp(ring.cell(a)));

        for slot in order {
            let cell = *ring.cell(slot);
            let mut best = slot;
            let mut best_value = cell.value();

            candidates.clear();
            neighbors.neighbors(cell.id(), window, candidates);
            for id in candidates.iter() {
                let Some(&neighbor) = working.get(id) else {
                    continue;
                };
                let value = ring.cell(neighbor).value();
                if value > best_value {
                    best = neighbor;
                    best_value = value;
                }
            }

            if best != slot {
                trace!("cell {} -> cell {}", cell.id(), ring.cell(best).id());
                ring.splice_before(slot, best);
            }
        }
    }

    /// Walk every ring once, turning it into a cluster.
    fn extract<H: Hit>(
        &self,
        ring: &mut CellRing<H>,
        working: &mut HashMap<CellId, usize>,
        hits: &mut HitMap<H>,
        state: &mut NnState,
    ) -> Vec<NnCluster<H>> {
        let mut clusters = Vec::new();

        for start in 0..ring.len() {
            if working.remove(&ring.cell(start).id()).is_none() {
                continue;
            }

            let mut cluster = NnCluster::new();
            let mut slot = start;
            loop {
                let cell = *ring.cell(slot);
                let Some(hit) = ring.take_hit(slot) else {
                    break;
                };
                cluster.add(cell, hit);

                let next = cell.points_to();
                if working.remove(&ring.cell(next).id()).is_none() {
                    break;
                }
                slot = next;
            }

            if cluster.value() > self.config.min_value {
                for id in cluster.cell_ids() {
                    hits.remove(&id);
                }
                trace!(
                    "kept cluster of {} cells, value {}",
                    cluster.len(),
                    cluster.value()
                );
                state.clusters_found += 1;
                clusters.push(cluster);
            } else {
                trace!(
                    "rejected cluster of {} cells, value {}",
                    cluster.len(),
                    cluster.value()
                );
                state.clusters_rejected += 1;
            }
        }

        clusters
    }
}

impl fmt::Display for NnClustering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A nearest-neighbor clusterer with min value {}",
            self.config.min_value
        )
    }
}
