//! High-level helpers that cluster many independent events.

use calnn_core::{ClusteringStatistics, Hit, HitMap, NeighborProvider, NnConfig, Result};
use rayon::prelude::*;

use crate::cluster::NnCluster;
use crate::nn::{NnClustering, NnState};

/// Clusters found in one event.
#[derive(Debug, Clone)]
pub struct EventClusters<H> {
    /// Accepted clusters in extraction order.
    pub clusters: Vec<NnCluster<H>>,
    /// Counters of the pass.
    pub statistics: ClusteringStatistics,
}

/// Validate `config`, then cluster a single event.
pub fn cluster_event<H, N>(
    hits: &mut HitMap<H>,
    neighbors: &N,
    config: &NnConfig,
) -> Result<EventClusters<H>>
where
    H: Hit + Clone,
    N: NeighborProvider + ?Sized,
{
    config.validate()?;
    let algo = NnClustering::new(*config);
    Ok(run(&algo, hits, neighbors))
}

/// Validate `config`, then cluster every event in parallel.
///
/// Each event is still clustered by one single-threaded pass; results keep
/// the order of `events`.
pub fn cluster_events<H, N>(
    events: &mut [HitMap<H>],
    neighbors: &N,
    config: &NnConfig,
) -> Result<Vec<EventClusters<H>>>
where
    H: Hit + Clone,
    N: NeighborProvider + ?Sized,
{
    config.validate()?;
    let algo = NnClustering::new(*config);
    Ok(events
        .par_iter_mut()
        .map(|hits| run(&algo, hits, neighbors))
        .collect())
}

fn run<H, N>(algo: &NnClustering, hits: &mut HitMap<H>, neighbors: &N) -> EventClusters<H>
where
    H: Hit + Clone,
    N: NeighborProvider + ?Sized,
{
    let mut state = NnState::default();
    let clusters = algo.cluster_with_state(hits, neighbors, &mut state);
    EventClusters {
        clusters,
        statistics: algo.statistics(&state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calnn_core::{hit_map, CalHit, Error, LinearNeighbors};

    #[test]
    fn test_cluster_event_rejects_bad_config() {
        let mut hits = hit_map([CalHit::new(0, 1.0)]);
        let config = NnConfig::new().with_min_value(f64::NAN);
        let result = cluster_event(&mut hits, &LinearNeighbors, &config);

        assert!(matches!(result, Err(Error::InvalidMinValue(_))));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_cluster_events_keeps_order() {
        let mut events = vec![
            hit_map([CalHit::new(0, 1.0), CalHit::new(1, 2.0)]),
            HitMap::new(),
            hit_map([CalHit::new(0, 1.0), CalHit::new(5, 2.0)]),
        ];
        let config = NnConfig::new().with_min_value(0.5);
        let results = cluster_events(&mut events, &LinearNeighbors, &config).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].clusters.len(), 1);
        assert!(results[1].clusters.is_empty());
        assert_eq!(results[2].clusters.len(), 2);
        assert_eq!(results[2].statistics.hits_processed, 2);
        assert!(events.iter().all(|hits| hits.is_empty()));
    }
}
