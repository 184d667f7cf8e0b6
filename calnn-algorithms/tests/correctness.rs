use std::collections::BTreeSet;

use approx::assert_relative_eq;
use calnn_algorithms::{cluster_events, NnCluster, NnClustering, NnConfig};
use calnn_core::{hit_map, CalHit, CellId, HitMap, LinearNeighbors};

const MIN_VALUE: f64 = 0.15;

/// Strip of ten cells with rising energies 0.1, 1.1, ..., 9.1.
fn rising_strip() -> HitMap<CalHit> {
    hit_map((0..10u32).map(|i| CalHit::new(CellId::from(i), f64::from(i) + 0.1)))
}

/// Strip with gaps at 1 and 8.
fn gapped_strip() -> HitMap<CalHit> {
    let ids = [0, 2, 3, 4, 5, 6, 7, 9];
    let values = [0.1, 0.1, 0.3, 0.1, 0.4, 0.2, 0.1, 0.5];
    hit_map(
        ids.iter()
            .zip(values)
            .map(|(&id, value)| CalHit::new(id, value).with_raw_energy(0.1).with_time(137.0)),
    )
}

fn sorted_by_value(mut clusters: Vec<NnCluster<CalHit>>) -> Vec<NnCluster<CalHit>> {
    clusters.sort_by(|a, b| b.cmp_by_value(a));
    clusters
}

fn membership(clusters: &[NnCluster<CalHit>]) -> BTreeSet<Vec<CellId>> {
    clusters
        .iter()
        .map(|cluster| {
            let mut ids: Vec<CellId> = cluster.cell_ids().collect();
            ids.sort_unstable();
            ids
        })
        .collect()
}

#[test]
fn test_chain_collapses_into_one_cluster() {
    let mut hits = rising_strip();
    let algo = NnClustering::with_min_value(MIN_VALUE);
    let clusters = algo.cluster(&mut hits, &LinearNeighbors);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 10);
    assert_eq!(clusters[0].highest().map(|cell| cell.id()), Some(9));
    assert_relative_eq!(clusters[0].value(), 46.0, epsilon = 1e-9);
    assert!(hits.is_empty());
}

#[test]
fn test_threshold_rejection_leaves_residual_hit() {
    let mut hits = gapped_strip();
    let algo = NnClustering::with_min_value(MIN_VALUE);
    let clusters = sorted_by_value(algo.cluster(&mut hits, &LinearNeighbors));

    assert_eq!(clusters.len(), 3);
    assert_relative_eq!(clusters[0].value(), 0.8, epsilon = 1e-9);
    assert_relative_eq!(clusters[1].value(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(clusters[2].value(), 0.4, epsilon = 1e-9);

    assert_eq!(hits.len(), 1);
    assert!(hits.contains_key(&0));
}

#[test]
fn test_wider_window_merges_clusters() {
    let mut hits = gapped_strip();
    let algo = NnClustering::with_window(MIN_VALUE, 2, 2, 2);
    let clusters = sorted_by_value(algo.cluster(&mut hits, &LinearNeighbors));

    assert_eq!(clusters.len(), 2);
    assert_relative_eq!(clusters[0].value(), 1.1, epsilon = 1e-9);
    assert_relative_eq!(clusters[1].value(), 0.6, epsilon = 1e-9);
    assert_eq!(hits.len(), 1);

    let expected: BTreeSet<Vec<CellId>> = [vec![2, 3, 4, 5, 6], vec![7, 9]].into_iter().collect();
    assert_eq!(membership(&clusters), expected);
}

#[test]
fn test_wider_window_never_adds_clusters() {
    let narrow = NnClustering::with_min_value(0.0).cluster(&mut gapped_strip(), &LinearNeighbors);
    let wide = NnClustering::with_window(0.0, 2, 2, 2).cluster(&mut gapped_strip(), &LinearNeighbors);
    assert!(wide.len() <= narrow.len());
}

#[test]
fn test_empty_map_is_a_no_op() {
    let mut hits: HitMap<CalHit> = HitMap::new();
    let clusters = NnClustering::with_min_value(MIN_VALUE).cluster(&mut hits, &LinearNeighbors);

    assert!(clusters.is_empty());
    assert!(hits.is_empty());
}

#[test]
fn test_repeated_runs_give_identical_membership() {
    let algo = NnClustering::with_min_value(MIN_VALUE);
    let first = membership(&algo.cluster(&mut gapped_strip(), &LinearNeighbors));
    for _ in 0..10 {
        let again = membership(&algo.cluster(&mut gapped_strip(), &LinearNeighbors));
        assert_eq!(again, first);
    }
}

#[test]
fn test_rejected_hits_stay_in_input_map() {
    let mut hits = gapped_strip();
    let before = hits[&0];
    NnClustering::with_min_value(MIN_VALUE).cluster(&mut hits, &LinearNeighbors);

    assert_eq!(hits.get(&0), Some(&before));
}

#[test]
fn test_non_positive_threshold_accepts_everything() {
    for min_value in [0.0, -1.0] {
        let mut hits = gapped_strip();
        let clusters = NnClustering::with_min_value(min_value).cluster(&mut hits, &LinearNeighbors);

        assert_eq!(clusters.len(), 4);
        assert_eq!(clusters.iter().map(NnCluster::len).sum::<usize>(), 8);
        assert!(hits.is_empty());
    }
}

#[test]
fn test_unknown_neighbors_are_ignored() {
    // isolated cells: every candidate id is absent from the map
    let mut hits = hit_map([CalHit::new(10, 1.0), CalHit::new(20, 2.0), CalHit::new(30, 3.0)]);
    let clusters = NnClustering::with_min_value(MIN_VALUE).cluster(&mut hits, &LinearNeighbors);

    assert_eq!(clusters.len(), 3);
    assert!(clusters.iter().all(|cluster| cluster.len() == 1));
}

#[test]
fn test_hits_follow_discovery_order() {
    let mut hits = gapped_strip();
    let clusters = NnClustering::with_min_value(MIN_VALUE).cluster(&mut hits, &LinearNeighbors);
    let largest = sorted_by_value(clusters).remove(0);

    let members: Vec<CellId> = largest.cell_ids().collect();
    assert_eq!(members, vec![4, 7, 6, 5]);

    // the ring is 5 -> 7 -> 6 -> 4 -> 5; the walk starts anywhere on it
    let discovered: Vec<CellId> = largest.hits().iter().map(|hit| hit.cell_id).collect();
    let ring = [5, 7, 6, 4];
    let offset = ring
        .iter()
        .position(|&id| id == discovered[0])
        .expect("walk starts on the ring");
    let expected: Vec<CellId> = (0..4).map(|i| ring[(offset + i) % 4]).collect();
    assert_eq!(discovered, expected);
}

#[test]
fn test_batch_matches_single_event_runs() {
    let config = NnConfig::new().with_min_value(MIN_VALUE).with_deltas(2, 2, 2);
    let mut events = vec![gapped_strip(), rising_strip()];
    let results = cluster_events(&mut events, &LinearNeighbors, &config).unwrap();

    let algo = NnClustering::new(config);
    for ((result, residual), mut single) in results.iter().zip(&events).zip([gapped_strip(), rising_strip()]) {
        let clusters = algo.cluster(&mut single, &LinearNeighbors);

        assert_eq!(membership(&result.clusters), membership(&clusters));
        let mut left: Vec<CellId> = residual.keys().copied().collect();
        let mut expected: Vec<CellId> = single.keys().copied().collect();
        left.sort_unstable();
        expected.sort_unstable();
        assert_eq!(left, expected);
        assert_eq!(result.statistics.hits_remaining, single.len());
    }
    assert_eq!(events[0].len(), 1);
    assert!(events[1].is_empty());
}
