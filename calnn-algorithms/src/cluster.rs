//! Cluster accumulator for extracted rings.

use std::cmp::Ordering;

use calnn_core::CellId;

use crate::cell::Cell;

/// Cells of one extracted ring together with their hits.
///
/// Members are kept sorted by the cell ordering (value, then id) while the
/// hits stay in the order the ring walk discovered them, so the two
/// sequences generally differ.
#[derive(Debug, Clone)]
pub struct NnCluster<H> {
    members: Vec<Cell>,
    hits: Vec<H>,
    value: f64,
}

impl<H> Default for NnCluster<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> NnCluster<H> {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            hits: Vec::new(),
            value: 0.0,
        }
    }

    /// Adds a cell and the hit it was built from.
    pub fn add(&mut self, cell: Cell, hit: H) {
        let pos = self.members.partition_point(|member| *member < cell);
        self.members.insert(pos, cell);
        self.value += cell.value();
        self.hits.push(hit);
    }

    /// Returns the number of cells in the cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the cluster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Summed value of all members.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Member with the greatest (value, id).
    #[must_use]
    pub fn highest(&self) -> Option<&Cell> {
        self.members.last()
    }

    /// Members in ascending (value, id) order.
    #[must_use]
    pub fn members(&self) -> &[Cell] {
        &self.members
    }

    /// Hits in discovery order.
    #[must_use]
    pub fn hits(&self) -> &[H] {
        &self.hits
    }

    /// Consumes the cluster, returning its hits in discovery order.
    #[must_use]
    pub fn into_hits(self) -> Vec<H> {
        self.hits
    }

    /// Member ids in ascending (value, id) order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.members.iter().map(Cell::id)
    }

    /// Orders clusters by summed value.
    #[must_use]
    pub fn cmp_by_value(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}
