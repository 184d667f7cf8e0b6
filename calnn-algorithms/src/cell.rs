//! Ring-linked cells.
//!
//! Every cell carries two links, `points_to` and `pointed_to`, stored as
//! slots in a flat arena. Across the arena the links always form disjoint
//! circular rings; a fresh cell is a ring of one.

use std::cmp::Ordering;

use calnn_core::CellId;

/// Atomic clustering unit: one hit's id and value plus its ring links.
///
/// Cells order by value, then by id. The links are arena slots of the
/// [`CellRing`] the cell was created in.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    id: CellId,
    value: f64,
    slot: usize,
    points_to: usize,
    pointed_to: usize,
}

impl Cell {
    /// Creates a cell at `slot` linked to itself.
    #[must_use]
    pub fn new(id: CellId, value: f64, slot: usize) -> Self {
        Self {
            id,
            value,
            slot,
            points_to: slot,
            pointed_to: slot,
        }
    }

    /// Cell id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Clustering value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Arena slot of this cell.
    #[inline]
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Successor in the ring.
    #[inline]
    #[must_use]
    pub fn points_to(&self) -> usize {
        self.points_to
    }

    /// Predecessor in the ring.
    #[inline]
    #[must_use]
    pub fn pointed_to(&self) -> usize {
        self.pointed_to
    }

    /// Sets the successor.
    #[inline]
    pub fn set_points_to(&mut self, slot: usize) {
        self.points_to = slot;
    }

    /// Sets the predecessor.
    #[inline]
    pub fn set_pointed_to(&mut self, slot: usize) {
        self.pointed_to = slot;
    }

    /// True while the cell is a ring of one.
    #[inline]
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.points_to == self.slot && self.pointed_to == self.slot
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Arena of cells and the hits they were built from.
///
/// Hits are held beside the cells until extraction moves them out.
#[derive(Debug)]
pub struct CellRing<H> {
    cells: Vec<Cell>,
    hits: Vec<Option<H>>,
}

impl<H> Default for CellRing<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CellRing<H> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty arena with room for `capacity` cells.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            hits: Vec::with_capacity(capacity),
        }
    }

    /// Adds a singleton cell and returns its slot.
    pub fn push(&mut self, id: CellId, value: f64, hit: H) -> usize {
        let slot = self.cells.len();
        self.cells.push(Cell::new(id, value, slot));
        self.hits.push(Some(hit));
        slot
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the arena holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `slot`.
    #[inline]
    #[must_use]
    pub fn cell(&self, slot: usize) -> &Cell {
        &self.cells[slot]
    }

    /// Moves the hit out of `slot`; `None` once it has been taken.
    pub fn take_hit(&mut self, slot: usize) -> Option<H> {
        self.hits[slot].take()
    }

    /// Inserts the singleton `slot` into the ring of `target`, immediately
    /// before `target`.
    pub fn splice_before(&mut self, slot: usize, target: usize) {
        debug_assert!(self.cells[slot].is_singleton());
        debug_assert_ne!(slot, target);

        let pred = self.cells[target].pointed_to;
        self.cells[slot].set_points_to(target);
        self.cells[pred].set_points_to(slot);
        self.cells[slot].set_pointed_to(pred);
        self.cells[target].set_pointed_to(slot);
    }

    /// Slots of the ring containing `start`, following `points_to`.
    ///
    /// The walk stops after `len()` steps, so a broken ring yields a
    /// sequence that does not close; see [`CellRing::is_closed`].
    #[must_use]
    pub fn ring(&self, start: usize) -> Vec<usize> {
        let mut members = vec![start];
        let mut slot = self.cells[start].points_to;
        while slot != start && members.len() < self.cells.len() {
            members.push(slot);
            slot = self.cells[slot].points_to;
        }
        members
    }

    /// Checks that following `points_to` from `start` returns to it and
    /// that every step is mirrored by `pointed_to`.
    #[must_use]
    pub fn is_closed(&self, start: usize) -> bool {
        let mut slot = start;
        for _ in 0..self.cells.len() {
            let next = self.cells[slot].points_to;
            if self.cells[next].pointed_to != slot {
                return false;
            }
            if next == start {
                return true;
            }
            slot = next;
        }
        false
    }
}
