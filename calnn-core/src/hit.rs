//! Hit traits and types for calorimeter data.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Readout cell identifier, as produced by the detector segmentation.
pub type CellId = u64;

/// Hits of one event keyed by cell id.
///
/// The key is the identity the clusterer works with; it is expected to equal
/// [`Hit::cell_id`] of the stored hit.
pub type HitMap<H> = HashMap<CellId, H>;

/// Trait for hit data from calorimeter readout cells.
///
/// Clustering only needs a stable identifier and a scalar weight, so any
/// detector-specific record can take part by implementing this trait.
pub trait Hit: Send + Sync {
    /// Returns the id of the cell that recorded the hit.
    fn cell_id(&self) -> CellId;

    /// Returns the clustering weight of the hit (e.g. deposited energy).
    fn value(&self) -> f64;
}

/// Core data structure for a single calorimeter hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalHit {
    /// Cell id.
    pub cell_id: CellId,
    /// Raw energy deposited in the cell.
    #[cfg_attr(feature = "serde", serde(default))]
    pub raw_energy: f64,
    /// Corrected energy, used as the clustering value.
    pub corrected_energy: f64,
    /// Hit time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub time: f64,
    /// Cell position (x, y, z).
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: [f64; 3],
}

impl CalHit {
    /// Creates a hit whose raw and corrected energy are both `energy`.
    #[inline]
    pub fn new(cell_id: CellId, energy: f64) -> Self {
        Self {
            cell_id,
            raw_energy: energy,
            corrected_energy: energy,
            time: 0.0,
            position: [0.0; 3],
        }
    }

    /// Sets the raw energy.
    #[must_use]
    pub fn with_raw_energy(mut self, raw_energy: f64) -> Self {
        self.raw_energy = raw_energy;
        self
    }

    /// Sets the hit time.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Sets the cell position.
    #[must_use]
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }
}

impl Hit for CalHit {
    #[inline]
    fn cell_id(&self) -> CellId {
        self.cell_id
    }

    #[inline]
    fn value(&self) -> f64 {
        self.corrected_energy
    }
}

/// Builds a [`HitMap`] keyed by each hit's cell id.
///
/// A later hit with an already seen id replaces the earlier one.
pub fn hit_map<H, I>(hits: I) -> HitMap<H>
where
    H: Hit,
    I: IntoIterator<Item = H>,
{
    hits.into_iter().map(|hit| (hit.cell_id(), hit)).collect()
}
