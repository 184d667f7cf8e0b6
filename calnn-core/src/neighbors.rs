//! Neighbor lookup for readout cells.
//!
//! Which ids count as "neighbors" depends on the detector segmentation, so
//! the clusterer only sees the [`NeighborProvider`] trait. Two providers are
//! included: a one-dimensional strip and a layered cartesian grid.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]

use crate::error::{Error, Result};
use crate::hit::CellId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Symmetric neighbor search window, in cells along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeighborWindow {
    /// Reach across layers.
    pub delta_layer: u32,
    /// Reach along the first in-layer axis.
    pub delta_u: u32,
    /// Reach along the second in-layer axis.
    pub delta_v: u32,
}

impl Default for NeighborWindow {
    fn default() -> Self {
        Self::cube(1)
    }
}

impl NeighborWindow {
    /// Creates a window with individual reaches.
    #[must_use]
    pub fn new(delta_layer: u32, delta_u: u32, delta_v: u32) -> Self {
        Self {
            delta_layer,
            delta_u,
            delta_v,
        }
    }

    /// Creates a window with the same reach along every axis.
    #[must_use]
    pub fn cube(delta: u32) -> Self {
        Self::new(delta, delta, delta)
    }
}

/// Source of candidate neighbor ids for a cell.
///
/// Implementations append candidates to `out` and may report ids that were
/// not hit in the current event; the caller ignores those.
pub trait NeighborProvider: Send + Sync {
    /// Appends the ids of the cells within `window` of `id` to `out`.
    fn neighbors(&self, id: CellId, window: NeighborWindow, out: &mut Vec<CellId>);
}

impl<T: NeighborProvider + ?Sized> NeighborProvider for &T {
    fn neighbors(&self, id: CellId, window: NeighborWindow, out: &mut Vec<CellId>) {
        (**self).neighbors(id, window, out);
    }
}

/// A single strip of cells numbered consecutively.
///
/// Candidates are `id - n ..= id - 1` followed by `id + 1 ..= id + n` with
/// `n = window.delta_layer`; the in-layer reaches are ignored. Ids that would
/// fall outside the `u64` range are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearNeighbors;

impl NeighborProvider for LinearNeighbors {
    fn neighbors(&self, id: CellId, window: NeighborWindow, out: &mut Vec<CellId>) {
        let reach = u64::from(window.delta_layer);
        out.extend((1..=reach).rev().filter_map(|offset| id.checked_sub(offset)));
        out.extend((1..=reach).filter_map(|offset| id.checked_add(offset)));
    }
}

/// Decoded position of a cell in a [`GridNeighbors`] segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridIndex {
    /// Layer number, counted from the front face.
    pub layer: u32,
    /// First in-layer coordinate.
    pub u: i16,
    /// Second in-layer coordinate.
    pub v: i16,
}

impl GridIndex {
    /// Creates a grid index.
    #[inline]
    pub fn new(layer: u32, u: i16, v: i16) -> Self {
        Self { layer, u, v }
    }
}

/// Layered cartesian segmentation.
///
/// Cell ids pack `layer << 32 | u << 16 | v`, with `u` and `v` stored as
/// 16-bit two's complement. Neighbors are all cells in the box
/// `layer ± delta_layer`, `u ± delta_u`, `v ± delta_v` except the cell
/// itself; layers outside `[0, layers)` and coordinates outside the `i16`
/// range are skipped.
#[derive(Debug, Clone, Copy)]
pub struct GridNeighbors {
    layers: u32,
}

impl GridNeighbors {
    /// Creates a segmentation with `layers` layers.
    pub fn new(layers: u32) -> Result<Self> {
        if layers == 0 {
            return Err(Error::NoLayers);
        }
        Ok(Self { layers })
    }

    /// Number of layers.
    #[must_use]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Packs a grid index into a cell id.
    #[inline]
    #[must_use]
    pub fn encode(index: GridIndex) -> CellId {
        (u64::from(index.layer) << 32) | (u64::from(index.u as u16) << 16) | u64::from(index.v as u16)
    }

    /// Unpacks a cell id into a grid index.
    #[inline]
    #[must_use]
    pub fn decode(id: CellId) -> GridIndex {
        GridIndex {
            layer: (id >> 32) as u32,
            u: ((id >> 16) & 0xFFFF) as u16 as i16,
            v: (id & 0xFFFF) as u16 as i16,
        }
    }
}

impl NeighborProvider for GridNeighbors {
    fn neighbors(&self, id: CellId, window: NeighborWindow, out: &mut Vec<CellId>) {
        let center = Self::decode(id);
        let dl = i64::from(window.delta_layer);
        let du = i64::from(window.delta_u);
        let dv = i64::from(window.delta_v);

        for layer in (i64::from(center.layer) - dl)..=(i64::from(center.layer) + dl) {
            if layer < 0 || layer >= i64::from(self.layers) {
                continue;
            }
            for u in (i64::from(center.u) - du)..=(i64::from(center.u) + du) {
                let Ok(u) = i16::try_from(u) else { continue };
                for v in (i64::from(center.v) - dv)..=(i64::from(center.v) + dv) {
                    let Ok(v) = i16::try_from(v) else { continue };
                    let neighbor = GridIndex::new(layer as u32, u, v);
                    if neighbor != center {
                        out.push(Self::encode(neighbor));
                    }
                }
            }
        }
    }
}
