// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gridded visibilities, ready to be consumed by an imaging optimiser.


use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{c64, coords::GridCoords, math::ifftshift_2d};

/// Averaged visibilities and their weights on a [`GridCoords`] grid.
///
/// Arrays are indexed `[chan, v, u]`, with the spatial frequencies given by
/// [`GridCoords::v_centers`] and [`GridCoords::u_centers`]. Use
/// [`GriddedDataset::packed`] to get the arrays in FFT order instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedDataset {
    pub coords: GridCoords,

    pub nchan: usize,

    /// The weighted-mean visibility of each cell \[Jy\].
    pub vis_gridded: Array3<c64>,

    /// The summed inverse-variance weight of each cell.
    pub weight_gridded: Array3<f64>,

    /// Which cells contain data.
    pub mask: Array3<bool>,
}

impl GriddedDataset {
    pub(crate) fn new(
        coords: GridCoords,
        vis_gridded: Array3<c64>,
        weight_gridded: Array3<f64>,
    ) -> GriddedDataset {
        let nchan = vis_gridded.len_of(Axis(0));
        let mask = weight_gridded.mapv(|w| w > 0.0);
        GriddedDataset {
            coords,
            nchan,
            vis_gridded,
            weight_gridded,
            mask,
        }
    }

    /// The number of cells containing data.
    pub fn num_occupied(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// The visibilities of occupied cells, flattened in `[chan, v, u]` order.
    pub fn vis_indexed(&self) -> Vec<c64> {
        self.vis_gridded
            .iter()
            .zip(self.mask.iter())
            .filter(|(_, &m)| m)
            .map(|(&v, _)| v)
            .collect()
    }

    /// The weights of occupied cells, in the same order as
    /// [`GriddedDataset::vis_indexed`].
    pub fn weight_indexed(&self) -> Vec<f64> {
        self.weight_gridded
            .iter()
            .zip(self.mask.iter())
            .filter(|(_, &m)| m)
            .map(|(&w, _)| w)
            .collect()
    }

    /// Get a copy of this dataset with the spatial axes in FFT ("packed")
    /// order, i.e. the zero spatial frequency at index `[chan, 0, 0]`.
    pub fn packed(&self) -> GriddedDataset {
        fn pack<T: Clone>(cube: &Array3<T>) -> Array3<T> {
            let mut out = cube.clone();
            for (mut o, c) in out.outer_iter_mut().zip(cube.outer_iter()) {
                o.assign(&ifftshift_2d(c));
            }
            out
        }

        GriddedDataset {
            coords: self.coords.clone(),
            nchan: self.nchan,
            vis_gridded: pack(&self.vis_gridded),
            weight_gridded: pack(&self.weight_gridded),
            mask: pack(&self.mask),
        }
    }
}
