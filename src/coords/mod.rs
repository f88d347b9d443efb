// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image-plane and spatial-frequency coordinates of a square grid.

mod error;

pub use error::CoordsError;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{ARCSEC, LAMBDA_PER_KLAMBDA};

/// The maximum spatial frequency \[kλ\] that fits on a grid with the supplied
/// cell size \[arcsec\] and number of pixels. A visibility at this spatial
/// frequency (and its Hermitian conjugate) lands in the outermost cells of the
/// grid.
pub fn get_max_spatial_freq(cell_size: f64, npix: usize) -> f64 {
    let du = 1.0 / (npix as f64 * cell_size * ARCSEC) / LAMBDA_PER_KLAMBDA;
    (npix / 2) as f64 * du - du / 2.0
}

/// The coordinates of a square image of `npix` × `npix` pixels, each of size
/// `cell_size` \[arcsec\], and the matching spatial-frequency grid.
///
/// Sky-plane pixel centres are at `(i - npix/2) * cell_size`, and
/// spatial-frequency cell centres at `(k - npix/2) * du`, which are the output
/// frequencies of an FFT after an `fftshift`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridCoordsParams", into = "GridCoordsParams")]
pub struct GridCoords {
    /// The width of a pixel \[arcsec\].
    cell_size: f64,

    /// The number of pixels along each side of the image.
    npix: usize,

    /// The width of a pixel \[radians\].
    dl: f64,

    /// The width of a spatial-frequency cell \[kλ\].
    du: f64,

    /// Pixel centres \[arcsec\].
    l_centers: Array1<f64>,

    /// Spatial-frequency cell centres \[kλ\].
    u_centers: Array1<f64>,

    /// Spatial-frequency cell edges \[kλ\]; there are `npix + 1` of them.
    u_edges: Array1<f64>,
}

/// The only things needed to reconstruct a [`GridCoords`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GridCoordsParams {
    cell_size: f64,
    npix: usize,
}

impl TryFrom<GridCoordsParams> for GridCoords {
    type Error = CoordsError;

    fn try_from(p: GridCoordsParams) -> Result<Self, Self::Error> {
        GridCoords::new(p.cell_size, p.npix)
    }
}

impl From<GridCoords> for GridCoordsParams {
    fn from(c: GridCoords) -> Self {
        GridCoordsParams {
            cell_size: c.cell_size,
            npix: c.npix,
        }
    }
}

impl PartialEq for GridCoords {
    fn eq(&self, other: &Self) -> bool {
        self.cell_size == other.cell_size && self.npix == other.npix
    }
}

impl GridCoords {
    /// Create new grid coordinates. `cell_size` must be positive \[arcsec\],
    /// and `npix` must be positive and even.
    pub fn new(cell_size: f64, npix: usize) -> Result<GridCoords, CoordsError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CoordsError::CellSize(cell_size));
        }
        if npix == 0 || npix % 2 != 0 {
            return Err(CoordsError::Npix(npix));
        }

        let dl = cell_size * ARCSEC;
        let du = 1.0 / (npix as f64 * dl) / LAMBDA_PER_KLAMBDA;
        let half = (npix / 2) as f64;
        let l_centers = Array1::from_shape_fn(npix, |i| (i as f64 - half) * cell_size);
        let u_centers = Array1::from_shape_fn(npix, |k| (k as f64 - half) * du);
        let u_edges = Array1::from_shape_fn(npix + 1, |k| (k as f64 - half - 0.5) * du);

        Ok(GridCoords {
            cell_size,
            npix,
            dl,
            du,
            l_centers,
            u_centers,
            u_edges,
        })
    }

    /// The width of a pixel \[arcsec\].
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The number of pixels along each side of the image.
    pub fn npix(&self) -> usize {
        self.npix
    }

    /// The width of a pixel \[radians\].
    pub fn dl(&self) -> f64 {
        self.dl
    }

    /// The height of a pixel \[radians\]. Pixels are square.
    pub fn dm(&self) -> f64 {
        self.dl
    }

    /// The width of a spatial-frequency cell \[kλ\].
    pub fn du(&self) -> f64 {
        self.du
    }

    /// The height of a spatial-frequency cell \[kλ\].
    pub fn dv(&self) -> f64 {
        self.du
    }

    /// RA-offset pixel centres \[arcsec\].
    pub fn l_centers(&self) -> ArrayView1<f64> {
        self.l_centers.view()
    }

    /// Dec-offset pixel centres \[arcsec\].
    pub fn m_centers(&self) -> ArrayView1<f64> {
        self.l_centers.view()
    }

    pub fn u_centers(&self) -> ArrayView1<f64> {
        self.u_centers.view()
    }

    pub fn v_centers(&self) -> ArrayView1<f64> {
        self.u_centers.view()
    }

    pub fn u_edges(&self) -> ArrayView1<f64> {
        self.u_edges.view()
    }

    pub fn v_edges(&self) -> ArrayView1<f64> {
        self.u_edges.view()
    }

    /// The largest |u| or |v| \[kλ\] that fits on the grid.
    pub fn max_grid(&self) -> f64 {
        self.u_edges[self.npix]
    }

    /// The extent of the image \[arcsec\] as `[left, right, bottom, top]`,
    /// including the outer half pixels. East is left, so this suits displaying
    /// the image with its origin at the bottom-left.
    pub fn img_ext(&self) -> [f64; 4] {
        let half = (self.npix / 2) as f64;
        let lmax = (half + 0.5) * self.cell_size;
        let lmin = -(half - 0.5) * self.cell_size;
        [lmax, lmin, -lmax, -lmin]
    }

    /// The extent of the spatial-frequency grid \[kλ\] as `[u_min, u_max,
    /// v_min, v_max]`, measured from the cell edges.
    pub fn vis_ext(&self) -> [f64; 4] {
        let (min, max) = (self.u_edges[0], self.u_edges[self.npix]);
        [min, max, min, max]
    }

    /// The index of the cell containing the spatial frequency `u` \[kλ\], or
    /// `None` if it lies off the grid. Cells are half-open on the right, except
    /// for the final cell, which also contains the final edge.
    pub fn cell_index(&self, u: f64) -> Option<usize> {
        let first = self.u_edges[0];
        let last = self.u_edges[self.npix];
        if !(first..=last).contains(&u) {
            return None;
        }
        let index = ((u - first) / self.du).floor() as usize;
        Some(index.min(self.npix - 1))
    }

    /// Check that all of the supplied spatial frequencies \[kλ\] (and their
    /// Hermitian conjugates) can be gridded with these coordinates.
    pub fn check_data_fit<'a, I>(&self, uu: I, vv: I) -> Result<(), CoordsError>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let max_abs = |it: I| it.into_iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        let max_uv = max_abs(uu).max(max_abs(vv));
        let max_grid = self.max_grid();
        if max_uv > max_grid {
            // The cell size that would have just fit this spatial frequency.
            let half = (self.npix / 2) as f64 - 0.5;
            let max_cell_size =
                half / (self.npix as f64 * max_uv * LAMBDA_PER_KLAMBDA) / ARCSEC;
            return Err(CoordsError::DataDoesNotFit {
                max_uv,
                max_grid,
                max_cell_size,
            });
        }
        Ok(())
    }
}
