// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Average visibilities onto a regular spatial-frequency grid and make dirty
//! images.
//!
//! Visibilities are assigned to the grid cell that contains them (no
//! convolutional kernel). Every visibility V(u, v) is accompanied by its
//! Hermitian conjugate V*(-u, -v), so gridded planes are Hermitian and dirty
//! images are real.

mod error;
mod weighting;

pub use error::GridderError;
pub use weighting::{
    GaussianTaper, ImageUnit, Weighting, WeightingType, IMAGE_UNITS_COMMA_SEPARATED,
    WEIGHTING_TYPES_COMMA_SEPARATED,
};

use std::ops::AddAssign;

use log::{debug, trace, warn};
use ndarray::{parallel::prelude::*, prelude::*, Zip};
use num_traits::Zero;

use crate::{
    c64,
    constants::{DEFAULT_BEAM_AREA_NTHETA, SCATTER_WARNING_BOUNDS},
    coords::GridCoords,
    dataset::GriddedDataset,
    math::{ifft2_unnormalised, ifftshift_2d, median},
};

/// The products of gridding with a particular weighting.
#[derive(Debug, Clone)]
struct GriddedState {
    weighting: Weighting,
    taper: Option<GaussianTaper>,

    /// The sum of imaging weights in each cell. `[chan, v, u]`
    imaging_weight: Array3<f64>,

    /// The sum of imaging-weighted visibilities in each cell. `[chan, v, u]`
    weighted_vis: Array3<c64>,

    /// 1 / (the sum of all imaging weights), for each channel.
    norm: Array1<f64>,
}

/// Averages visibilities onto the grid described by [`GridCoords`].
///
/// A `Gridder` starts un-gridded. [`Gridder::grid_visibilities`] (or
/// [`Gridder::get_dirty_image`]) grids the visibilities with a weighting
/// scheme; doing so again with another scheme replaces the previous result.
#[derive(Debug, Clone)]
pub struct Gridder {
    coords: GridCoords,

    /// The number of visibilities per channel that were supplied (i.e. not
    /// including Hermitian conjugates).
    nvis: usize,

    /// Hermitian-completed spatial frequencies \[kλ\]. `[chan, vis]`
    uu: Array2<f64>,
    vv: Array2<f64>,

    /// Hermitian-completed visibility weights. `[chan, vis]`
    weight: Array2<f64>,

    /// Hermitian-completed visibilities \[Jy\]. `[chan, vis]`
    data: Array2<c64>,

    /// The flattened (v * npix + u) cell index of each visibility. `[chan, vis]`
    cell_indices: Array2<usize>,

    /// The sum of visibility weights in each cell. `[chan, v, u]`
    cell_weight: Array3<f64>,

    /// The weighted-mean visibility of each cell; zero where there's no
    /// weight. `[chan, v, u]`
    vis_mean: Array3<c64>,

    state: Option<GriddedState>,
}

impl Gridder {
    /// Create a new gridder from multi-channel visibilities. All of the arrays
    /// must have the shape `(nchan, nvis)`. `uu` and `vv` are in kλ, and
    /// `weight` are the inverse variances of the visibilities.
    ///
    /// The visibilities are not modified; in particular, no sign convention
    /// is applied to `data_im`.
    pub fn new<'a>(
        coords: GridCoords,
        uu: ArrayView2<'a, f64>,
        vv: ArrayView2<'a, f64>,
        weight: ArrayView2<'a, f64>,
        data_re: ArrayView2<'a, f64>,
        data_im: ArrayView2<'a, f64>,
    ) -> Result<Gridder, GridderError> {
        let shape = uu.dim();
        for (name, a) in [
            ("vv", &vv),
            ("weight", &weight),
            ("data_re", &data_re),
            ("data_im", &data_im),
        ] {
            if a.dim() != shape {
                return Err(GridderError::ShapeMismatch {
                    name,
                    expected: shape,
                    got: a.dim(),
                });
            }
        }
        let (nchan, nvis) = shape;
        if nchan == 0 || nvis == 0 {
            return Err(GridderError::NoVisibilities);
        }
        for (name, a) in [
            ("uu", &uu),
            ("vv", &vv),
            ("weight", &weight),
            ("data_re", &data_re),
            ("data_im", &data_im),
        ] {
            if a.iter().any(|x| !x.is_finite()) {
                return Err(GridderError::NonFinite(name));
            }
        }
        if let Some(&w) = weight.iter().find(|&&w| w < 0.0) {
            return Err(GridderError::NegativeWeight(w));
        }
        for (chan, w) in weight.outer_iter().enumerate() {
            if w.sum() <= 0.0 {
                return Err(GridderError::ZeroWeight { chan });
            }
        }
        coords.check_data_fit(uu.iter(), vv.iter())?;

        // Add the Hermitian conjugates.
        let nfull = 2 * nvis;
        let complete = |a: ArrayView2<f64>, sign: f64| {
            Array2::from_shape_fn((nchan, nfull), |(c, i)| {
                if i < nvis {
                    a[[c, i]]
                } else {
                    sign * a[[c, i - nvis]]
                }
            })
        };
        let uu = complete(uu, -1.0);
        let vv = complete(vv, -1.0);
        let weight = complete(weight, 1.0);
        let data_re = complete(data_re, 1.0);
        let data_im = complete(data_im, -1.0);
        let data = Array2::from_shape_fn((nchan, nfull), |i| c64::new(data_re[i], data_im[i]));

        // Conjugates go in the mirror of their visibility's cell rather than
        // being looked up again, so that samples on cell edges keep the planes
        // Hermitian. Cell 0 has no mirror; data that fit can only reach it by
        // rounding at -max_grid.
        let npix = coords.npix();
        let mut cell_indices = Array2::zeros((nchan, nfull));
        for (mut indices, (uu, vv)) in cell_indices
            .outer_iter_mut()
            .zip(uu.outer_iter().zip(vv.outer_iter()))
        {
            for (i, (&u, &v)) in uu.iter().zip(vv.iter()).take(nvis).enumerate() {
                let index = match (coords.cell_index(u), coords.cell_index(v)) {
                    (Some(i_u), Some(i_v)) => i_v.max(1) * npix + i_u.max(1),
                    _ => return Err(GridderError::OffGrid { u, v }),
                };
                indices[i] = index;
                indices[i + nvis] = mirror_cell(index, npix);
            }
        }

        let cell_weight = histogram_cube(cell_indices.view(), weight.view(), npix);
        let weighted_data = &data * &weight.mapv(|w| c64::new(w, 0.0));
        let mut vis_mean = histogram_cube(cell_indices.view(), weighted_data.view(), npix);
        vis_mean
            .iter_mut()
            .zip(cell_weight.iter())
            .for_each(|(v, &w)| {
                if w > 0.0 {
                    *v /= w;
                } else {
                    *v = c64::default();
                }
            });
        debug!(
            "Made a gridder for {nchan} channel(s) of {nvis} visibilities on a {npix}x{npix} grid"
        );

        Ok(Gridder {
            coords,
            nvis,
            uu,
            vv,
            weight,
            data,
            cell_indices,
            cell_weight,
            vis_mean,
            state: None,
        })
    }

    /// Create a new gridder from a single channel of visibilities.
    pub fn new_single_channel(
        coords: GridCoords,
        uu: &[f64],
        vv: &[f64],
        weight: &[f64],
        data_re: &[f64],
        data_im: &[f64],
    ) -> Result<Gridder, GridderError> {
        let as_row = |a: &[f64]| {
            let n = a.len();
            Array2::from_shape_fn((1, n), |(_, i)| a[i])
        };
        Gridder::new(
            coords,
            as_row(uu).view(),
            as_row(vv).view(),
            as_row(weight).view(),
            as_row(data_re).view(),
            as_row(data_im).view(),
        )
    }

    /// Create a new gridder, making [`GridCoords`] from the cell size
    /// \[arcsec\] and number of pixels.
    pub fn from_cell_size<'a>(
        cell_size: f64,
        npix: usize,
        uu: ArrayView2<'a, f64>,
        vv: ArrayView2<'a, f64>,
        weight: ArrayView2<'a, f64>,
        data_re: ArrayView2<'a, f64>,
        data_im: ArrayView2<'a, f64>,
    ) -> Result<Gridder, GridderError> {
        let coords = GridCoords::new(cell_size, npix)?;
        Gridder::new(coords, uu, vv, weight, data_re, data_im)
    }

    pub fn coords(&self) -> &GridCoords {
        &self.coords
    }

    pub fn nchan(&self) -> usize {
        self.cell_weight.len_of(Axis(0))
    }

    /// The number of visibilities per channel, not counting Hermitian
    /// conjugates.
    pub fn nvis(&self) -> usize {
        self.nvis
    }

    /// The sum of visibility weights in each cell. `[chan, v, u]`
    pub fn cell_weight(&self) -> ArrayView3<f64> {
        self.cell_weight.view()
    }

    /// The weighted-mean visibility of each cell. `[chan, v, u]`
    pub fn vis_mean(&self) -> ArrayView3<c64> {
        self.vis_mean.view()
    }

    /// The weighting and taper of the current gridded state, if the
    /// visibilities have been gridded.
    pub fn weighting(&self) -> Option<(Weighting, Option<GaussianTaper>)> {
        self.state.as_ref().map(|s| (s.weighting, s.taper))
    }

    /// The sum of imaging weights in each cell, normalised such that the sum
    /// over the whole grid of each channel is 1. `[chan, v, u]`
    pub fn imaging_weight(&self) -> Result<Array3<f64>, GridderError> {
        let state = self.state.as_ref().ok_or(GridderError::NotGridded)?;
        let mut w = state.imaging_weight.clone();
        w.outer_iter_mut()
            .zip(state.norm.iter())
            .for_each(|(mut plane, &norm)| plane *= norm);
        Ok(w)
    }

    /// The sum of imaging weights in each cell, without normalisation.
    /// `[chan, v, u]`
    pub fn imaging_weight_unnormalised(&self) -> Result<ArrayView3<f64>, GridderError> {
        self.state
            .as_ref()
            .map(|s| s.imaging_weight.view())
            .ok_or(GridderError::NotGridded)
    }

    /// The gridded visibilities under the current weighting; the
    /// imaging-weighted mean of each cell. `[chan, v, u]`
    pub fn gridded_vis(&self) -> Result<Array3<c64>, GridderError> {
        let state = self.state.as_ref().ok_or(GridderError::NotGridded)?;
        let mut vis = state.weighted_vis.clone();
        vis.iter_mut()
            .zip(state.imaging_weight.iter())
            .for_each(|(v, &w)| {
                if w > 0.0 {
                    *v /= w;
                } else {
                    *v = c64::default();
                }
            });
        Ok(vis)
    }

    /// Grid the visibilities with the supplied weighting and optional taper.
    /// Any previously-gridded products are replaced.
    pub fn grid_visibilities(
        &mut self,
        weighting: Weighting,
        taper: Option<GaussianTaper>,
    ) -> Result<(), GridderError> {
        weighting.validate()?;
        debug!("Gridding visibilities with {weighting} weighting");
        if let Some(t) = taper {
            debug!("Using a Gaussian taper with FWHM {} arcsec", t.fwhm());
        }

        let npix = self.coords.npix();
        let mut imaging = Array2::<f64>::zeros(self.weight.dim());
        imaging
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(chan, mut imaging)| {
                let weight = self.weight.row(chan);
                let cell_weight = self.cell_weight.index_axis(Axis(0), chan);
                let cell_weight: Vec<f64> = self
                    .cell_indices
                    .row(chan)
                    .iter()
                    .map(|&i| cell_weight[[i / npix, i % npix]])
                    .collect();
                let weight = weight.to_vec();
                let density = weighting.density_weights(&weight, &cell_weight);

                imaging
                    .iter_mut()
                    .zip(weight)
                    .zip(density)
                    .zip(self.uu.row(chan))
                    .zip(self.vv.row(chan))
                    .for_each(|((((imaging, w), d), &u), &v)| {
                        let t = taper.map(|t| t.weight(u, v)).unwrap_or(1.0);
                        *imaging = w * d * t;
                    });
            });

        let mut norm = Array1::zeros(self.nchan());
        for (chan, (n, imaging)) in norm.iter_mut().zip(imaging.outer_iter()).enumerate() {
            let sum = imaging.sum();
            if sum <= 0.0 || !sum.is_finite() {
                return Err(GridderError::ZeroWeight { chan });
            }
            *n = 1.0 / sum;
        }

        let imaging_weight = histogram_cube(self.cell_indices.view(), imaging.view(), npix);
        let weighted_data = &self.data * &imaging.mapv(|w| c64::new(w, 0.0));
        let weighted_vis = histogram_cube(self.cell_indices.view(), weighted_data.view(), npix);

        if log::log_enabled!(log::Level::Debug) {
            for (chan, plane) in imaging_weight.outer_iter().enumerate() {
                let occupied = plane.iter().filter(|&&w| w > 0.0).count();
                debug!("Channel {chan}: {occupied} occupied cells");
            }
        }

        self.state = Some(GriddedState {
            weighting,
            taper,
            imaging_weight,
            weighted_vis,
            norm,
        });
        Ok(())
    }

    /// Make dirty images and dirty beams of all channels, returned as `(image,
    /// beam)`. Both have the shape `(nchan, npix, npix)`.
    ///
    /// The visibilities are (re-)gridded only if the requested weighting or
    /// taper differs from the current gridded state.
    ///
    /// Image rows run from south to north (`m_centers`), columns from east to
    /// west (`l_centers`, reversed), so the image is the right way around
    /// when displayed with [`GridCoords::img_ext`] and the origin at the
    /// bottom left.
    pub fn get_dirty_image(
        &mut self,
        weighting: Weighting,
        unit: ImageUnit,
        taper: Option<GaussianTaper>,
    ) -> Result<(Array3<f64>, Array3<f64>), GridderError> {
        let needs_gridding = match &self.state {
            Some(s) => s.weighting != weighting || s.taper != taper,
            None => true,
        };
        if needs_gridding {
            self.grid_visibilities(weighting, taper)?;
        } else {
            trace!("Re-using gridded visibilities");
        }
        self.check_visibility_scatter();

        let state = self.state.as_ref().ok_or(GridderError::NotGridded)?;
        let beam = dirty_planes(
            state.imaging_weight.mapv(|w| c64::new(w, 0.0)).view(),
            state.norm.view(),
        );
        let mut image = dirty_planes(state.weighted_vis.view(), state.norm.view());

        match unit {
            ImageUnit::JyPerBeam => (),
            ImageUnit::JyPerArcsec2 => {
                let areas = self.beam_areas(beam.view(), DEFAULT_BEAM_AREA_NTHETA)?;
                for (chan, (mut plane, area)) in image.outer_iter_mut().zip(areas).enumerate() {
                    debug!("Channel {chan}: dirty beam area {area:.6e} arcsec^2");
                    plane /= area;
                }
            }
        }

        Ok((image, beam))
    }

    /// Get the area of the dirty beam of each channel \[arcsec^2\], under the
    /// current gridded state. The beam is integrated over its main lobe, out
    /// to the first null; the null is searched for along `ntheta` rays from
    /// the beam centre.
    pub fn get_dirty_beam_area(&self, ntheta: usize) -> Result<Array1<f64>, GridderError> {
        let state = self.state.as_ref().ok_or(GridderError::NotGridded)?;
        let beam = dirty_planes(
            state.imaging_weight.mapv(|w| c64::new(w, 0.0)).view(),
            state.norm.view(),
        );
        self.beam_areas(beam.view(), ntheta)
    }

    fn beam_areas(&self, beam: ArrayView3<f64>, ntheta: usize) -> Result<Array1<f64>, GridderError> {
        let cell_size = self.coords.cell_size();
        beam.outer_iter()
            .enumerate()
            .map(|(chan, plane)| {
                main_lobe_sum(plane, ntheta)
                    .map(|s| s * cell_size * cell_size)
                    .ok_or(GridderError::BeamArea { chan })
            })
            .collect()
    }

    /// For each cell with at least two (non-zero weight) visibilities, the
    /// reduced chi-squared of the visibilities about the cell's weighted mean:
    ///
    /// Σ w_i |V_i - V̄|² / (2 (n - 1))
    ///
    /// If the visibility weights are correct inverse variances, this should be
    /// about 1. Each visibility is counted once, folded into one cell of its
    /// Hermitian pair; both cells of the pair get the same value. Cells with
    /// fewer than two visibilities are NaN. `[chan, v, u]`
    pub fn visibility_scatter(&self) -> Array3<f64> {
        let npix = self.coords.npix();
        let mut scatter = Array3::from_elem(self.cell_weight.dim(), f64::NAN);
        scatter
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(chan, mut scatter)| {
                let vis_mean = self.vis_mean.index_axis(Axis(0), chan);
                let mut chi_sq = Array2::<f64>::zeros((npix, npix));
                let mut count = Array2::<usize>::zeros((npix, npix));
                for ((&i, &w), &vis) in self
                    .cell_indices
                    .row(chan)
                    .iter()
                    .zip(self.weight.row(chan))
                    .zip(self.data.row(chan))
                    .take(self.nvis)
                {
                    if w <= 0.0 {
                        continue;
                    }
                    let mirror = mirror_cell(i, npix);
                    let (i, vis) = if mirror < i { (mirror, vis.conj()) } else { (i, vis) };
                    let index = [i / npix, i % npix];
                    chi_sq[index] += w * (vis - vis_mean[index]).norm_sqr();
                    count[index] += 1;
                }
                Zip::from(&mut scatter)
                    .and(&chi_sq)
                    .and(&count)
                    .for_each(|s, &chi_sq, &count| {
                        if count > 1 {
                            *s = chi_sq / (2.0 * (count - 1) as f64);
                        }
                    });
                for i in 0..npix * npix {
                    let mirror = mirror_cell(i, npix);
                    if mirror > i {
                        let value = scatter[[i / npix, i % npix]];
                        scatter[[mirror / npix, mirror % npix]] = value;
                    }
                }
            });
        scatter
    }

    /// Warn if the scatter of the visibilities within cells is inconsistent
    /// with their weights.
    fn check_visibility_scatter(&self) {
        let scatter = self.visibility_scatter();
        for (chan, plane) in scatter.outer_iter().enumerate() {
            let mut values = plane.iter().copied().collect::<Vec<_>>();
            let Some(median) = median(&mut values) else {
                continue;
            };
            trace!("Channel {chan}: median visibility scatter {median:.3}");
            let (low, high) = SCATTER_WARNING_BOUNDS;
            if !(low..=high).contains(&median) {
                warn!("Channel {chan}: the scatter of visibilities within grid cells (median reduced chi-squared {median:.3}) is inconsistent with their weights; the weights may be mis-scaled");
            }
        }
    }

    /// Export the gridded visibilities as a dataset for imaging. The dataset
    /// holds the weighted-mean visibility and the summed (inverse-variance)
    /// weight of every cell, on the same `[chan, v, u]` grid as
    /// [`Gridder::get_dirty_image`] transforms.
    pub fn to_dataset(&self) -> Result<GriddedDataset, GridderError> {
        if self.state.is_none() {
            return Err(GridderError::NotGridded);
        }
        Ok(GriddedDataset::new(
            self.coords.clone(),
            self.vis_mean.clone(),
            self.cell_weight.clone(),
        ))
    }
}

/// The flattened (v * npix + u) index of the cell that holds the Hermitian
/// conjugates of the visibilities in cell `index`.
fn mirror_cell(index: usize, npix: usize) -> usize {
    let (i_v, i_u) = (index / npix, index % npix);
    ((npix - i_v) % npix) * npix + (npix - i_u) % npix
}

/// Sum `values` into the grid cells given by the flattened `cell_indices`, for
/// each channel. The output is `[chan, v, u]`.
fn histogram_cube<T>(
    cell_indices: ArrayView2<usize>,
    values: ArrayView2<T>,
    npix: usize,
) -> Array3<T>
where
    T: Copy + Zero + AddAssign + Send + Sync,
{
    let nchan = cell_indices.len_of(Axis(0));
    let mut cube = Array3::zeros((nchan, npix, npix));
    cube.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(cell_indices.axis_iter(Axis(0)))
        .zip(values.axis_iter(Axis(0)))
        .for_each(|((mut plane, indices), values)| {
            for (&i, &value) in indices.iter().zip(values.iter()) {
                plane[[i / npix, i % npix]] += value;
            }
        });
    cube
}

/// Inverse Fourier transform gridded planes (`[chan, v, u]`) into the image
/// plane, scaling each channel by its normalisation.
fn dirty_planes(grids: ArrayView3<c64>, norms: ArrayView1<f64>) -> Array3<f64> {
    let mut out = Array3::zeros(grids.dim());
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(grids.axis_iter(Axis(0)))
        .zip(norms.axis_iter(Axis(0)))
        .for_each(|((mut out, grid), norm)| {
            out.assign(&dirty_plane(grid, norm[()]));
        });
    out
}

/// Inverse Fourier transform a single gridded plane. The grid is indexed
/// `[v, u]` with the zero spatial frequency at `npix / 2`; the output is
/// indexed `[m, l]` with m increasing and l decreasing, and the phase centre
/// at `[npix / 2, npix / 2]`.
fn dirty_plane(grid: ArrayView2<c64>, norm: f64) -> Array2<f64> {
    let npix = grid.nrows();
    let half = npix / 2;
    let mut packed = ifftshift_2d(grid);
    ifft2_unnormalised(&mut packed);
    Array2::from_shape_fn((npix, npix), |(j, i)| {
        packed[[(j + half) % npix, (npix + half - i) % npix]].re * norm
    })
}

/// Sum the beam within the first null of its main lobe. `None` is returned if
/// the sum is not positive.
fn main_lobe_sum(beam: ArrayView2<f64>, ntheta: usize) -> Option<f64> {
    let npix = beam.nrows();
    let centre = (npix / 2) as f64;
    let max_radius = centre;

    // Step along each ray in half-pixel increments until the beam is no
    // longer positive.
    let null_radius = (0..ntheta.max(1))
        .map(|k| {
            let theta = crate::constants::TAU * k as f64 / ntheta.max(1) as f64;
            let (sin, cos) = theta.sin_cos();
            let mut r = 0.5;
            while r < max_radius {
                let j = (centre + r * sin).round();
                let i = (centre + r * cos).round();
                if j < 0.0 || i < 0.0 || j >= npix as f64 || i >= npix as f64 {
                    break;
                }
                if beam[[j as usize, i as usize]] <= 0.0 {
                    break;
                }
                r += 0.5;
            }
            r
        })
        .fold(f64::INFINITY, f64::min);

    let sum: f64 = beam
        .indexed_iter()
        .filter(|((j, i), _)| {
            let dj = *j as f64 - centre;
            let di = *i as f64 - centre;
            (dj * dj + di * di).sqrt() < null_radius
        })
        .map(|(_, &b)| b)
        .sum();
    if sum > 0.0 && sum.is_finite() {
        Some(sum)
    } else {
        None
    }
}
