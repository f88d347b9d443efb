// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Gridding, weighting and dirty imaging of radio-interferometric visibilities.

Visibilities are averaged onto a regular spatial-frequency grid (see
[`GridCoords`]) with natural, uniform or Briggs weighting by a [`Gridder`],
which can then make dirty images and beams, or export the gridded data as a
[`GriddedDataset`] for an imaging optimiser.
 */

mod cli;
pub mod constants;
pub mod coords;
pub mod dataset;
pub mod gridding;
pub mod io;
mod math;
pub mod unit_parsing;

// Re-exports.
pub use cli::{Mpol, MpolError};
pub use coords::{get_max_spatial_freq, CoordsError, GridCoords};
pub use dataset::GriddedDataset;
pub use gridding::{GaussianTaper, Gridder, GridderError, ImageUnit, Weighting};

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
