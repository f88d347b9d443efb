// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Gridding sums many small weights
together, so everything is accumulated in double precision.
 */

pub use std::f64::consts::{LN_2, PI, TAU};

/// Radians per arcsecond.
pub const ARCSEC: f64 = PI / (180.0 * 3600.0);

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Arcseconds per milliarcsecond.
pub const ARCSEC_PER_MAS: f64 = 1e-3;

/// The number of wavelengths in a kilolambda. Spatial frequencies are always
/// handled in kλ.
pub const LAMBDA_PER_KLAMBDA: f64 = 1e3;

/// The smallest robust parameter accepted by Briggs weighting (uniform-like).
pub const ROBUST_MIN: f64 = -2.0;

/// The largest robust parameter accepted by Briggs weighting (natural-like).
pub const ROBUST_MAX: f64 = 2.0;

/// The number of rays used to find the first null of the dirty beam when
/// estimating its area.
pub const DEFAULT_BEAM_AREA_NTHETA: usize = 24;

/// If the median reduced chi-squared of visibilities about their cell means
/// falls outside these bounds, the supplied weights are probably mis-scaled.
pub const SCATTER_WARNING_BOUNDS: (f64, f64) = (0.5, 2.0);
