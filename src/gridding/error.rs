// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::{IMAGE_UNITS_COMMA_SEPARATED, WEIGHTING_TYPES_COMMA_SEPARATED};
use crate::constants::{ROBUST_MAX, ROBUST_MIN};

#[derive(Error, Debug)]
pub enum GridderError {
    #[error(transparent)]
    Coords(#[from] crate::coords::CoordsError),

    #[error("The shape of '{name}' ({got:?}) doesn't match the shape of 'uu' ({expected:?})")]
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("No visibilities were supplied")]
    NoVisibilities,

    #[error("'{0}' contains non-finite values")]
    NonFinite(&'static str),

    #[error("Visibility weights must be non-negative; found {0}")]
    NegativeWeight(f64),

    #[error("All of the visibility weights in channel {chan} are zero")]
    ZeroWeight { chan: usize },

    #[error("The spatial frequency ({u}, {v}) kλ doesn't land on the grid")]
    OffGrid { u: f64, v: f64 },

    #[error("Unknown weighting '{0}'; supported weightings are: {}", *WEIGHTING_TYPES_COMMA_SEPARATED)]
    UnknownWeighting(String),

    #[error("Briggs weighting requires a robust value in the range [{ROBUST_MIN}, {ROBUST_MAX}]")]
    RobustRequired,

    #[error("The robust value must be in the range [{ROBUST_MIN}, {ROBUST_MAX}]; got {0}")]
    RobustOutOfRange(f64),

    #[error("Unknown image unit '{0}'; supported units are: {}", *IMAGE_UNITS_COMMA_SEPARATED)]
    UnknownUnit(String),

    #[error("The taper FWHM must be a positive number of arcseconds; got {0}")]
    Taper(f64),

    #[error("The visibilities haven't been gridded yet")]
    NotGridded,

    #[error("Couldn't determine the area of the dirty beam in channel {chan}; is the beam main lobe resolved by the pixels?")]
    BeamArea { chan: usize },
}
