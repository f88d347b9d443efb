// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all mpol-related errors. This should be the *only* error
//! enum that is publicly visible from the binary.

use thiserror::Error;

use super::common::GridArgsError;
use crate::{
    coords::CoordsError,
    gridding::GridderError,
    io::{FileWriteError, VisReadError},
    unit_parsing::UnitParseError,
};

const URL: &str = "https://mpol-dev.github.io/MPoL";

/// The *only* publicly visible error from the `mpol` binary. Each error message
/// should include a hint (e.g. the documentation URL), unless it's "generic".
#[derive(Error, Debug)]
pub enum MpolError {
    /// An error related to the image and spatial-frequency grid.
    #[error("{0}\n\nSee for more info: {URL}")]
    Coords(String),

    /// An error related to gridding or weighting visibilities.
    #[error("{0}\n\nSee for more info: {URL}")]
    Gridding(String),

    /// An error related to reading visibilities.
    #[error("{0}\n\nVisibility files need the keys uu, vv, weight, data_re and data_im.")]
    VisRead(String),

    /// An error related to command-line or argument-file arguments.
    #[error("{0}\n\nTry --help for the list of arguments.")]
    Args(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<GridArgsError> for MpolError {
    fn from(e: GridArgsError) -> Self {
        Self::Args(e.to_string())
    }
}

impl From<UnitParseError> for MpolError {
    fn from(e: UnitParseError) -> Self {
        Self::Args(e.to_string())
    }
}

impl From<CoordsError> for MpolError {
    fn from(e: CoordsError) -> Self {
        Self::Coords(e.to_string())
    }
}

impl From<GridderError> for MpolError {
    fn from(e: GridderError) -> Self {
        let s = e.to_string();
        match e {
            GridderError::Coords(e) => Self::from(e),
            GridderError::ShapeMismatch { .. }
            | GridderError::NoVisibilities
            | GridderError::NonFinite(_)
            | GridderError::NegativeWeight(_)
            | GridderError::ZeroWeight { .. } => Self::VisRead(s),
            GridderError::UnknownWeighting(_)
            | GridderError::RobustRequired
            | GridderError::RobustOutOfRange(_)
            | GridderError::UnknownUnit(_)
            | GridderError::Taper(_) => Self::Args(s),
            GridderError::OffGrid { .. }
            | GridderError::NotGridded
            | GridderError::BeamArea { .. } => Self::Gridding(s),
        }
    }
}

impl From<VisReadError> for MpolError {
    fn from(e: VisReadError) -> Self {
        let s = e.to_string();
        match e {
            VisReadError::UnknownExtension { .. }
            | VisReadError::Json { .. }
            | VisReadError::Toml { .. }
            | VisReadError::Ragged { .. } => Self::VisRead(s),
            VisReadError::IO(e) => Self::from(e),
        }
    }
}

impl From<FileWriteError> for MpolError {
    fn from(e: FileWriteError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for MpolError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
