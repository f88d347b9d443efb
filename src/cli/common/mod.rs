// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both `dirty-image` and
//! `export-dataset` read visibilities and grid them, so those arguments are
//! shared between them.

mod printers;
#[cfg(test)]
mod tests;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::MpolError;
use crate::{
    coords::GridCoords,
    gridding::{GaussianTaper, Weighting, WEIGHTING_TYPES_COMMA_SEPARATED},
    io::{read_visibilities, VisibilityData, VIS_INPUT_EXTENSIONS},
    unit_parsing::parse_angle_arcsec,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref DATA_HELP: String =
        format!("Path to the visibilities. Supported formats: {}", *VIS_INPUT_EXTENSIONS);

    static ref WEIGHTING_HELP: String =
        format!("The visibility weighting scheme. Supported schemes: {}. Default: {DEFAULT_WEIGHTING}", *WEIGHTING_TYPES_COMMA_SEPARATED);
}

const DEFAULT_WEIGHTING: &str = "uniform";

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(MpolError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(MpolError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(MpolError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments for reading visibilities and gridding them.
#[derive(Args, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct GridArgs {
    #[clap(short, long, help = DATA_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(super) data: Option<PathBuf>,

    /// The visibilities follow the CASA sign convention; negate their
    /// imaginary parts before gridding.
    #[clap(long, help_heading = "INPUT DATA")]
    #[serde(default)]
    pub(super) casa_convention: bool,

    /// The width of an image pixel. A unit can be given (e.g. 5mas, 0.01arcsec,
    /// 1e-6deg); a naked number is in arcseconds.
    #[clap(short, long, help_heading = "GRID")]
    pub(super) cell_size: Option<String>,

    /// The number of pixels along each side of the image. Must be even.
    #[clap(short, long, help_heading = "GRID")]
    pub(super) npix: Option<usize>,

    #[clap(short, long, help = WEIGHTING_HELP.as_str(), help_heading = "WEIGHTING")]
    pub(super) weighting: Option<String>,

    /// The robust parameter of Briggs weighting, within [-2, 2]. Required
    /// for (and only used by) Briggs weighting.
    #[clap(short, long, allow_hyphen_values = true, help_heading = "WEIGHTING")]
    pub(super) robust: Option<f64>,

    /// Taper the visibilities with a Gaussian whose image-plane FWHM is this
    /// angle. A unit can be given; a naked number is in arcseconds.
    #[clap(long, help_heading = "WEIGHTING")]
    pub(super) taper_fwhm: Option<String>,
}

/// Gridding parameters, ready to use.
pub(super) struct GridParams {
    pub(super) data: VisibilityData,
    pub(super) coords: GridCoords,
    pub(super) weighting: Weighting,
    pub(super) taper: Option<GaussianTaper>,
}

impl GridArgs {
    /// Merge with another set of arguments (e.g. from an argument file),
    /// preferring `self`'s.
    pub(super) fn merge(self, other: GridArgs) -> GridArgs {
        GridArgs {
            data: self.data.or(other.data),
            casa_convention: self.casa_convention || other.casa_convention,
            cell_size: self.cell_size.or(other.cell_size),
            npix: self.npix.or(other.npix),
            weighting: self.weighting.or(other.weighting),
            robust: self.robust.or(other.robust),
            taper_fwhm: self.taper_fwhm.or(other.taper_fwhm),
        }
    }

    pub(super) fn parse(self, action: &'static str) -> Result<GridParams, MpolError> {
        trace!("{:#?}", self);
        let GridArgs {
            data,
            casa_convention,
            cell_size,
            npix,
            weighting,
            robust,
            taper_fwhm,
        } = self;

        let file = data.ok_or(GridArgsError::NoData)?;
        let cell_size = cell_size.ok_or(GridArgsError::NoCellSize)?;
        let npix = npix.ok_or(GridArgsError::NoNpix)?;

        let cell_size = parse_angle_arcsec(&cell_size)?;
        let coords = GridCoords::new(cell_size, npix)?;
        let weighting = Weighting::new(weighting.as_deref().unwrap_or(DEFAULT_WEIGHTING), robust)?;
        let taper = match taper_fwhm {
            Some(t) => Some(GaussianTaper::new(parse_angle_arcsec(&t)?)?),
            None => None,
        };

        let mut data = read_visibilities(&file)?;
        if casa_convention {
            debug!("Negating the imaginary parts of the visibilities");
            data.conjugate();
        }
        coords.check_data_fit(data.uu.iter(), data.vv.iter())?;

        let mut printer = InfoPrinter::new(format!("{action} visibilities").into());
        let mut input_block = vec![
            format!("Input: {}", file.display()).into(),
            format!(
                "{} channel(s) of {} visibilities",
                data.nchan(),
                data.nvis()
            )
            .into(),
        ];
        if casa_convention {
            input_block.push("Imaginary parts negated (CASA convention)".into());
        }
        printer.push_block(input_block);
        printer.push_block(vec![
            format!("{npix}x{npix} pixels of {cell_size} arcsec").into(),
            format!(
                "Max. spatial frequency: {:.3} kλ",
                coords.max_grid()
            )
            .into(),
        ]);
        let mut weighting_block = vec![format!("Weighting: {weighting}").into()];
        if let Some(t) = taper {
            weighting_block.push(format!("Gaussian taper: {} arcsec FWHM", t.fwhm()).into());
        }
        printer.push_block(weighting_block);
        printer.display();

        Ok(GridParams {
            data,
            coords,
            weighting,
            taper,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum GridArgsError {
    #[error("No visibilities were supplied (--data)")]
    NoData,

    #[error("No cell size was supplied (--cell-size)")]
    NoCellSize,

    #[error("The number of pixels wasn't supplied (--npix)")]
    NoNpix,

    #[error("No output was specified (--output)")]
    NoOutput,
}
