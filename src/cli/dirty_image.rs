// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, GridArgs, GridArgsError, GridParams, ARG_FILE_HELP};
use crate::{
    gridding::{ImageUnit, IMAGE_UNITS_COMMA_SEPARATED},
    io::{can_write_to_file, write_text_cube},
    MpolError,
};

lazy_static::lazy_static! {
    static ref UNIT_HELP: String =
        format!("The unit of the dirty image. Supported units: {}. Default: {}", *IMAGE_UNITS_COMMA_SEPARATED, ImageUnit::default());
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct DirtyImageArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(default)]
    pub(super) grid_args: GridArgs,

    #[clap(short, long, help = UNIT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) unit: Option<String>,

    /// The prefix of the output files. The dirty image is written to
    /// PREFIX_image.txt and the dirty beam to PREFIX_beam.txt, one block of
    /// text per channel.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

struct DirtyImageParams {
    grid_params: GridParams,
    unit: ImageUnit,
    image_file: PathBuf,
    beam_file: PathBuf,
}

impl DirtyImageArgs {
    /// Consolidate the command-line arguments with those of the arguments
    /// file, preferring those on the command line.
    pub(super) fn merge(self) -> Result<DirtyImageArgs, MpolError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let DirtyImageArgs {
                args_file: _,
                grid_args,
                unit,
                output,
            } = unpack_arg_file!(arg_file);

            Ok(DirtyImageArgs {
                args_file: None,
                grid_args: cli_args.grid_args.merge(grid_args),
                unit: cli_args.unit.or(unit),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<DirtyImageParams, MpolError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            grid_args,
            unit,
            output,
        } = self;

        let output = output.ok_or(GridArgsError::NoOutput)?;
        let unit = match unit {
            Some(u) => ImageUnit::parse(&u)?,
            None => ImageUnit::default(),
        };
        let (image_file, beam_file) = output_files(&output);
        can_write_to_file(&image_file)?;
        can_write_to_file(&beam_file)?;

        let grid_params = grid_args.parse("Imaging")?;
        info!("Dirty image unit: {unit}");
        info!("Writing the dirty image to {}", image_file.display());
        info!("Writing the dirty beam to {}", beam_file.display());
        display_warnings();

        Ok(DirtyImageParams {
            grid_params,
            unit,
            image_file,
            beam_file,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), MpolError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let DirtyImageParams {
            grid_params:
                GridParams {
                    data,
                    coords,
                    weighting,
                    taper,
                },
            unit,
            image_file,
            beam_file,
        } = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let mut gridder = data.into_gridder(coords)?;
        let (image, beam) = gridder.get_dirty_image(weighting, unit, taper)?;
        display_warnings();

        write_text_cube(&image_file, image.view())?;
        info!("Wrote {}", image_file.display());
        write_text_cube(&beam_file, beam.view())?;
        info!("Wrote {}", beam_file.display());
        Ok(())
    }
}

/// Get the image and beam file names from an output prefix.
fn output_files(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut s = prefix.as_os_str().to_owned();
        s.push(suffix);
        PathBuf::from(s)
    };
    (with_suffix("_image.txt"), with_suffix("_beam.txt"))
}
