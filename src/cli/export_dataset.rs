// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, GridArgs, GridArgsError, GridParams, ARG_FILE_HELP};
use crate::{
    io::{can_write_to_file, write_dataset_json},
    MpolError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ExportDatasetArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(default)]
    pub(super) grid_args: GridArgs,

    /// Write the gridded arrays in FFT ("packed") order, with the zero
    /// spatial frequency at index 0, rather than centred.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) packed: bool,

    /// The path of the output dataset (json).
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl ExportDatasetArgs {
    pub(super) fn merge(self) -> Result<ExportDatasetArgs, MpolError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let ExportDatasetArgs {
                args_file: _,
                grid_args,
                packed,
                output,
            } = unpack_arg_file!(arg_file);

            Ok(ExportDatasetArgs {
                args_file: None,
                grid_args: cli_args.grid_args.merge(grid_args),
                packed: cli_args.packed || packed,
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), MpolError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);

        let Self {
            args_file: _,
            grid_args,
            packed,
            output,
        } = self;
        let output = output.ok_or(GridArgsError::NoOutput)?;
        can_write_to_file(&output)?;
        let GridParams {
            data,
            coords,
            weighting,
            taper,
        } = grid_args.parse("Exporting")?;
        if packed {
            info!("Writing the dataset in packed order");
        }
        display_warnings();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let mut gridder = data.into_gridder(coords)?;
        gridder.grid_visibilities(weighting, taper)?;
        let dataset = gridder.to_dataset()?;
        let dataset = if packed { dataset.packed() } else { dataset };
        info!(
            "{} occupied cells over {} channel(s)",
            dataset.num_occupied(),
            dataset.nchan
        );
        write_dataset_json(&output, &dataset)?;
        info!("Wrote {}", output.display());
        Ok(())
    }
}
