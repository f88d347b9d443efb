// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff: reading visibilities, and writing images and datasets.

mod error;

pub use error::{FileWriteError, VisReadError};

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    cli::Warn,
    coords::GridCoords,
    dataset::GriddedDataset,
    gridding::{Gridder, GridderError},
};

lazy_static::lazy_static! {
    pub static ref VIS_INPUT_EXTENSIONS: String = VisInputType::iter().join(", ");
}

#[derive(Debug, Clone, Copy, Display, EnumIter, EnumString)]
pub enum VisInputType {
    #[strum(serialize = "json")]
    Json,

    #[strum(serialize = "toml")]
    Toml,
}

/// A column of a visibility file; either a single channel (1D) or many
/// channels (2D, `[chan][vis]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Column {
    Single(Vec<f64>),
    Multi(Vec<Vec<f64>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VisFile {
    uu: Column,
    vv: Column,
    weight: Column,
    data_re: Column,
    data_im: Column,
}

/// Visibilities read from a file. All arrays are `[chan, vis]`.
#[derive(Debug, Clone)]
pub struct VisibilityData {
    /// \[kλ\]
    pub uu: Array2<f64>,
    /// \[kλ\]
    pub vv: Array2<f64>,
    pub weight: Array2<f64>,
    /// \[Jy\]
    pub data_re: Array2<f64>,
    /// \[Jy\]
    pub data_im: Array2<f64>,
}

impl VisibilityData {
    pub fn nchan(&self) -> usize {
        self.uu.nrows()
    }

    pub fn nvis(&self) -> usize {
        self.uu.ncols()
    }

    /// Negate the imaginary parts of the visibilities. Data exported from
    /// CASA measurement sets need this before they're gridded.
    pub fn conjugate(&mut self) {
        self.data_im.mapv_inplace(|x| -x);
    }

    pub fn into_gridder(self, coords: GridCoords) -> Result<Gridder, GridderError> {
        Gridder::new(
            coords,
            self.uu.view(),
            self.vv.view(),
            self.weight.view(),
            self.data_re.view(),
            self.data_im.view(),
        )
    }
}

/// Read visibilities from a json or toml file. The file must have the keys
/// `uu`, `vv`, `weight`, `data_re` and `data_im`, each either a 1D array (a
/// single channel) or a 2D array of channels.
pub fn read_visibilities<P: AsRef<Path>>(file: P) -> Result<VisibilityData, VisReadError> {
    let file = file.as_ref();
    debug!("Reading visibilities from {}", file.display());

    let file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| VisInputType::from_str(&e).ok());
    let file_type = match file_type {
        Some(t) => t,
        None => {
            return Err(VisReadError::UnknownExtension {
                file: file.display().to_string(),
                valid: VIS_INPUT_EXTENSIONS.clone(),
            })
        }
    };

    let mut contents = String::new();
    let mut fh = File::open(file)?;
    fh.read_to_string(&mut contents)?;
    let vis_file: VisFile = match file_type {
        VisInputType::Json => {
            trace!("Parsing json file...");
            serde_json::from_str(&contents).map_err(|err| VisReadError::Json {
                file: file.display().to_string(),
                err,
            })?
        }
        VisInputType::Toml => {
            trace!("Parsing toml file...");
            toml::from_str(&contents).map_err(|err| VisReadError::Toml {
                file: file.display().to_string(),
                err,
            })?
        }
    };

    let to_array = |column: Column, key: &'static str| match column {
        Column::Single(v) => Ok(Array1::from(v).insert_axis(Axis(0))),
        Column::Multi(rows) => {
            let nrows = rows.len();
            let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
            if rows.iter().any(|r| r.len() != ncols) {
                return Err(VisReadError::Ragged {
                    file: file.display().to_string(),
                    key,
                });
            }
            Ok(Array2::from_shape_fn((nrows, ncols), |(r, c)| rows[r][c]))
        }
    };

    let VisFile {
        uu,
        vv,
        weight,
        data_re,
        data_im,
    } = vis_file;
    let data = VisibilityData {
        uu: to_array(uu, "uu")?,
        vv: to_array(vv, "vv")?,
        weight: to_array(weight, "weight")?,
        data_re: to_array(data_re, "data_re")?,
        data_im: to_array(data_im, "data_im")?,
    };
    debug!(
        "Read {} channel(s) of {} visibilities",
        data.nchan(),
        data.nvis()
    );
    Ok(data)
}

/// Write a `[chan, row, col]` cube as text. Each channel is written as a block
/// of whitespace-separated rows, preceded by a `# channel N` comment line.
pub fn write_text_cube<P: AsRef<Path>>(file: P, cube: ArrayView3<f64>) -> Result<(), FileWriteError> {
    let file = file.as_ref();
    trace!("Writing {:?} cube to {}", cube.dim(), file.display());

    let blocks: Vec<String> = cube
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(chan, plane)| {
            let mut block = format!("# channel {chan}\n");
            for row in plane.outer_iter() {
                block.push_str(&row.iter().map(|x| format!("{x:e}")).join(" "));
                block.push('\n');
            }
            block
        })
        .collect();

    let mut f = BufWriter::new(File::create(file)?);
    for block in blocks {
        f.write_all(block.as_bytes())?;
    }
    f.flush()?;
    Ok(())
}

/// Write a gridded dataset as json.
pub fn write_dataset_json<P: AsRef<Path>>(
    file: P,
    dataset: &GriddedDataset,
) -> Result<(), FileWriteError> {
    let file = file.as_ref();
    trace!("Writing dataset to {}", file.display());
    let f = BufWriter::new(File::create(file)?);
    serde_json::to_writer(f, dataset)?;
    Ok(())
}

/// Test whether we can write to `file`, creating any parent directories. A
/// warning is queued if the file already exists.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();
    match std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(file)
        .map_err(|e| e.kind())
    {
        Ok(_) => {
            // Don't leave an empty file behind if one didn't exist already.
            if !file_exists {
                std::fs::remove_file(file)?;
            }
        }

        // Attempt to make the directories leading up to the file.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => return Err(FileWriteError::IO(e.into())),
    }

    if file_exists {
        format!("Will overwrite the existing file '{}'", file.display()).warn();
    }
    Ok(())
}
