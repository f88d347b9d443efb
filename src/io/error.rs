// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisReadError {
    #[error("Visibility file '{file}' doesn't have a recognised file extension! Valid extensions are: {valid}")]
    UnknownExtension { file: String, valid: String },

    #[error("Couldn't decode json structure from '{file}': {err}")]
    Json {
        file: String,
        err: serde_json::Error,
    },

    #[error("Couldn't decode toml structure from '{file}': {err}")]
    Toml { file: String, err: toml::de::Error },

    #[error("In visibility file '{file}', the rows of '{key}' don't all have the same length")]
    Ragged { file: String, key: &'static str },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FileWriteError {
    #[error("Cannot write to the specified file '{file}'. Do you have write permissions set?")]
    FileNotWritable { file: String },

    #[error(
        "Couldn't create directory '{0}' for output files. Do you have write permissions set?"
    )]
    NewDirectory(PathBuf),

    #[error("Couldn't serialise to json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
