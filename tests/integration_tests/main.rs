// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod dirty_image;
mod export_dataset;
mod no_stderr;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn mpol() -> Command {
    Command::cargo_bin("mpol").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a json file of visibilities of a 1 Jy point source at the phase
/// centre. The spatial frequencies fit on a grid of 64 pixels of 10 mas.
fn write_point_source_vis(dir: &Path, nchan: usize) -> PathBuf {
    let nvis = 300;
    let column = |f: &dyn Fn(usize, usize) -> f64| -> serde_json::Value {
        (0..nchan)
            .map(|c| (0..nvis).map(|i| f(c, i)).collect::<Vec<f64>>())
            .collect::<Vec<_>>()
            .into()
    };
    let json = serde_json::json!({
        "uu": column(&|c, i| 3000.0 * (1.7 * i as f64 + 0.1 * c as f64).sin()),
        "vv": column(&|c, i| 3000.0 * (2.3 * i as f64 + 0.4).cos()),
        "weight": column(&|_, i| 1.0 + (i % 3) as f64),
        "data_re": column(&|_, _| 1.0),
        "data_im": column(&|_, _| 0.0),
    });
    let file = dir.join("vis.json");
    std::fs::write(&file, json.to_string()).unwrap();
    file
}

/// Read a text cube written by `mpol`.
fn read_text_cube(file: &Path) -> Vec<Vec<Vec<f64>>> {
    let contents = std::fs::read_to_string(file).unwrap();
    let mut cube: Vec<Vec<Vec<f64>>> = vec![];
    for line in contents.lines() {
        if line.starts_with('#') {
            cube.push(vec![]);
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|x| x.parse().unwrap())
            .collect();
        cube.last_mut().unwrap().push(row);
    }
    cube
}
