// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, mpol, write_point_source_vis};

#[test]
fn test_dirty_image_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let prefix = tmp_dir.path().join("img");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "--taper-fwhm", "30mas",
            "-o", &prefix.display().to_string(),
            "-vv",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "dirty-image failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_export_dataset_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let output = tmp_dir.path().join("dataset.json");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "export-dataset",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "--weighting", "natural",
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "export-dataset failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
