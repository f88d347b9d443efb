// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use mpol::GriddedDataset;

use crate::{mpol, write_point_source_vis};

fn read_dataset(file: &std::path::Path) -> GriddedDataset {
    let contents = std::fs::read_to_string(file).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn test_export_dataset() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 2);
    let output = tmp_dir.path().join("out").join("dataset.json");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "export-dataset",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "export-dataset failed: {}", cmd.err().unwrap());

    let dataset = read_dataset(&output);
    assert_eq!(dataset.nchan, 2);
    assert_eq!(dataset.coords.npix(), 64);
    assert_abs_diff_eq!(dataset.coords.cell_size(), 0.01);
    assert_eq!(dataset.vis_gridded.dim(), (2, 64, 64));
    assert!(dataset.num_occupied() > 0);
    // Every occupied cell of a point source at the phase centre is 1 Jy.
    for vis in dataset.vis_indexed() {
        assert_abs_diff_eq!(vis.re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vis.im, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_export_dataset_packed() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let centred = tmp_dir.path().join("centred.json");
    let packed = tmp_dir.path().join("packed.json");

    for (output, extra) in [(&centred, None), (&packed, Some("--packed"))] {
        let vis = vis.display().to_string();
        let output = output.display().to_string();
        #[rustfmt::skip]
        let args = [
            "export-dataset",
            "--data", vis.as_str(),
            "--cell-size", "10mas",
            "--npix", "64",
            "-o", output.as_str(),
        ];
        let mut cmd = mpol();
        cmd.args(args);
        if let Some(extra) = extra {
            cmd.arg(extra);
        }
        let result = cmd.ok();
        assert!(result.is_ok(), "export-dataset failed: {}", result.err().unwrap());
    }

    let centred = read_dataset(&centred);
    let packed = read_dataset(&packed);
    assert_eq!(centred.num_occupied(), packed.num_occupied());
    for v in 0..64 {
        for u in 0..64 {
            assert_eq!(
                packed.mask[[0, v, u]],
                centred.mask[[0, (v + 32) % 64, (u + 32) % 64]]
            );
        }
    }
}
