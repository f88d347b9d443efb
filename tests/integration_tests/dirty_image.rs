// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::formatdoc;
use tempfile::TempDir;

use crate::{get_cmd_output, mpol, read_text_cube, write_point_source_vis};

#[test]
fn test_dirty_image_of_point_source() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 2);
    let prefix = tmp_dir.path().join("point");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "--weighting", "briggs",
            "--robust", "-1",
            "--output", &prefix.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "dirty-image failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("dirty-image complete"), "{stdout}");

    let image = read_text_cube(&tmp_dir.path().join("point_image.txt"));
    let beam = read_text_cube(&tmp_dir.path().join("point_beam.txt"));
    assert_eq!(image.len(), 2);
    assert_eq!(beam.len(), 2);
    for (image, beam) in image.iter().zip(beam.iter()) {
        assert_eq!(image.len(), 64);
        assert!(image.iter().all(|row| row.len() == 64));
        // A point source at the phase centre looks like the beam.
        assert_abs_diff_eq!(image[32][32], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(beam[32][32], 1.0, epsilon = 1e-10);
        for (image_row, beam_row) in image.iter().zip(beam.iter()) {
            for (i, b) in image_row.iter().zip(beam_row.iter()) {
                assert_abs_diff_eq!(i, b, epsilon = 1e-10);
            }
        }
    }
}

#[test]
fn test_dirty_image_with_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let prefix = tmp_dir.path().join("from_file");
    let arg_file = tmp_dir.path().join("args.toml");
    std::fs::write(
        &arg_file,
        formatdoc! {r#"
            unit = "Jy/arcsec^2"
            output = "{prefix}"

            [grid_args]
            data = "{vis}"
            cell_size = "0.01arcsec"
            npix = 32
            weighting = "natural"
        "#,
            prefix = prefix.display(),
            vis = vis.display(),
        },
    )
    .unwrap();
    let saved_args = tmp_dir.path().join("saved.toml");

    // The CLI's npix overrides the file's.
    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            &arg_file.display().to_string(),
            "--npix", "48",
            "--save-toml", &saved_args.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "dirty-image failed: {}", cmd.err().unwrap());

    let image = read_text_cube(&tmp_dir.path().join("from_file_image.txt"));
    assert_eq!(image.len(), 1);
    assert_eq!(image[0].len(), 48);
    // In Jy/arcsec^2, the peak is 1 / (the beam area).
    assert!(image[0][24][24] > 1.0);

    let saved = std::fs::read_to_string(&saved_args).unwrap();
    assert!(saved.contains("npix = 48"), "{saved}");
    assert!(saved.contains("natural"), "{saved}");
}

#[test]
fn test_dirty_image_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let prefix = tmp_dir.path().join("dry");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "-o", &prefix.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "dirty-image failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!tmp_dir.path().join("dry_image.txt").exists());
    assert!(!tmp_dir.path().join("dry_beam.txt").exists());
}

#[test]
fn test_dirty_image_bad_robust() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let prefix = tmp_dir.path().join("bad");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            "--data", &vis.display().to_string(),
            "--cell-size", "10mas",
            "--npix", "64",
            "--weighting", "briggs",
            "--robust", "3",
            "-o", &prefix.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("robust"), "{stderr}");
}

#[test]
fn test_dirty_image_data_does_not_fit() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let vis = write_point_source_vis(tmp_dir.path(), 1);
    let prefix = tmp_dir.path().join("big_cells");

    #[rustfmt::skip]
    let cmd = mpol()
        .args([
            "dirty-image",
            "--data", &vis.display().to_string(),
            "--cell-size", "1",
            "--npix", "64",
            "-o", &prefix.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Decrease the cell size"), "{stderr}");
}
