// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use tempfile::{Builder, NamedTempFile};

use super::*;
use crate::gridding::Weighting;

fn get_vis_file() -> NamedTempFile {
    let mut f = Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(
        br#"{"uu": [10.0, -20.0, 5.0], "vv": [5.0, 30.0, -8.0], "weight": [1.0, 2.0, 1.0], "data_re": [1.0, 0.5, 0.2], "data_im": [0.0, 0.1, -0.3]}"#,
    )
    .unwrap();
    f.flush().unwrap();
    f
}

fn get_args(file: &NamedTempFile) -> GridArgs {
    GridArgs {
        data: Some(file.path().to_path_buf()),
        cell_size: Some("10mas".to_string()),
        npix: Some(64),
        ..Default::default()
    }
}

#[test]
fn test_merge_prefers_self() {
    let cli = GridArgs {
        npix: Some(128),
        weighting: Some("natural".to_string()),
        ..Default::default()
    };
    let file = GridArgs {
        data: Some(PathBuf::from("vis.json")),
        npix: Some(256),
        weighting: Some("uniform".to_string()),
        casa_convention: true,
        ..Default::default()
    };
    let merged = cli.merge(file);
    assert_eq!(
        merged,
        GridArgs {
            data: Some(PathBuf::from("vis.json")),
            casa_convention: true,
            npix: Some(128),
            weighting: Some("natural".to_string()),
            ..Default::default()
        }
    );
}

#[test]
fn test_parse() {
    let f = get_vis_file();
    let params = get_args(&f).parse("Testing").unwrap();
    assert_abs_diff_eq!(params.coords.cell_size(), 0.01);
    assert_eq!(params.coords.npix(), 64);
    // Uniform is the default.
    assert_eq!(params.weighting, Weighting::Uniform);
    assert!(params.taper.is_none());
    assert_eq!(params.data.nvis(), 3);
    assert_abs_diff_eq!(params.data.data_im[[0, 2]], -0.3);

    let params = GridArgs {
        weighting: Some("briggs".to_string()),
        robust: Some(-0.5),
        taper_fwhm: Some("20mas".to_string()),
        casa_convention: true,
        ..get_args(&f)
    }
    .parse("Testing")
    .unwrap();
    assert_eq!(params.weighting, Weighting::Briggs { robust: -0.5 });
    assert_abs_diff_eq!(params.taper.unwrap().fwhm(), 0.02);
    assert_abs_diff_eq!(params.data.data_im[[0, 2]], 0.3);
}

#[test]
fn test_parse_errors() {
    let f = get_vis_file();

    let result = GridArgs {
        data: None,
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Args(_))));

    let result = GridArgs {
        npix: None,
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Args(_))));

    let result = GridArgs {
        cell_size: Some("10 parsecs".to_string()),
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Args(_))));

    let result = GridArgs {
        npix: Some(63),
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Coords(_))));

    let result = GridArgs {
        weighting: Some("briggs".to_string()),
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Args(_))));

    // The cells are too big for the data.
    let result = GridArgs {
        cell_size: Some("100arcsec".to_string()),
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Coords(_))));

    let result = GridArgs {
        data: Some(PathBuf::from("/does/not/exist.json")),
        ..get_args(&f)
    }
    .parse("Testing");
    assert!(matches!(result, Err(MpolError::Generic(_))));
}
