// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;
use ndarray::prelude::*;

use mpol::{GridCoords, Gridder, ImageUnit, Weighting};

fn get_gridder(nchan: usize, nvis: usize, npix: usize) -> Gridder {
    let coords = GridCoords::new(0.005, npix).unwrap();
    let max = 0.9 * coords.max_grid();
    let uu = Array2::from_shape_fn((nchan, nvis), |(c, i)| {
        max * (1.3 * i as f64 + 0.01 * c as f64).sin()
    });
    let vv = Array2::from_shape_fn((nchan, nvis), |(c, i)| {
        max * (0.7 * i as f64 - 0.02 * c as f64).cos()
    });
    let weight = Array2::from_shape_fn((nchan, nvis), |(_, i)| 1.0 + (i % 7) as f64);
    let data_re = Array2::from_shape_fn((nchan, nvis), |(_, i)| (0.1 * i as f64).cos());
    let data_im = Array2::from_shape_fn((nchan, nvis), |(_, i)| (0.1 * i as f64).sin());
    Gridder::new(
        coords,
        uu.view(),
        vv.view(),
        weight.view(),
        data_re.view(),
        data_im.view(),
    )
    .unwrap()
}

fn gridding(c: &mut Criterion) {
    let mut gridder = get_gridder(4, 100_000, 256);
    c.bench_function("grid 4x100000 visibilities (briggs)", |b| {
        b.iter(|| {
            gridder
                .grid_visibilities(Weighting::Briggs { robust: 0.0 }, None)
                .unwrap()
        })
    });

    c.bench_function("construct gridder, 4x100000 visibilities", |b| {
        b.iter(|| get_gridder(4, 100_000, 256))
    });
}

fn imaging(c: &mut Criterion) {
    let mut gridder = get_gridder(1, 10_000, 512);
    gridder.grid_visibilities(Weighting::Uniform, None).unwrap();
    c.bench_function("dirty image 512x512", |b| {
        b.iter(|| {
            gridder
                .get_dirty_image(Weighting::Uniform, ImageUnit::JyPerBeam, None)
                .unwrap()
        })
    });

    c.bench_function("dirty beam area 512x512", |b| {
        b.iter(|| gridder.get_dirty_beam_area(24).unwrap())
    });
}

criterion_group!(benches, gridding, imaging);
criterion_main!(benches);
