// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics; mostly FFT bookkeeping.


use ndarray::prelude::*;
use rustfft::FftPlanner;

use crate::c64;

/// Move the zero-frequency element of both axes from the centre of the array
/// to index 0, like numpy's `ifftshift`. For an axis of length `n`, element
/// `(i + n/2) % n` moves to `i`.
pub(crate) fn ifftshift_2d<T: Clone>(a: ArrayView2<T>) -> Array2<T> {
    let (nrows, ncols) = a.dim();
    Array2::from_shape_fn((nrows, ncols), |(j, i)| {
        a[[(j + nrows / 2) % nrows, (i + ncols / 2) % ncols]].clone()
    })
}

/// Perform an unnormalised, in-place inverse 2D FFT, i.e.
///
/// x\[m, n\] = Σ_{p, q} X\[p, q\] exp(+2πi (pm/M + qn/N))
///
/// The rows are transformed first, then the columns.
pub(crate) fn ifft2_unnormalised(grid: &mut Array2<c64>) {
    let (nrows, ncols) = grid.dim();
    if nrows == 0 || ncols == 0 {
        return;
    }
    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft_inverse(ncols);
    let mut buffer = vec![c64::default(); ncols];
    for mut row in grid.rows_mut() {
        buffer.iter_mut().zip(row.iter()).for_each(|(b, &r)| *b = r);
        row_fft.process(&mut buffer);
        row.iter_mut().zip(buffer.iter()).for_each(|(r, &b)| *r = b);
    }

    let col_fft = planner.plan_fft_inverse(nrows);
    let mut buffer = vec![c64::default(); nrows];
    for mut col in grid.columns_mut() {
        buffer.iter_mut().zip(col.iter()).for_each(|(b, &c)| *b = c);
        col_fft.process(&mut buffer);
        col.iter_mut().zip(buffer.iter()).for_each(|(c, &b)| *c = b);
    }
}

/// Get the median of the supplied values. NaNs are ignored. The input is
/// reordered.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    let mut n = 0;
    for i in 0..values.len() {
        if !values[i].is_nan() {
            values.swap(n, i);
            n += 1;
        }
    }
    let values = &mut values[..n];
    if values.is_empty() {
        return None;
    }

    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
