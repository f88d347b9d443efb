// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordsError {
    #[error("The cell size must be a positive number of arcseconds; got {0}")]
    CellSize(f64),

    #[error("The number of pixels must be a positive, even number; got {0}")]
    Npix(usize),

    #[error("The dataset contains spatial frequencies ({max_uv:.3} kλ) larger than the grid can hold ({max_grid:.3} kλ). Decrease the cell size to below {max_cell_size:.6} arcsec")]
    DataDoesNotFit {
        max_uv: f64,
        max_grid: f64,
        max_cell_size: f64,
    },
}
