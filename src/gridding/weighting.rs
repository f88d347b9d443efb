// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibility weighting schemes, tapers and image units.

use std::str::FromStr;

use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::GridderError;
use crate::constants::{ARCSEC, LAMBDA_PER_KLAMBDA, LN_2, PI, ROBUST_MAX, ROBUST_MIN};

lazy_static::lazy_static! {
    pub static ref WEIGHTING_TYPES_COMMA_SEPARATED: String = WeightingType::iter().join(", ");

    pub static ref IMAGE_UNITS_COMMA_SEPARATED: String = ImageUnit::iter().join(", ");
}

/// The names of the supported weighting schemes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum WeightingType {
    Natural,
    Uniform,
    Briggs,
}

/// How visibilities are weighted when they're averaged onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Use the visibility weights as they are. Best point-source sensitivity.
    Natural,

    /// Every occupied grid cell gets the same total weight. Best resolution.
    Uniform,

    /// Briggs "robust" weighting, following the CASA definition. `robust` must
    /// be within [-2, 2]; -2 is close to uniform, 2 is close to natural.
    Briggs { robust: f64 },
}

impl Weighting {
    /// Make a weighting scheme from its name and an optional robust value.
    /// The robust value is required for Briggs weighting and ignored
    /// otherwise.
    pub fn new(name: &str, robust: Option<f64>) -> Result<Weighting, GridderError> {
        let weighting_type = WeightingType::from_str(name.trim())
            .map_err(|_| GridderError::UnknownWeighting(name.to_string()))?;
        match (weighting_type, robust) {
            (WeightingType::Briggs, None) => Err(GridderError::RobustRequired),
            (WeightingType::Briggs, Some(robust)) => Weighting::briggs(robust),
            (weighting_type, robust) => {
                if let Some(robust) = robust {
                    warn!("A robust value ({robust}) was supplied, but it is only used with briggs weighting; ignoring it");
                }
                Ok(match weighting_type {
                    WeightingType::Natural => Weighting::Natural,
                    _ => Weighting::Uniform,
                })
            }
        }
    }

    /// Briggs weighting with the supplied robust parameter.
    pub fn briggs(robust: f64) -> Result<Weighting, GridderError> {
        let w = Weighting::Briggs { robust };
        w.validate()?;
        Ok(w)
    }

    pub(super) fn validate(&self) -> Result<(), GridderError> {
        match self {
            Weighting::Briggs { robust }
                if !(ROBUST_MIN..=ROBUST_MAX).contains(robust) =>
            {
                Err(GridderError::RobustOutOfRange(*robust))
            }
            _ => Ok(()),
        }
    }

    pub fn weighting_type(&self) -> WeightingType {
        match self {
            Weighting::Natural => WeightingType::Natural,
            Weighting::Uniform => WeightingType::Uniform,
            Weighting::Briggs { .. } => WeightingType::Briggs,
        }
    }

    /// Get the density weights of a channel's visibilities. `weight` holds the
    /// visibility weights and `cell_weight` the sum of visibility weights in
    /// the cell that each visibility lands in.
    ///
    /// The imaging weight of a visibility is its density weight multiplied by
    /// its visibility weight.
    pub(super) fn density_weights(&self, weight: &[f64], cell_weight: &[f64]) -> Vec<f64> {
        match self {
            Weighting::Natural => vec![1.0; weight.len()],

            Weighting::Uniform => cell_weight
                .iter()
                .map(|&c| if c > 0.0 { 1.0 / c } else { 0.0 })
                .collect(),

            Weighting::Briggs { robust } => {
                // f^2 = (5 * 10^-R)^2 / (sum_k W_k^2 / sum_i w_i). Each visibility
                // contributes w_i * W_k to the sum over cells, which is the same
                // as summing W_k^2 over occupied cells.
                let sum_weight: f64 = weight.iter().sum();
                let sum_cell_weight_sq: f64 = weight
                    .iter()
                    .zip(cell_weight)
                    .map(|(&w, &c)| w * c)
                    .sum();
                let f_sq = (5.0 * 10_f64.powf(-robust)).powi(2)
                    / (sum_cell_weight_sq / sum_weight);
                cell_weight.iter().map(|&c| 1.0 / (1.0 + f_sq * c)).collect()
            }
        }
    }
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::Briggs { robust } => write!(f, "briggs (robust = {robust})"),
            w => write!(f, "{}", w.weighting_type()),
        }
    }
}

/// The flux-density unit of a dirty image.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ImageUnit {
    #[default]
    #[strum(serialize = "Jy/beam")]
    #[serde(rename = "Jy/beam")]
    JyPerBeam,

    /// The image is divided by the area of the dirty beam.
    #[strum(serialize = "Jy/arcsec^2")]
    #[serde(rename = "Jy/arcsec^2")]
    JyPerArcsec2,
}

impl ImageUnit {
    pub fn parse(s: &str) -> Result<ImageUnit, GridderError> {
        ImageUnit::from_str(s.trim()).map_err(|_| GridderError::UnknownUnit(s.to_string()))
    }
}

/// A Gaussian taper of the visibilities, specified by the FWHM of the
/// equivalent image-plane Gaussian \[arcsec\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianTaper {
    fwhm: f64,
}

impl GaussianTaper {
    pub fn new(fwhm: f64) -> Result<GaussianTaper, GridderError> {
        if !fwhm.is_finite() || fwhm <= 0.0 {
            return Err(GridderError::Taper(fwhm));
        }
        Ok(GaussianTaper { fwhm })
    }

    /// The image-plane FWHM \[arcsec\].
    pub fn fwhm(&self) -> f64 {
        self.fwhm
    }

    /// The taper at spatial frequency (u, v) \[kλ\]. It is 1 at the origin.
    pub fn weight(&self, u: f64, v: f64) -> f64 {
        let theta = self.fwhm * ARCSEC;
        let q_sq = (u * u + v * v) * LAMBDA_PER_KLAMBDA * LAMBDA_PER_KLAMBDA;
        (-(PI * theta).powi(2) * q_sq / (4.0 * LN_2)).exp()
    }
}
