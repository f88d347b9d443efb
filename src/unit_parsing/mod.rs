// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;

pub use error::UnitParseError;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::constants::{ARCSEC_PER_DEG, ARCSEC_PER_MAS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[allow(non_camel_case_types)]
pub enum AngleFormat {
    /// Milliarcseconds
    mas,

    /// Arcseconds
    arcsec,

    /// Degrees
    deg,
}

impl AngleFormat {
    /// How many arcseconds are in one of this unit.
    pub fn to_arcsec(self) -> f64 {
        match self {
            AngleFormat::mas => ARCSEC_PER_MAS,
            AngleFormat::arcsec => 1.0,
            AngleFormat::deg => ARCSEC_PER_DEG,
        }
    }
}

/// Parse a string that may have a unit of angle attached to it. If there's no
/// unit, `None` is returned as the format.
pub fn parse_angle(s: &str) -> Result<(f64, Option<AngleFormat>), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, None));
    };

    // That didn't work; let's search over our supported formats.
    let suffix = s
        .trim()
        .trim_start_matches(|c| char::is_numeric(c) || c == '.' || c == '-' || c == '+' || c == 'e')
        .trim();
    for angle_format in AngleFormat::iter() {
        let angle_format_str: &'static str = angle_format.into();
        if suffix.to_lowercase() == angle_format_str {
            let prefix = s.trim().trim_end_matches(char::is_alphabetic).trim();
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotAngleUnitButCantParse {
                        input: s.to_string(),
                        unit: angle_format_str,
                    })
                }
            };
            return Ok((number, Some(angle_format)));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "angle",
    })
}

/// Parse an angle string and return the angle in arcseconds. A naked number is
/// assumed to already be in arcseconds.
pub fn parse_angle_arcsec(s: &str) -> Result<f64, UnitParseError> {
    let (number, format) = parse_angle(s)?;
    Ok(match format {
        Some(f) => number * f.to_arcsec(),
        None => number,
    })
}
