//! Canonical nameplate fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Electrical rating printed on a photovoltaic module nameplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    /// Open-circuit voltage.
    Voc,
    /// Short-circuit current.
    Isc,
    /// Maximum power.
    Pmax,
    /// Voltage at the maximum power point.
    Vpm,
    /// Current at the maximum power point.
    Ipm,
}

impl CanonicalField {
    /// All fields in nameplate order.
    pub const ALL: [CanonicalField; 5] = [Self::Voc, Self::Isc, Self::Pmax, Self::Vpm, Self::Ipm];

    /// Canonical name, as used for output keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voc => "Voc",
            Self::Isc => "Isc",
            Self::Pmax => "Pmax",
            Self::Vpm => "Vpm",
            Self::Ipm => "Ipm",
        }
    }

    /// Nominal unit of the rating.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Voc | Self::Vpm => "V",
            Self::Isc | Self::Ipm => "A",
            Self::Pmax => "W",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Voc => "Open-circuit voltage",
            Self::Isc => "Short-circuit current",
            Self::Pmax => "Maximum power",
            Self::Vpm => "Voltage at max power",
            Self::Ipm => "Current at max power",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ExtractionError::UnknownField(name.to_string()))
    }
}
