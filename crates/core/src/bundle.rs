//! Carrier bundle sizes.
//!
//! The provider only sells a fixed catalogue of bundle sizes. Reward face
//! values that are not sold directly are fulfilled by repeat-sending a
//! smaller unit (see [`crate::reward`]); this module only knows the
//! catalogue itself and the amount-based fallback mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A bundle size the provider actually sells.
///
/// Cost column is the official 2024 pricing, supplied as static
/// configuration:
///
/// | Bundle | Ksh  |
/// |--------|------|
/// | 50MB   | 10   |
/// | 100MB  | 20   |
/// | 250MB  | 50   |
/// | 500MB  | 100  |
/// | 1GB    | 205  |
/// | 5GB    | 1025 |
/// | 10GB   | 2050 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleSize {
    #[serde(rename = "50MB")]
    Mb50,
    #[serde(rename = "100MB")]
    Mb100,
    #[serde(rename = "250MB")]
    Mb250,
    #[serde(rename = "500MB")]
    Mb500,
    #[serde(rename = "1GB")]
    Gb1,
    #[serde(rename = "5GB")]
    Gb5,
    #[serde(rename = "10GB")]
    Gb10,
}

impl BundleSize {
    /// Map a reward face value (in MB) to the supported bundle closest
    /// from above. Monotonic step function; never fails.
    pub fn for_amount_mb(amount_mb: u32) -> BundleSize {
        match amount_mb {
            0..=100 => BundleSize::Mb50,
            101..=250 => BundleSize::Mb250,
            251..=500 => BundleSize::Mb500,
            501..=1000 => BundleSize::Gb1,
            1001..=5000 => BundleSize::Gb5,
            _ => BundleSize::Gb10,
        }
    }

    /// The catalogue label, e.g. `"50MB"` or `"1GB"`.
    pub fn as_str(self) -> &'static str {
        match self {
            BundleSize::Mb50 => "50MB",
            BundleSize::Mb100 => "100MB",
            BundleSize::Mb250 => "250MB",
            BundleSize::Mb500 => "500MB",
            BundleSize::Gb1 => "1GB",
            BundleSize::Gb5 => "5GB",
            BundleSize::Gb10 => "10GB",
        }
    }

    /// Decompose into the `(quantity, unit)` pair the provider API expects.
    pub fn quantity_and_unit(self) -> (u32, &'static str) {
        match self {
            BundleSize::Mb50 => (50, "MB"),
            BundleSize::Mb100 => (100, "MB"),
            BundleSize::Mb250 => (250, "MB"),
            BundleSize::Mb500 => (500, "MB"),
            BundleSize::Gb1 => (1, "GB"),
            BundleSize::Gb5 => (5, "GB"),
            BundleSize::Gb10 => (10, "GB"),
        }
    }

    /// Size in MB, used when summing delivered face value.
    pub fn megabytes(self) -> u32 {
        match self {
            BundleSize::Mb50 => 50,
            BundleSize::Mb100 => 100,
            BundleSize::Mb250 => 250,
            BundleSize::Mb500 => 500,
            BundleSize::Gb1 => 1024,
            BundleSize::Gb5 => 5 * 1024,
            BundleSize::Gb10 => 10 * 1024,
        }
    }

    /// Cost in Kenyan shillings per send.
    pub fn cost_ksh(self) -> u32 {
        match self {
            BundleSize::Mb50 => 10,
            BundleSize::Mb100 => 20,
            BundleSize::Mb250 => 50,
            BundleSize::Mb500 => 100,
            BundleSize::Gb1 => 205,
            BundleSize::Gb5 => 1025,
            BundleSize::Gb10 => 2050,
        }
    }

    /// All catalogue entries, smallest first.
    pub fn all() -> [BundleSize; 7] {
        [
            BundleSize::Mb50,
            BundleSize::Mb100,
            BundleSize::Mb250,
            BundleSize::Mb500,
            BundleSize::Gb1,
            BundleSize::Gb5,
            BundleSize::Gb10,
        ]
    }
}

impl fmt::Display for BundleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "50MB" => Ok(BundleSize::Mb50),
            "100MB" => Ok(BundleSize::Mb100),
            "250MB" => Ok(BundleSize::Mb250),
            "500MB" => Ok(BundleSize::Mb500),
            "1GB" => Ok(BundleSize::Gb1),
            "5GB" => Ok(BundleSize::Gb5),
            "10GB" => Ok(BundleSize::Gb10),
            other => Err(CoreError::Validation(format!(
                "Invalid bundle size: {other}. Expected one of 50MB, 100MB, \
                 250MB, 500MB, 1GB, 5GB, 10GB"
            ))),
        }
    }
}
