//! 64-bit average hash ("aHash") fingerprints.
//!
//! The image is shrunk to an 8×8 luminance grid and each cell becomes one
//! bit: set when the cell is brighter than the grid mean. Bits are packed
//! most-significant first in row-major order, so grid cell 0 is bit 63.

use image::GrayImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Side length of the hash grid. 8×8 = 64 bits = one `u64`.
pub const HASH_GRID: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Number of differing bits.
    pub fn hamming_distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// True when the two fingerprints differ in at most `threshold` bits.
    pub fn is_similar(&self, other: &Fingerprint, threshold: u32) -> bool {
        self.hamming_distance(other) <= threshold
    }
}

/// Compute the average hash of a luminance image.
pub fn average_hash(gray: &GrayImage) -> Fingerprint {
    let grid = imageops::resize(gray, HASH_GRID, HASH_GRID, FilterType::CatmullRom);
    let cells = grid.as_raw();
    let mean = cells.iter().map(|&v| f64::from(v)).sum::<f64>() / cells.len() as f64;

    let bits = cells
        .iter()
        .fold(0u64, |acc, &v| (acc << 1) | u64::from(f64::from(v) > mean));
    Fingerprint(bits)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Fingerprint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Fingerprint)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}
