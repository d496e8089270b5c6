//! Per-file feature extraction: average-hash fingerprint plus clutter score.
//!
//! Every inventory entry produces exactly one [`ImageRecord`]. Files that
//! cannot be decoded still get a record, with no fingerprint and a zero
//! clutter score, so they surface downstream as inert singleton groups.

use crate::core::fingerprint::{Fingerprint, average_hash};
use crate::core::inventory::InventoryEntry;
use crate::error::FeatureError;
use image::{GrayImage, ImageReader};
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Side length of the square canvas the clutter score is measured on.
pub const CLUTTER_CANVAS: u32 = 256;

/// 3×3 "find edges" kernel: centre 8, every neighbour -1.
const EDGE_KERNEL: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub fingerprint: Fingerprint,
    pub clutter_score: f64,
}

/// Result of analysing one file. `Degraded` keeps the file in play with
/// neutral features instead of dropping it.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutcome {
    Extracted(Features),
    Degraded { reason: String },
}

impl From<Result<Features, FeatureError>> for FeatureOutcome {
    fn from(result: Result<Features, FeatureError>) -> Self {
        match result {
            Ok(features) => FeatureOutcome::Extracted(features),
            Err(e) => FeatureOutcome::Degraded {
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub path: PathBuf,
    pub modified_at: SystemTime,
    pub fingerprint: Option<Fingerprint>,
    pub clutter_score: f64,
}

impl ImageRecord {
    pub fn new(entry: &InventoryEntry, outcome: FeatureOutcome) -> Self {
        let (fingerprint, clutter_score) = match outcome {
            FeatureOutcome::Extracted(features) => {
                (Some(features.fingerprint), features.clutter_score)
            }
            FeatureOutcome::Degraded { .. } => (None, 0.0),
        };

        Self {
            filename: entry.filename.clone(),
            path: entry.path.clone(),
            modified_at: entry.modified_at,
            fingerprint,
            clutter_score,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.fingerprint.is_none()
    }
}

/// Decode `path` once and compute both features from its luminance.
///
/// The format is sniffed from the file contents, so a misnamed file still
/// decodes.
pub fn extract_features(path: &Path) -> Result<Features, FeatureError> {
    let gray = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_luma8();
    Ok(Features {
        fingerprint: average_hash(&gray),
        clutter_score: clutter_score(&gray),
    })
}

/// Extract features for one inventory entry, never failing.
///
/// Decode errors and panics inside the decoder are both turned into a
/// degraded record.
pub fn analyze(entry: &InventoryEntry) -> ImageRecord {
    let result = panic::catch_unwind(AssertUnwindSafe(|| extract_features(&entry.path)))
        .unwrap_or_else(|payload| {
            Err(FeatureError::Panicked {
                message: panic_message(payload.as_ref()),
            })
        });

    let outcome = FeatureOutcome::from(result);
    if let FeatureOutcome::Degraded { reason } = &outcome {
        log::warn!(
            "Could not analyse {}, keeping it without features: {}",
            entry.path.display(),
            reason
        );
    }
    ImageRecord::new(entry, outcome)
}

/// Mean absolute edge response on a 256×256 luminance canvas.
///
/// Busy, half-finished scenes score high; clean finished work scores low.
pub fn clutter_score(gray: &GrayImage) -> f64 {
    let canvas = imageops::resize(gray, CLUTTER_CANVAS, CLUTTER_CANVAS, FilterType::CatmullRom);
    mean_edge_response(&canvas)
}

/// Mean of |EDGE_KERNEL * image| over every pixel. Out-of-bounds
/// neighbours are clamped to the nearest edge pixel.
fn mean_edge_response(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let max_x = i64::from(width) - 1;
    let max_y = i64::from(height) - 1;
    let mut sum = 0.0;

    for y in 0..height {
        for x in 0..width {
            let mut response = 0i32;
            for (ky, row) in EDGE_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let px = (i64::from(x) + kx as i64 - 1).clamp(0, max_x) as u32;
                    let py = (i64::from(y) + ky as i64 - 1).clamp(0, max_y) as u32;
                    response += weight * i32::from(gray.get_pixel(px, py)[0]);
                }
            }
            sum += f64::from(response.abs());
        }
    }

    sum / (f64::from(width) * f64::from(height))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
