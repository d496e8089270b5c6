use crate::core::cluster::DEFAULT_HAMMING_THRESHOLD;
use crate::core::inventory::DEFAULT_EXTENSIONS;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fingerprint width in bits; thresholds above this can never reject a pair.
const FINGERPRINT_BITS: u32 = 64;

/// Settings for one engine run. Passed in explicitly; the library never
/// looks up configuration on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum Hamming distance at which a photo joins an existing group.
    pub hamming_threshold: u32,
    /// Lowercase file extensions (without the dot) treated as images.
    pub extensions: Vec<String>,
    /// Run feature extraction on the rayon pool.
    pub parallel: bool,
    /// Create the photo directory when it does not exist.
    pub create_missing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hamming_threshold: DEFAULT_HAMMING_THRESHOLD,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            parallel: true,
            create_missing: false,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Missing keys take their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/portfolio-sort/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("portfolio-sort").join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hamming_threshold > FINGERPRINT_BITS {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.hamming_threshold,
            });
        }
        Ok(())
    }
}
