//! Portfolio photo grouping.
//!
//! Takes an unordered folder of job photos, groups the ones that show the
//! same project by average-hash similarity and picks a "before" and an
//! "after" shot for each group from an edge-density clutter score.

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::EngineConfig;
pub use crate::core::cluster::{Cluster, Clusterer, DEFAULT_HAMMING_THRESHOLD};
pub use crate::core::engine::{PortfolioEngine, build_portfolio};
pub use crate::core::features::{FeatureOutcome, Features, ImageRecord};
pub use crate::core::fingerprint::Fingerprint;
pub use crate::core::hero::{HeroSelection, select_hero_images};
pub use crate::core::inventory::{ImageInventory, InventoryEntry, ensure_directory};
pub use crate::core::ordering::{PortfolioGroup, rank_groups};
pub use crate::error::{ConfigError, FeatureError};
