//! End-to-end portfolio build: list, extract, cluster, order, rank.
//!
//! Nothing is cached between runs; every call recomputes from the current
//! directory listing. Extraction may run on the rayon pool; clustering and
//! ordering always run on the calling thread.

use crate::config::EngineConfig;
use crate::core::cluster::Clusterer;
use crate::core::features::{self, ImageRecord};
use crate::core::inventory::{ImageInventory, InventoryEntry, ensure_directory};
use crate::core::ordering::{PortfolioGroup, rank_groups};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Called with `(files_done, total_files)` after each file is analysed.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Sync);

pub struct PortfolioEngine {
    config: EngineConfig,
    inventory: ImageInventory,
    clusterer: Clusterer,
}

impl PortfolioEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inventory: ImageInventory::new(&config.extensions),
            clusterer: Clusterer::new(config.hamming_threshold),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked before/after groups for every image in `dir`.
    pub fn build(&self, dir: &Path) -> Vec<PortfolioGroup> {
        self.build_with_progress(dir, &|_, _| {})
    }

    pub fn build_with_progress(&self, dir: &Path, progress: ProgressFn<'_>) -> Vec<PortfolioGroup> {
        let records = self.analyze_with_progress(dir, progress);
        let total = records.len();

        let clusters = self.clusterer.cluster(records);
        let groups: Vec<PortfolioGroup> = clusters
            .iter()
            .filter_map(PortfolioGroup::from_cluster)
            .collect();

        log::info!(
            "Grouped {} image(s) from {} into {} project(s)",
            total,
            dir.display(),
            groups.len()
        );
        rank_groups(groups)
    }

    /// Inventory plus feature extraction only, in inventory (filename) order.
    pub fn analyze(&self, dir: &Path) -> Vec<ImageRecord> {
        self.analyze_with_progress(dir, &|_, _| {})
    }

    pub fn analyze_with_progress(&self, dir: &Path, progress: ProgressFn<'_>) -> Vec<ImageRecord> {
        if self.config.create_missing && !dir.exists() {
            if let Err(e) = ensure_directory(dir) {
                log::warn!("Could not create {}: {}", dir.display(), e);
            }
        }

        let entries = self.inventory.list(dir);
        let total = entries.len();
        let done = AtomicUsize::new(0);

        let analyze_one = |entry: &InventoryEntry| {
            let record = features::analyze(entry);
            log::debug!(
                "{}: fingerprint={:?} clutter={:.2}",
                record.filename,
                record.fingerprint.map(|fp| fp.to_string()),
                record.clutter_score
            );
            progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            record
        };

        let records: Vec<ImageRecord> = if self.config.parallel {
            entries.par_iter().map(analyze_one).collect()
        } else {
            entries.iter().map(analyze_one).collect()
        };

        let degraded = records.iter().filter(|r| r.is_degraded()).count();
        if degraded > 0 {
            log::info!("{} of {} image(s) could not be analysed", degraded, total);
        }
        records
    }
}

impl Default for PortfolioEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Build the portfolio for `dir` with the given similarity threshold and
/// otherwise default settings.
pub fn build_portfolio(dir: &Path, hamming_threshold: u32) -> Vec<PortfolioGroup> {
    PortfolioEngine::new(EngineConfig {
        hamming_threshold,
        ..EngineConfig::default()
    })
    .build(dir)
}
