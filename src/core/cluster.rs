//! Greedy single-pass grouping of image records by fingerprint distance.
//!
//! Records are visited oldest first. Each joins the first existing cluster
//! whose representative is within the threshold, otherwise it starts a new
//! cluster. The representative is the first member's fingerprint and is
//! never recomputed, so results depend only on the chronological order.

use crate::core::features::ImageRecord;
use crate::core::fingerprint::Fingerprint;

/// Maximum differing bits (out of 64) for two photos to count as the same job.
pub const DEFAULT_HAMMING_THRESHOLD: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub representative: Option<Fingerprint>,
    /// Chronological insertion order.
    pub members: Vec<ImageRecord>,
}

impl Cluster {
    fn open(record: ImageRecord) -> Self {
        Self {
            representative: record.fingerprint,
            members: vec![record],
        }
    }

    /// Whether `fingerprint` may join. Absent fingerprints on either side
    /// never match.
    pub fn accepts(&self, fingerprint: Option<&Fingerprint>, threshold: u32) -> bool {
        match (self.representative.as_ref(), fingerprint) {
            (Some(rep), Some(fp)) => rep.is_similar(fp, threshold),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Clusterer {
    threshold: u32,
}

impl Clusterer {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Group `records`. Ties in modification time keep their input order.
    pub fn cluster(&self, mut records: Vec<ImageRecord>) -> Vec<Cluster> {
        records.sort_by_key(|r| r.modified_at);

        let mut clusters: Vec<Cluster> = Vec::new();
        for record in records {
            let target = clusters
                .iter()
                .position(|c| c.accepts(record.fingerprint.as_ref(), self.threshold));

            match target {
                Some(index) => clusters[index].members.push(record),
                None => clusters.push(Cluster::open(record)),
            }
        }

        log::debug!(
            "Formed {} cluster(s) at threshold {}",
            clusters.len(),
            self.threshold
        );
        for (index, cluster) in clusters.iter().enumerate() {
            log::debug!(
                "Cluster {}: representative={} members={}",
                index,
                cluster
                    .representative
                    .map_or_else(|| "none".to_string(), |fp| fp.to_string()),
                cluster.len()
            );
        }
        clusters
    }
}

impl Default for Clusterer {
    fn default() -> Self {
        Self::new(DEFAULT_HAMMING_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn record(name: &str, secs: u64, fingerprint: Option<u64>) -> ImageRecord {
        ImageRecord {
            filename: name.to_string(),
            path: PathBuf::from(name),
            modified_at: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            fingerprint: fingerprint.map(Fingerprint),
            clutter_score: 0.0,
        }
    }

    fn names(cluster: &Cluster) -> Vec<&str> {
        cluster.members.iter().map(|r| r.filename.as_str()).collect()
    }

    #[test]
    fn test_empty_input_gives_no_clusters() {
        assert!(Clusterer::default().cluster(Vec::new()).is_empty());
    }

    #[test]
    fn test_twelve_bit_difference_merges() {
        let records = vec![
            record("a.jpg", 1, Some(0)),
            record("b.jpg", 2, Some((1 << 12) - 1)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 1);
        assert_eq!(names(&clusters[0]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_thirteen_bit_difference_splits() {
        let records = vec![
            record("a.jpg", 1, Some(0)),
            record("b.jpg", 2, Some((1 << 13) - 1)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_processes_in_chronological_order() {
        let records = vec![
            record("late.jpg", 30, Some(0)),
            record("early.jpg", 10, Some(1)),
            record("middle.jpg", 20, Some(3)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 1);
        assert_eq!(names(&clusters[0]), vec!["early.jpg", "middle.jpg", "late.jpg"]);
        assert_eq!(clusters[0].representative, Some(Fingerprint(1)));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let records = vec![
            record("b.jpg", 5, Some(0)),
            record("a.jpg", 5, Some(0)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(names(&clusters[0]), vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_representative_is_first_member_not_centroid() {
        // c is 8 bits from b but 16 from the representative a.
        let a = 0u64;
        let b = 0xffu64;
        let c = 0xffffu64;
        let records = vec![
            record("a.jpg", 1, Some(a)),
            record("b.jpg", 2, Some(b)),
            record("c.jpg", 3, Some(c)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 2);
        assert_eq!(names(&clusters[0]), vec!["a.jpg", "b.jpg"]);
        assert_eq!(names(&clusters[1]), vec!["c.jpg"]);
    }

    #[test]
    fn test_joins_first_matching_cluster() {
        // d is within range of both representatives; the older cluster wins.
        let records = vec![
            record("a.jpg", 1, Some(0)),
            record("b.jpg", 2, Some(0xfff_fff)),
            record("d.jpg", 3, Some(0xfff)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 2);
        assert_eq!(names(&clusters[0]), vec!["a.jpg", "d.jpg"]);
        assert_eq!(names(&clusters[1]), vec!["b.jpg"]);
    }

    #[test]
    fn test_missing_fingerprints_stay_alone() {
        let records = vec![
            record("broken1.jpg", 1, None),
            record("ok.jpg", 2, Some(0)),
            record("broken2.jpg", 3, None),
            record("ok2.jpg", 4, Some(0)),
        ];
        let clusters = Clusterer::default().cluster(records);
        assert_eq!(clusters.len(), 3);
        assert_eq!(names(&clusters[0]), vec!["broken1.jpg"]);
        assert_eq!(clusters[0].representative, None);
        assert_eq!(names(&clusters[1]), vec!["ok.jpg", "ok2.jpg"]);
        assert_eq!(names(&clusters[2]), vec!["broken2.jpg"]);
    }

    #[test]
    fn test_custom_threshold() {
        let records = vec![
            record("a.jpg", 1, Some(0)),
            record("b.jpg", 2, Some(0b111)),
        ];
        assert_eq!(Clusterer::new(2).cluster(records.clone()).len(), 2);
        assert_eq!(Clusterer::new(3).cluster(records).len(), 1);
    }
}
