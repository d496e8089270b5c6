use crate::core::cluster::Cluster;
use crate::core::features::ImageRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One project as shown on the portfolio page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioGroup {
    /// Busiest shot (highest clutter score).
    pub before: String,
    /// Cleanest shot (lowest clutter score).
    pub after: String,
    /// Everything else, oldest first.
    pub extras: Vec<String>,
    /// Oldest modification time among all members.
    pub group_timestamp: DateTime<Utc>,
}

impl PortfolioGroup {
    /// Pick before/after by clutter score. Ties go to the older photo.
    ///
    /// A single-member cluster uses that photo for both sides. Returns
    /// `None` only for an empty cluster.
    pub fn from_cluster(cluster: &Cluster) -> Option<Self> {
        let members = &cluster.members;
        let oldest = members.iter().map(|r| r.modified_at).min()?;

        let mut before = 0;
        let mut after = 0;
        for (index, record) in members.iter().enumerate().skip(1) {
            if record.clutter_score > members[before].clutter_score {
                before = index;
            }
            if record.clutter_score < members[after].clutter_score {
                after = index;
            }
        }

        let mut extras: Vec<&ImageRecord> = members
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != before && *index != after)
            .map(|(_, record)| record)
            .collect();
        extras.sort_by_key(|r| r.modified_at);

        Some(Self {
            before: members[before].filename.clone(),
            after: members[after].filename.clone(),
            extras: extras.into_iter().map(|r| r.filename.clone()).collect(),
            group_timestamp: DateTime::<Utc>::from(oldest),
        })
    }

    /// Every filename in the group exactly once: before, after, extras.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        let after = (self.after != self.before).then_some(self.after.as_str());
        std::iter::once(self.before.as_str())
            .chain(after)
            .chain(self.extras.iter().map(String::as_str))
    }

    pub fn is_single(&self) -> bool {
        self.before == self.after && self.extras.is_empty()
    }
}

/// Oldest project first. Equal timestamps keep their discovery order.
pub fn rank_groups(mut groups: Vec<PortfolioGroup>) -> Vec<PortfolioGroup> {
    groups.sort_by_key(|g| g.group_timestamp);
    groups
}
