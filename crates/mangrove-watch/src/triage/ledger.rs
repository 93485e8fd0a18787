use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reputation tier derived from a contributor's point total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    Beginner,
    Guardian,
    Ranger,
    Champion,
}

impl Badge {
    pub const fn label(self) -> &'static str {
        match self {
            Badge::Beginner => "Beginner",
            Badge::Guardian => "Guardian",
            Badge::Ranger => "Ranger",
            Badge::Champion => "Champion",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn badge_for(points: u32) -> Badge {
    if points >= 100 {
        Badge::Champion
    } else if points >= 50 {
        Badge::Ranger
    } else if points >= 20 {
        Badge::Guardian
    } else {
        Badge::Beginner
    }
}

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub points: u32,
    pub badge: Badge,
}

/// Contributor name to accumulated points. Names are matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReputationLedger {
    scores: BTreeMap<String, u32>,
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(scores: BTreeMap<String, u32>) -> Self {
        Self { scores }
    }

    /// Add points to a contributor, creating the entry on first non-zero award.
    ///
    /// Returns the new total, or `None` when the name is empty and nothing was recorded.
    pub fn award(&mut self, name: &str, amount: u32) -> Option<u32> {
        if name.is_empty() {
            return None;
        }
        if amount == 0 {
            return Some(self.points_for(name));
        }
        let total = self.scores.entry(name.to_string()).or_insert(0);
        *total = total.saturating_add(amount);
        Some(*total)
    }

    pub fn points_for(&self, name: &str) -> u32 {
        self.scores.get(name).copied().unwrap_or(0)
    }

    /// The recorded total, distinguishing a missing entry from zero points.
    pub(crate) fn total(&self, name: &str) -> Option<u32> {
        self.scores.get(name).copied()
    }

    /// Put an entry back to a total previously read with [`ReputationLedger::total`].
    pub(crate) fn restore(&mut self, name: &str, total: Option<u32>) {
        match total {
            Some(points) => {
                self.scores.insert(name.to_string(), points);
            }
            None => {
                self.scores.remove(name);
            }
        }
    }

    /// Highest totals first; equal totals are ordered by name.
    pub fn top_entries(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<(&String, u32)> =
            self.scores.iter().map(|(name, points)| (name, *points)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        entries
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (name, points))| LeaderboardEntry {
                rank: index + 1,
                name: name.clone(),
                points,
                badge: badge_for(points),
            })
            .collect()
    }

    pub fn scores(&self) -> &BTreeMap<String, u32> {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
