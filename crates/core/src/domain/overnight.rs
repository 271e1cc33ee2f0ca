use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementSeverity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub severity: AnnouncementSeverity,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publish_time: String,
}

impl Announcement {
    /// Negative news of medium or high severity.
    pub fn is_adverse(&self) -> bool {
        self.sentiment == Sentiment::Negative && self.severity >= AnnouncementSeverity::Medium
    }
}

/// Overnight market state as observed before the open. Changes are fractions (-0.02 = -2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvernightMarketSnapshot {
    pub proxy_index_change: f64,
    #[serde(default)]
    pub broad_market_changes: BTreeMap<String, f64>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub fetch_time: String,
}

impl OvernightMarketSnapshot {
    /// Snapshot without announcements, for quick what-if checks.
    pub fn from_changes<I, K>(proxy_index_change: f64, broad: I, fetch_time: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            proxy_index_change,
            broad_market_changes: broad.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            announcements: Vec::new(),
            fetch_time: fetch_time.into(),
        }
    }

    pub fn broad_change(&self, index: &str) -> Option<f64> {
        self.broad_market_changes.get(index).copied()
    }

    pub fn worst_broad_change(&self) -> Option<f64> {
        self.broad_market_changes.values().copied().reduce(f64::min)
    }

    pub fn average_broad_change(&self) -> Option<f64> {
        if self.broad_market_changes.is_empty() {
            return None;
        }
        let sum: f64 = self.broad_market_changes.values().sum();
        Some(sum / self.broad_market_changes.len() as f64)
    }

    /// Most negative of the proxy change and every broad-market change.
    pub fn worst_change(&self) -> f64 {
        match self.worst_broad_change() {
            Some(broad) => self.proxy_index_change.min(broad),
            None => self.proxy_index_change,
        }
    }
}
