use crate::domain::overnight::OvernightMarketSnapshot;
use crate::engine::config::AdjusterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overnight risk level. Ordered `Normal < Mild < Severe < Extreme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Mild,
    Severe,
    Extreme,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Mild => "mild",
            Severity::Severe => "severe",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityClassifier {
    extreme: f64,
    severe: f64,
    mild: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::from_config(&AdjusterConfig::default())
    }
}

impl SeverityClassifier {
    pub fn from_config(config: &AdjusterConfig) -> Self {
        Self {
            extreme: config.extreme_threshold,
            severe: config.proxy_severe_threshold,
            mild: config.proxy_mild_threshold,
        }
    }

    /// Highest tier whose threshold the worst overnight change falls strictly below.
    pub fn classify(&self, snapshot: &OvernightMarketSnapshot) -> Severity {
        let worst = snapshot.worst_change();
        if worst < self.extreme {
            Severity::Extreme
        } else if worst < self.severe {
            Severity::Severe
        } else if worst < self.mild {
            Severity::Mild
        } else {
            Severity::Normal
        }
    }
}
