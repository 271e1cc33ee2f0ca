use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Tunables for one adjuster instance. Changes are fractions (-0.02 = -2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjusterConfig {
    pub proxy_mild_threshold: f64,
    pub proxy_severe_threshold: f64,
    pub extreme_threshold: f64,
    pub broad_severe_threshold: f64,
    pub markdown_ratio: f64,
    pub position_reduce_ratio: f64,
    /// Broad-market index whose drop triggers the position cut.
    pub reference_index: String,
    /// Leader classification kept when the proxy index falls hard.
    pub leader_tag: String,
}

impl Default for AdjusterConfig {
    fn default() -> Self {
        Self {
            proxy_mild_threshold: -0.01,
            proxy_severe_threshold: -0.02,
            extreme_threshold: -0.03,
            broad_severe_threshold: -0.02,
            markdown_ratio: 0.02,
            position_reduce_ratio: 0.70,
            reference_index: "nasdaq".to_string(),
            leader_tag: "confirmed-leader".to_string(),
        }
    }
}

impl AdjusterConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let thresholds = [
            ("proxy_mild_threshold", self.proxy_mild_threshold),
            ("proxy_severe_threshold", self.proxy_severe_threshold),
            ("extreme_threshold", self.extreme_threshold),
            ("broad_severe_threshold", self.broad_severe_threshold),
        ];
        for (name, value) in thresholds {
            ensure!(
                value.is_finite() && value < 0.0,
                "{name} must be a negative fraction (got {value})"
            );
        }

        ensure!(
            self.extreme_threshold < self.proxy_severe_threshold
                && self.proxy_severe_threshold < self.proxy_mild_threshold,
            "thresholds must satisfy extreme < severe < mild (got {} / {} / {})",
            self.extreme_threshold,
            self.proxy_severe_threshold,
            self.proxy_mild_threshold
        );
        // A position cut always reports at least severe.
        ensure!(
            self.broad_severe_threshold <= self.proxy_severe_threshold,
            "broad_severe_threshold must not be looser than proxy_severe_threshold (got {} / {})",
            self.broad_severe_threshold,
            self.proxy_severe_threshold
        );

        for (name, value) in [
            ("markdown_ratio", self.markdown_ratio),
            ("position_reduce_ratio", self.position_reduce_ratio),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be between 0 and 1 (got {value})"
            );
        }

        ensure!(
            !self.reference_index.trim().is_empty(),
            "reference_index must be non-empty"
        );
        ensure!(!self.leader_tag.trim().is_empty(), "leader_tag must be non-empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AdjusterConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.proxy_mild_threshold, -0.01);
        assert_eq!(cfg.proxy_severe_threshold, -0.02);
        assert_eq!(cfg.markdown_ratio, 0.02);
        assert_eq!(cfg.position_reduce_ratio, 0.70);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let cfg = AdjusterConfig {
            proxy_mild_threshold: -0.03,
            ..AdjusterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_broad_threshold_looser_than_severe_tier() {
        let cfg = AdjusterConfig {
            broad_severe_threshold: -0.015,
            ..AdjusterConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("broad_severe_threshold"));

        let cfg = AdjusterConfig {
            broad_severe_threshold: -0.025,
            ..AdjusterConfig::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_ratio_out_of_range() {
        let cfg = AdjusterConfig {
            position_reduce_ratio: 1.5,
            ..AdjusterConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdjusterConfig {
            markdown_ratio: f64::NAN,
            ..AdjusterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_blank_reference_index() {
        let cfg = AdjusterConfig {
            reference_index: " ".into(),
            ..AdjusterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
