use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Aggregate exposure assumed when the upstream plan does not carry one.
pub const DEFAULT_TOTAL_POSITION: f64 = 0.8;

fn default_total_position() -> f64 {
    DEFAULT_TOTAL_POSITION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPlan {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default = "default_total_position")]
    pub total_position: f64,
    /// Upstream plan metadata this engine does not interpret; carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TradingPlan {
    pub fn new(recommendations: Vec<Recommendation>, total_position: f64) -> Self {
        Self {
            recommendations,
            total_position,
            extra: BTreeMap::new(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.recommendations.iter().any(|r| r.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub leader_type: Option<String>,
    #[serde(default)]
    pub ideal_price: Option<f64>,
    #[serde(default)]
    pub acceptable_price: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Recommendation {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        leader_type: impl Into<String>,
        ideal_price: f64,
        acceptable_price: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            leader_type: Some(leader_type.into()),
            ideal_price: Some(ideal_price),
            acceptable_price: Some(acceptable_price),
            extra: BTreeMap::new(),
        }
    }

    pub fn is_leader(&self, leader_tag: &str) -> bool {
        self.leader_type.as_deref() == Some(leader_tag)
    }

    /// Names of the price fields the upstream plan left out.
    pub fn missing_price_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.ideal_price.is_none() {
            out.push("ideal_price");
        }
        if self.acceptable_price.is_none() {
            out.push("acceptable_price");
        }
        out
    }
}
