use crate::domain::overnight::OvernightMarketSnapshot;
use crate::domain::recommendation::TradingPlan;
use crate::engine::severity::Severity;
use serde::{Deserialize, Serialize};

pub const TARGET_ALL: &str = "all";
pub const TARGET_NON_LEADERS: &str = "non-leaders";
pub const TARGET_TOTAL_POSITION: &str = "total-position";

/// Keys `AdjustedTradingPlan` writes itself; stale copies in the input plan are dropped.
pub const RESERVED_PLAN_KEYS: [&str; 4] = ["adjustments", "adjustment_time", "severity", "overnight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    PriceMarkdown,
    CancelStock,
    PositionReduce,
    NoChange,
    /// The input was accepted but degraded (e.g. a missing price treated as zero).
    IncompleteInput,
}

impl AdjustmentKind {
    /// Rendering order for grouped reports.
    pub const ALL: [AdjustmentKind; 5] = [
        AdjustmentKind::PriceMarkdown,
        AdjustmentKind::CancelStock,
        AdjustmentKind::PositionReduce,
        AdjustmentKind::IncompleteInput,
        AdjustmentKind::NoChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentKind::PriceMarkdown => "price-markdown",
            AdjustmentKind::CancelStock => "cancel-stock",
            AdjustmentKind::PositionReduce => "position-reduce",
            AdjustmentKind::NoChange => "no-change",
            AdjustmentKind::IncompleteInput => "incomplete-input",
        }
    }

    pub fn changes_plan(self) -> bool {
        matches!(
            self,
            AdjustmentKind::PriceMarkdown
                | AdjustmentKind::CancelStock
                | AdjustmentKind::PositionReduce
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub target: String,
    pub description: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<f64>,
}

impl Adjustment {
    pub fn new(
        kind: AdjustmentKind,
        target: impl Into<String>,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            description: description.into(),
            reason: reason.into(),
            before: None,
            after: None,
        }
    }

    pub fn with_values(mut self, before: f64, after: f64) -> Self {
        self.before = Some(before);
        self.after = Some(after);
        self
    }
}

/// Append-only record of adjustments, in the order rules emitted them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentLog {
    entries: Vec<Adjustment>,
}

impl AdjustmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, adjustment: Adjustment) {
        self.entries.push(adjustment);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Adjustment] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Adjustment> {
        self.entries
    }
}

/// The adjusted plan as handed to downstream execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedTradingPlan {
    #[serde(flatten)]
    pub plan: TradingPlan,
    pub adjustments: Vec<Adjustment>,
    pub adjustment_time: String,
    pub severity: Severity,
    pub overnight: OvernightMarketSnapshot,
}

impl AdjustedTradingPlan {
    pub fn new(
        mut plan: TradingPlan,
        adjustments: Vec<Adjustment>,
        adjustment_time: String,
        severity: Severity,
        overnight: OvernightMarketSnapshot,
    ) -> Self {
        for key in RESERVED_PLAN_KEYS {
            plan.extra.remove(key);
        }
        Self {
            plan,
            adjustments,
            adjustment_time,
            severity,
            overnight,
        }
    }
}
