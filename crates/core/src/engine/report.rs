use crate::domain::adjustment::{Adjustment, AdjustmentKind};
use crate::domain::overnight::{OvernightMarketSnapshot, Sentiment};
use crate::domain::recommendation::TradingPlan;
use crate::engine::severity::{Severity, SeverityClassifier};
use serde::Serialize;
use std::fmt::Write as _;

pub const SUMMARY_NO_CHANGES: &str = "Overnight markets calm: no changes, proceed as planned.";
pub const SUMMARY_EXTREME: &str =
    "Overnight markets turbulent: trade with extreme caution or hold off.";
pub const SUMMARY_SEVERE: &str =
    "Overnight markets fell sharply: plan adjusted, execute it strictly.";
pub const SUMMARY_MILD: &str = "Overnight markets dipped: minor price adjustment applied.";
pub const SUMMARY_DEFAULT: &str = "Execute the adjusted plan.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentReport {
    pub report_time: String,
    pub overnight: OvernightMarketSnapshot,
    pub adjustments: Vec<Adjustment>,
    pub severity: Severity,
    pub original_count: usize,
    pub adjusted_count: usize,
    pub summary: String,
}

/// Canned summary keyed on whether the plan changed and how bad the night was.
pub fn summary_for(severity: Severity, adjustments: &[Adjustment]) -> &'static str {
    if !adjustments.iter().any(|a| a.kind.changes_plan()) {
        return SUMMARY_NO_CHANGES;
    }
    match severity {
        Severity::Extreme => SUMMARY_EXTREME,
        Severity::Severe => SUMMARY_SEVERE,
        Severity::Mild => SUMMARY_MILD,
        Severity::Normal => SUMMARY_DEFAULT,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    classifier: SeverityClassifier,
}

impl ReportGenerator {
    pub fn new(classifier: SeverityClassifier) -> Self {
        Self { classifier }
    }

    pub fn generate(
        &self,
        original: &TradingPlan,
        adjusted: &TradingPlan,
        snapshot: &OvernightMarketSnapshot,
        adjustments: &[Adjustment],
        report_time: impl Into<String>,
    ) -> AdjustmentReport {
        let severity = self.classifier.classify(snapshot);
        AdjustmentReport {
            report_time: report_time.into(),
            overnight: snapshot.clone(),
            adjustments: adjustments.to_vec(),
            severity,
            original_count: original.recommendations.len(),
            adjusted_count: adjusted.recommendations.len(),
            summary: summary_for(severity, adjustments).to_string(),
        }
    }
}

fn severity_badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => "🟢 NORMAL",
        Severity::Mild => "🟡 MILD risk",
        Severity::Severe => "🟠 SEVERE risk",
        Severity::Extreme => "🔴 EXTREME risk",
    }
}

fn kind_heading(kind: AdjustmentKind) -> &'static str {
    match kind {
        AdjustmentKind::PriceMarkdown => "📉 Price markdown",
        AdjustmentKind::CancelStock => "❌ Cancelled buys",
        AdjustmentKind::PositionReduce => "📊 Position reduction",
        AdjustmentKind::IncompleteInput => "⚠️ Incomplete input",
        AdjustmentKind::NoChange => "ℹ️ Notes",
    }
}

fn direction_marker(change: f64) -> &'static str {
    if change >= 0.0 {
        "🟢"
    } else {
        "🔴"
    }
}

fn sentiment_marker(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "🟢",
        Sentiment::Negative => "🔴",
        Sentiment::Neutral => "🟡",
    }
}

impl AdjustmentReport {
    /// Markdown rendering built only from the report's own fields.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = self.write_markdown(&mut out);
        out
    }

    fn write_markdown(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "# 📋 Pre-market adjustment report ({})", self.report_time)?;
        writeln!(out)?;

        writeln!(out, "## 🌍 Overnight markets")?;
        writeln!(out)?;
        writeln!(out, "| Index | Change | |")?;
        writeln!(out, "|-------|--------|---|")?;
        for (index, change) in &self.overnight.broad_market_changes {
            writeln!(
                out,
                "| {index} | {:+.2}% | {} |",
                change * 100.0,
                direction_marker(*change)
            )?;
        }
        let proxy = self.overnight.proxy_index_change;
        writeln!(
            out,
            "| proxy index | {:+.2}% | {} |",
            proxy * 100.0,
            direction_marker(proxy)
        )?;
        writeln!(out)?;
        writeln!(out, "**Risk level:** {}", severity_badge(self.severity))?;
        writeln!(out)?;

        if !self.overnight.announcements.is_empty() {
            writeln!(out, "## 📢 Announcements")?;
            writeln!(out)?;
            for ann in &self.overnight.announcements {
                writeln!(
                    out,
                    "- {} **{}({})**: {}",
                    sentiment_marker(ann.sentiment),
                    ann.name,
                    ann.code,
                    ann.title
                )?;
            }
            writeln!(out)?;
        }

        writeln!(out, "## 🔧 Adjustments")?;
        writeln!(out)?;
        if self.adjustments.is_empty() {
            writeln!(out, "- ✅ No adjustments, execute the original plan")?;
            writeln!(out)?;
        }
        for kind in AdjustmentKind::ALL {
            let group: Vec<_> = self.adjustments.iter().filter(|a| a.kind == kind).collect();
            if group.is_empty() {
                continue;
            }
            writeln!(out, "### {}", kind_heading(kind))?;
            writeln!(out)?;
            for adj in group {
                write!(out, "- {}", adj.description)?;
                if let (Some(before), Some(after)) = (adj.before, adj.after) {
                    write!(out, " ({before} → {after})")?;
                }
                if !adj.reason.is_empty() {
                    write!(out, " _({})_", adj.reason)?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "## 📝 Summary")?;
        writeln!(out)?;
        writeln!(out, "- Original recommendations: {}", self.original_count)?;
        writeln!(out, "- After adjustment: {}", self.adjusted_count)?;
        writeln!(out, "- {}", self.summary)?;
        Ok(())
    }
}
