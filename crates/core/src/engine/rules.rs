use crate::domain::adjustment::{
    Adjustment, AdjustmentKind, AdjustmentLog, TARGET_ALL, TARGET_NON_LEADERS,
    TARGET_TOTAL_POSITION,
};
use crate::domain::overnight::OvernightMarketSnapshot;
use crate::domain::recommendation::{Recommendation, TradingPlan};
use crate::engine::config::AdjusterConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub const PRICE_DP: u32 = 2;
pub const POSITION_DP: u32 = 4;

/// One step of the adjustment pipeline. A rule inspects the snapshot, mutates the working plan
/// and records what it changed; a rule whose trigger is absent records nothing.
pub trait AdjustmentRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, plan: &mut TradingPlan, snapshot: &OvernightMarketSnapshot, log: &mut AdjustmentLog);
}

/// Round half-to-even on the exact binary value of `value`.
pub fn round_half_even(value: f64, dp: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    exact
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
        .to_f64()
        .unwrap_or(value)
}

fn pct(change: f64) -> f64 {
    change * 100.0
}

/// Flags recommendations whose prices are missing. Those prices are read as zero further down.
#[derive(Debug, Clone, Default)]
pub struct IncompleteInputRule;

impl AdjustmentRule for IncompleteInputRule {
    fn name(&self) -> &'static str {
        "incomplete-input"
    }

    fn apply(&self, plan: &mut TradingPlan, _snapshot: &OvernightMarketSnapshot, log: &mut AdjustmentLog) {
        for rec in &plan.recommendations {
            let missing = rec.missing_price_fields();
            if missing.is_empty() {
                continue;
            }
            log.record(Adjustment::new(
                AdjustmentKind::IncompleteInput,
                rec.code.clone(),
                format!("{}({}) missing {}, treated as 0", rec.name, rec.code, missing.join(", ")),
                "upstream plan omitted price fields",
            ));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownVariant {
    /// Keep only confirmed leaders, then mark down.
    FilterThenMarkdown,
    MarkdownOnly,
}

/// Proxy-index drop: severe drops filter to leaders and mark down, mild drops only mark down.
/// Exactly one variant, or none, is selected per snapshot.
#[derive(Debug, Clone)]
pub struct ProxyIndexMarkdownRule {
    mild_threshold: f64,
    severe_threshold: f64,
    markdown_ratio: f64,
    leader_tag: String,
}

impl ProxyIndexMarkdownRule {
    pub fn from_config(config: &AdjusterConfig) -> Self {
        Self {
            mild_threshold: config.proxy_mild_threshold,
            severe_threshold: config.proxy_severe_threshold,
            markdown_ratio: config.markdown_ratio,
            leader_tag: config.leader_tag.clone(),
        }
    }

    pub fn select_variant(&self, proxy_change: f64) -> Option<MarkdownVariant> {
        if proxy_change < self.severe_threshold {
            Some(MarkdownVariant::FilterThenMarkdown)
        } else if proxy_change < self.mild_threshold {
            Some(MarkdownVariant::MarkdownOnly)
        } else {
            None
        }
    }

    fn markdown(&self, recommendations: &mut [Recommendation]) {
        let factor = 1.0 - self.markdown_ratio;
        for rec in recommendations {
            rec.ideal_price = Some(marked_down(rec.ideal_price, factor));
            rec.acceptable_price = Some(marked_down(rec.acceptable_price, factor));
        }
    }
}

fn marked_down(price: Option<f64>, factor: f64) -> f64 {
    round_half_even(price.unwrap_or(0.0) * factor, PRICE_DP).max(0.0)
}

impl AdjustmentRule for ProxyIndexMarkdownRule {
    fn name(&self) -> &'static str {
        "proxy-index-markdown"
    }

    fn apply(&self, plan: &mut TradingPlan, snapshot: &OvernightMarketSnapshot, log: &mut AdjustmentLog) {
        let change = snapshot.proxy_index_change;
        let Some(variant) = self.select_variant(change) else {
            return;
        };

        let ratio_pct = pct(self.markdown_ratio);
        match variant {
            MarkdownVariant::FilterThenMarkdown => {
                let reason = format!(
                    "proxy index change {:.1}% below {:.1}% threshold",
                    pct(change),
                    pct(self.severe_threshold)
                );
                let before = plan.recommendations.len();
                plan.recommendations.retain(|r| r.is_leader(&self.leader_tag));
                tracing::debug!(
                    rule = self.name(),
                    removed = before - plan.recommendations.len(),
                    "filtered plan to confirmed leaders"
                );
                log.record(Adjustment::new(
                    AdjustmentKind::CancelStock,
                    TARGET_NON_LEADERS,
                    format!("proxy index {:.1}%, cancel buys outside {}", pct(change), self.leader_tag),
                    reason.clone(),
                ));

                self.markdown(&mut plan.recommendations);
                log.record(Adjustment::new(
                    AdjustmentKind::PriceMarkdown,
                    TARGET_ALL,
                    format!("mark down all buy prices by {ratio_pct:.0}%"),
                    reason,
                ));
            }
            MarkdownVariant::MarkdownOnly => {
                self.markdown(&mut plan.recommendations);
                log.record(Adjustment::new(
                    AdjustmentKind::PriceMarkdown,
                    TARGET_ALL,
                    format!(
                        "proxy index {:.1}%, mark down all buy prices by {ratio_pct:.0}%",
                        pct(change)
                    ),
                    format!(
                        "proxy index change {:.1}% below {:.1}% threshold",
                        pct(change),
                        pct(self.mild_threshold)
                    ),
                ));
            }
        }
        tracing::debug!(rule = self.name(), ?variant, "applied price markdown");
    }
}

/// Cancels any recommendation hit by adverse overnight news.
#[derive(Debug, Clone, Default)]
pub struct AdverseAnnouncementRule;

impl AdjustmentRule for AdverseAnnouncementRule {
    fn name(&self) -> &'static str {
        "adverse-announcement"
    }

    fn apply(&self, plan: &mut TradingPlan, snapshot: &OvernightMarketSnapshot, log: &mut AdjustmentLog) {
        for ann in snapshot.announcements.iter().filter(|a| a.is_adverse()) {
            let before = plan.recommendations.len();
            plan.recommendations.retain(|r| r.code != ann.code);
            if plan.recommendations.len() == before {
                continue;
            }

            tracing::debug!(rule = self.name(), code = %ann.code, "cancelled on adverse announcement");
            log.record(Adjustment::new(
                AdjustmentKind::CancelStock,
                ann.code.clone(),
                format!("{}({}) has adverse news, cancel buy", ann.name, ann.code),
                format!("announcement: {}", ann.title),
            ));
        }
    }
}

/// Cuts aggregate exposure when the reference broad-market index falls hard.
#[derive(Debug, Clone)]
pub struct BroadMarketPositionRule {
    reference_index: String,
    severe_threshold: f64,
    reduce_ratio: f64,
}

impl BroadMarketPositionRule {
    pub fn from_config(config: &AdjusterConfig) -> Self {
        Self {
            reference_index: config.reference_index.clone(),
            severe_threshold: config.broad_severe_threshold,
            reduce_ratio: config.position_reduce_ratio,
        }
    }
}

impl AdjustmentRule for BroadMarketPositionRule {
    fn name(&self) -> &'static str {
        "broad-market-position"
    }

    fn apply(&self, plan: &mut TradingPlan, snapshot: &OvernightMarketSnapshot, log: &mut AdjustmentLog) {
        let Some(change) = snapshot.broad_change(&self.reference_index) else {
            return;
        };
        if change >= self.severe_threshold {
            return;
        }

        let before = plan.total_position;
        let after = round_half_even(before * self.reduce_ratio, POSITION_DP).clamp(0.0, 1.0);
        plan.total_position = after;

        tracing::debug!(rule = self.name(), before, after, "reduced total position");
        log.record(
            Adjustment::new(
                AdjustmentKind::PositionReduce,
                TARGET_TOTAL_POSITION,
                format!(
                    "{} {:.1}%, scale total position to {:.0}%",
                    self.reference_index,
                    pct(change),
                    pct(self.reduce_ratio)
                ),
                format!(
                    "{} change {:.1}% below {:.1}% threshold",
                    self.reference_index,
                    pct(change),
                    pct(self.severe_threshold)
                ),
            )
            .with_values(before, after),
        );
    }
}
