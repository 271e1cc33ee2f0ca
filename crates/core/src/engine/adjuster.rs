use crate::domain::adjustment::{AdjustedTradingPlan, Adjustment};
use crate::domain::overnight::OvernightMarketSnapshot;
use crate::domain::recommendation::TradingPlan;
use crate::engine::config::AdjusterConfig;
use crate::engine::pipeline::RulePipeline;
use crate::engine::report::{AdjustmentReport, ReportGenerator};
use crate::engine::severity::{Severity, SeverityClassifier};
use crate::time::cn_market;
use chrono::{DateTime, Utc};

/// Revises a trading plan against overnight signals right before the open.
///
/// Holds no clock: every timestamp comes from the `now` the caller passes in, so identical
/// inputs give identical plans and reports.
#[derive(Debug)]
pub struct PreMarketAdjuster {
    config: AdjusterConfig,
    classifier: SeverityClassifier,
    pipeline: RulePipeline,
    reports: ReportGenerator,
}

impl Default for PreMarketAdjuster {
    fn default() -> Self {
        Self::new(AdjusterConfig::default())
    }
}

impl PreMarketAdjuster {
    pub fn new(config: AdjusterConfig) -> Self {
        let classifier = SeverityClassifier::from_config(&config);
        Self {
            pipeline: RulePipeline::standard(&config),
            reports: ReportGenerator::new(classifier),
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &AdjusterConfig {
        &self.config
    }

    pub fn assess_severity(&self, snapshot: &OvernightMarketSnapshot) -> Severity {
        self.classifier.classify(snapshot)
    }

    pub fn adjust_trading_plan(
        &self,
        plan: &TradingPlan,
        snapshot: &OvernightMarketSnapshot,
        now: DateTime<Utc>,
    ) -> (AdjustedTradingPlan, Vec<Adjustment>) {
        let (adjusted, adjustments) = self.pipeline.apply(plan, snapshot);
        let adjusted = AdjustedTradingPlan::new(
            adjusted,
            adjustments.clone(),
            cn_market::format_adjustment_time(now),
            self.classifier.classify(snapshot),
            snapshot.clone(),
        );
        (adjusted, adjustments)
    }

    pub fn generate_report(
        &self,
        original: &TradingPlan,
        adjusted: &AdjustedTradingPlan,
        snapshot: &OvernightMarketSnapshot,
        adjustments: &[Adjustment],
        now: DateTime<Utc>,
    ) -> AdjustmentReport {
        self.reports.generate(
            original,
            &adjusted.plan,
            snapshot,
            adjustments,
            cn_market::format_report_time(now),
        )
    }

    /// Classify, adjust and report in one pass.
    pub fn run(
        &self,
        plan: &TradingPlan,
        snapshot: &OvernightMarketSnapshot,
        now: DateTime<Utc>,
    ) -> (AdjustedTradingPlan, AdjustmentReport) {
        let (adjusted, adjustments) = self.adjust_trading_plan(plan, snapshot, now);
        let report = self.generate_report(plan, &adjusted, snapshot, &adjustments, now);

        tracing::info!(
            severity = %report.severity,
            adjustments = report.adjustments.len(),
            original_count = report.original_count,
            adjusted_count = report.adjusted_count,
            total_position = adjusted.plan.total_position,
            "pre-market adjustment complete"
        );

        (adjusted, report)
    }

    /// What-if check from index moves alone; returns the adjusted plan and rendered report.
    pub fn quick_check<I, K>(
        &self,
        plan: &TradingPlan,
        proxy_index_change: f64,
        broad_market_changes: I,
        now: DateTime<Utc>,
    ) -> (AdjustedTradingPlan, String)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let snapshot = OvernightMarketSnapshot::from_changes(
            proxy_index_change,
            broad_market_changes,
            cn_market::format_report_time(now),
        );
        let (adjusted, report) = self.run(plan, &snapshot, now);
        (adjusted, report.to_markdown())
    }
}
