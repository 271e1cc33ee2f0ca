use crate::domain::adjustment::{Adjustment, AdjustmentLog};
use crate::domain::overnight::OvernightMarketSnapshot;
use crate::domain::recommendation::TradingPlan;
use crate::engine::config::AdjusterConfig;
use crate::engine::rules::{
    AdjustmentRule, AdverseAnnouncementRule, BroadMarketPositionRule, IncompleteInputRule,
    ProxyIndexMarkdownRule,
};

/// Fixed, ordered sequence of rules. Each rule sees the plan left by the ones before it.
pub struct RulePipeline {
    rules: Vec<Box<dyn AdjustmentRule>>,
}

impl RulePipeline {
    /// Input check, proxy-index markdown, adverse announcements, broad-market position cut.
    pub fn standard(config: &AdjusterConfig) -> Self {
        Self {
            rules: vec![
                Box::new(IncompleteInputRule),
                Box::new(ProxyIndexMarkdownRule::from_config(config)),
                Box::new(AdverseAnnouncementRule),
                Box::new(BroadMarketPositionRule::from_config(config)),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn AdjustmentRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule on a working copy of `plan`; the caller's plan is left as is.
    pub fn apply(
        &self,
        plan: &TradingPlan,
        snapshot: &OvernightMarketSnapshot,
    ) -> (TradingPlan, Vec<Adjustment>) {
        let mut working = plan.clone();
        let mut log = AdjustmentLog::new();
        for rule in &self.rules {
            let recorded = log.len();
            rule.apply(&mut working, snapshot, &mut log);
            if log.len() > recorded {
                tracing::debug!(
                    rule = rule.name(),
                    records = log.len() - recorded,
                    "rule fired"
                );
            }
        }
        (working, log.into_vec())
    }
}

impl std::fmt::Debug for RulePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePipeline")
            .field("rules", &self.rule_names())
            .finish()
    }
}
