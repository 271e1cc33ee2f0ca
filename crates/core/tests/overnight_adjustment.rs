//! End-to-end checks of the pre-market adjuster against fixed overnight scenarios.

use chrono::{DateTime, TimeZone, Utc};
use premarket_core::domain::adjustment::AdjustmentKind;
use premarket_core::domain::overnight::{
    Announcement, AnnouncementSeverity, OvernightMarketSnapshot, Sentiment,
};
use premarket_core::domain::recommendation::{Recommendation, TradingPlan};
use premarket_core::engine::pipeline::RulePipeline;
use premarket_core::engine::report::ReportGenerator;
use premarket_core::engine::{AdjusterConfig, PreMarketAdjuster, Severity};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 1, 5, 0).unwrap()
}

fn plan() -> TradingPlan {
    TradingPlan::new(
        vec![
            Recommendation::new("A", "Alpha", "confirmed-leader", 100.0, 98.0),
            Recommendation::new("B", "Beta", "ordinary", 50.0, 49.0),
        ],
        0.8,
    )
}

fn snapshot(proxy: f64) -> OvernightMarketSnapshot {
    OvernightMarketSnapshot::from_changes(
        proxy,
        [("dow", 0.001), ("nasdaq", 0.002), ("sp500", 0.0)],
        "2026-03-02 08:45:00",
    )
}

fn adverse_b() -> Announcement {
    Announcement {
        code: "B".into(),
        name: "Beta".into(),
        title: "Regulatory investigation".into(),
        sentiment: Sentiment::Negative,
        severity: AnnouncementSeverity::High,
        summary: "Filed overnight".into(),
        publish_time: "2026-03-01 20:00:00".into(),
    }
}

fn pipeline() -> RulePipeline {
    RulePipeline::standard(&AdjusterConfig::default())
}

#[test]
fn severe_proxy_keeps_leaders_and_marks_down() {
    let (adjusted, adjustments) = pipeline().apply(&plan(), &snapshot(-0.025));

    assert_eq!(adjusted.recommendations.len(), 1);
    let a = &adjusted.recommendations[0];
    assert_eq!(a.code, "A");
    assert_eq!(a.ideal_price, Some(98.0));
    assert_eq!(a.acceptable_price, Some(96.04));

    let kinds: Vec<_> = adjustments.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AdjustmentKind::CancelStock, AdjustmentKind::PriceMarkdown]);
}

#[test]
fn mild_proxy_marks_down_all() {
    let (adjusted, adjustments) = pipeline().apply(&plan(), &snapshot(-0.015));

    let prices: Vec<_> = adjusted
        .recommendations
        .iter()
        .map(|r| (r.code.as_str(), r.ideal_price, r.acceptable_price))
        .collect();
    assert_eq!(
        prices,
        vec![("A", Some(98.0), Some(96.04)), ("B", Some(49.0), Some(48.02))]
    );
    assert_eq!(adjustments.len(), 1);
    assert_eq!(adjustments[0].kind, AdjustmentKind::PriceMarkdown);
}

#[test]
fn adverse_news_removes_stock_after_markdown() {
    let mut s = snapshot(-0.015);
    s.announcements.push(adverse_b());
    let (adjusted, adjustments) = pipeline().apply(&plan(), &s);

    assert_eq!(adjusted.recommendations.len(), 1);
    assert_eq!(adjusted.recommendations[0].code, "A");
    let kinds: Vec<_> = adjustments.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AdjustmentKind::PriceMarkdown, AdjustmentKind::CancelStock]);
    assert_eq!(adjustments[1].target, "B");
    assert!(adjustments[1].reason.contains("Regulatory investigation"));
}

#[test]
fn adverse_news_for_filtered_stock_is_silent() {
    let mut s = snapshot(-0.025);
    s.announcements.push(adverse_b());
    let (adjusted, adjustments) = pipeline().apply(&plan(), &s);

    assert_eq!(adjusted.recommendations.len(), 1);
    assert_eq!(adjustments.len(), 2);
    assert!(adjustments.iter().all(|a| a.target != "B"));
}

#[test]
fn reference_index_drop_cuts_position() {
    let mut s = snapshot(0.0);
    s.broad_market_changes.insert("nasdaq".into(), -0.025);
    let (adjusted, adjustments) = pipeline().apply(&plan(), &s);

    assert_eq!(adjusted.total_position, 0.56);
    assert_eq!(adjustments.len(), 1);
    assert_eq!(adjustments[0].kind, AdjustmentKind::PositionReduce);
    assert_eq!(adjustments[0].before, Some(0.8));
    assert_eq!(adjustments[0].after, Some(0.56));
}

#[test]
fn caller_plan_is_not_mutated() {
    let original = plan();
    let before = serde_json::to_string(&original).unwrap();

    let mut s = snapshot(-0.035);
    s.broad_market_changes.insert("nasdaq".into(), -0.04);
    s.announcements.push(adverse_b());
    let _ = PreMarketAdjuster::default().run(&original, &s, now());

    assert_eq!(serde_json::to_string(&original).unwrap(), before);
}

#[test]
fn report_is_reproducible() {
    let adjuster = PreMarketAdjuster::default();
    let mut s = snapshot(-0.022);
    s.announcements.push(adverse_b());

    let (adjusted_a, report_a) = adjuster.run(&plan(), &s, now());
    let (adjusted_b, report_b) = adjuster.run(&plan(), &s, now());

    assert_eq!(adjusted_a, adjusted_b);
    assert_eq!(report_a, report_b);
    assert_eq!(report_a.to_markdown(), report_b.to_markdown());
    assert_eq!(
        serde_json::to_string(&report_a).unwrap(),
        serde_json::to_string(&report_b).unwrap()
    );
}

#[test]
fn report_generator_alone_is_pure() {
    let (adjusted, adjustments) = pipeline().apply(&plan(), &snapshot(-0.012));
    let generator = ReportGenerator::default();
    let a = generator.generate(&plan(), &adjusted, &snapshot(-0.012), &adjustments, "09:05");
    let b = generator.generate(&plan(), &adjusted, &snapshot(-0.012), &adjustments, "09:05");
    assert_eq!(a, b);
    assert_eq!(a.severity, Severity::Mild);
    assert_eq!(a.original_count, 2);
    assert_eq!(a.adjusted_count, 2);
}

#[test]
fn adjusted_plan_json_shape() {
    let input = serde_json::json!({
        "recommendations": [
            { "code": "A", "name": "Alpha", "leader_type": "confirmed-leader",
              "ideal_price": 100.0, "acceptable_price": 98.0, "score": 91 },
            { "code": "B", "name": "Beta", "leader_type": "ordinary",
              "ideal_price": 50.0, "acceptable_price": 49.0, "score": 77 }
        ],
        "total_position": 0.8,
        "plan_date": "2026-03-02"
    });
    let plan: TradingPlan = serde_json::from_value(input).unwrap();
    let (adjusted, _) = PreMarketAdjuster::default().run(&plan, &snapshot(-0.025), now());
    let v = serde_json::to_value(&adjusted).unwrap();

    assert_eq!(v["plan_date"], "2026-03-02");
    assert_eq!(v["adjustment_time"], "09:05");
    assert_eq!(v["severity"], "severe");
    assert_eq!(v["recommendations"][0]["score"], 91);
    assert_eq!(v["recommendations"][0]["acceptable_price"], 96.04);
    assert_eq!(v["overnight"]["proxy_index_change"], -0.025);
    assert_eq!(v["adjustments"].as_array().unwrap().len(), 2);
}
