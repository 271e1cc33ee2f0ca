use crate::domain::overnight::OvernightMarketSnapshot;
use crate::domain::recommendation::{Recommendation, TradingPlan};
use anyhow::ensure;
use std::collections::BTreeSet;

/// Rejects plans that break the input shape contract. Missing prices are allowed; the
/// pipeline reports them instead.
pub fn validate_plan(plan: &TradingPlan) -> anyhow::Result<()> {
    ensure!(
        plan.total_position.is_finite() && (0.0..=1.0).contains(&plan.total_position),
        "total_position must be between 0 and 1 (got {})",
        plan.total_position
    );

    let mut seen_codes = BTreeSet::<&str>::new();
    for rec in &plan.recommendations {
        validate_recommendation(rec, &mut seen_codes)?;
    }
    Ok(())
}

fn validate_recommendation<'a>(
    rec: &'a Recommendation,
    seen_codes: &mut BTreeSet<&'a str>,
) -> anyhow::Result<()> {
    let code = rec.code.trim();
    ensure!(!code.is_empty(), "recommendation code must be non-empty");
    ensure!(
        seen_codes.insert(code),
        "duplicate recommendation code: {code}"
    );

    for (field, price) in [
        ("ideal_price", rec.ideal_price),
        ("acceptable_price", rec.acceptable_price),
    ] {
        if let Some(price) = price {
            ensure!(
                price.is_finite() && price >= 0.0,
                "{field} must be a non-negative number for {code} (got {price})"
            );
        }
    }
    Ok(())
}

pub fn validate_snapshot(snapshot: &OvernightMarketSnapshot) -> anyhow::Result<()> {
    ensure_change("proxy_index_change", snapshot.proxy_index_change)?;
    for (index, change) in &snapshot.broad_market_changes {
        ensure!(!index.trim().is_empty(), "broad market index name must be non-empty");
        ensure_change(index, *change)?;
    }
    for ann in &snapshot.announcements {
        ensure!(
            !ann.code.trim().is_empty(),
            "announcement code must be non-empty (title: {:?})",
            ann.title
        );
    }
    Ok(())
}

fn ensure_change(label: &str, change: f64) -> anyhow::Result<()> {
    ensure!(
        change.is_finite() && change > -1.0,
        "{label} must be a finite fraction above -1.0 (got {change})"
    );
    Ok(())
}
