use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use std::collections::HashSet;

const CST_OFFSET_SECS: i32 = 8 * 3600;

// Overnight adjustments are meant to land between the call auction prep and the open.
const PRE_MARKET_START: (u32, u32) = (9, 0);
const PRE_MARKET_END: (u32, u32) = (9, 15);

pub const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ADJUSTMENT_TIME_FORMAT: &str = "%H:%M";

fn cst() -> FixedOffset {
    FixedOffset::east_opt(CST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn to_market_time(now_utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    now_utc.with_timezone(&cst())
}

pub fn format_report_time(now_utc: DateTime<Utc>) -> String {
    to_market_time(now_utc).format(REPORT_TIME_FORMAT).to_string()
}

pub fn format_adjustment_time(now_utc: DateTime<Utc>) -> String {
    to_market_time(now_utc).format(ADJUSTMENT_TIME_FORMAT).to_string()
}

/// True inside [09:00, 09:15) market time.
pub fn is_pre_market_window(now_utc: DateTime<Utc>) -> bool {
    let local = to_market_time(now_utc);
    let hm = (local.hour(), local.minute());
    hm >= PRE_MARKET_START && hm < PRE_MARKET_END
}

/// Market-local date of `now_utc`, rolled back over weekends and holidays.
pub fn resolve_trading_date(now_utc: DateTime<Utc>, holidays: &HashSet<NaiveDate>) -> NaiveDate {
    let mut date = to_market_time(now_utc).date_naive();
    while !is_trading_day(date, holidays) {
        date = date - Duration::days(1);
    }
    date
}

pub fn is_trading_day(date: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    !is_weekend(date) && !holidays.contains(&date)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

/// Parses "YYYY-MM-DD,YYYY-MM-DD"; blank entries are skipped.
pub fn parse_holidays(s: &str) -> anyhow::Result<HashSet<NaiveDate>> {
    let mut out = HashSet::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let d = NaiveDate::parse_from_str(part, "%Y-%m-%d")
            .with_context(|| format!("invalid holiday date: {part}"))?;
        out.insert(d);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_in_market_time() {
        // 2026-03-02 01:05 UTC = 09:05 CST
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 1, 5, 0).unwrap();
        assert_eq!(format_report_time(now), "2026-03-02 09:05:00");
        assert_eq!(format_adjustment_time(now), "09:05");
    }

    #[test]
    fn pre_market_window_bounds() {
        let at = |h, m| Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap();
        assert!(!is_pre_market_window(at(0, 59)));
        assert!(is_pre_market_window(at(1, 0)));
        assert!(is_pre_market_window(at(1, 14)));
        assert!(!is_pre_market_window(at(1, 15)));
    }

    #[test]
    fn rolls_back_over_weekend() {
        // 2026-03-01 is Sunday (09:00 CST).
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 1, 0, 0).unwrap();
        let d = resolve_trading_date(now, &HashSet::new());
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
    }

    #[test]
    fn rolls_back_over_holiday() {
        // 2026-01-01 is Thursday.
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap();
        let holidays = parse_holidays("2026-01-01, ,2026-01-02").unwrap();
        let d = resolve_trading_date(now, &holidays);
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(!is_trading_day(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), &holidays));
    }

    #[test]
    fn rejects_malformed_holiday() {
        assert!(parse_holidays("2026-13-01").is_err());
    }
}
