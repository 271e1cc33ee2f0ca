pub mod domain;
pub mod engine;
pub mod time;

pub mod config {
    use crate::engine::config::AdjusterConfig;
    use anyhow::Context;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub market_holidays: HashSet<NaiveDate>,
        pub adjuster: AdjusterConfig,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from any key lookup; `from_env` passes the process environment.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let market_holidays = match lookup("CN_MARKET_HOLIDAYS") {
                Some(s) => crate::time::cn_market::parse_holidays(&s)
                    .context("CN_MARKET_HOLIDAYS is invalid")?,
                None => HashSet::new(),
            };

            let mut adjuster = AdjusterConfig::default();
            override_from(&lookup, "PREMARKET_PROXY_MILD_THRESHOLD", &mut adjuster.proxy_mild_threshold)?;
            override_from(&lookup, "PREMARKET_PROXY_SEVERE_THRESHOLD", &mut adjuster.proxy_severe_threshold)?;
            override_from(&lookup, "PREMARKET_EXTREME_THRESHOLD", &mut adjuster.extreme_threshold)?;
            override_from(&lookup, "PREMARKET_BROAD_SEVERE_THRESHOLD", &mut adjuster.broad_severe_threshold)?;
            override_from(&lookup, "PREMARKET_MARKDOWN_RATIO", &mut adjuster.markdown_ratio)?;
            override_from(&lookup, "PREMARKET_POSITION_REDUCE_RATIO", &mut adjuster.position_reduce_ratio)?;
            override_from(&lookup, "PREMARKET_REFERENCE_INDEX", &mut adjuster.reference_index)?;
            override_from(&lookup, "PREMARKET_LEADER_TAG", &mut adjuster.leader_tag)?;
            adjuster.validate().context("invalid PREMARKET_* settings")?;

            Ok(Self {
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
                market_holidays,
                adjuster,
            })
        }
    }

    fn override_from<T>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        target: &mut T,
    ) -> anyhow::Result<()>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let Some(raw) = lookup(key) else {
            return Ok(());
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        *target = raw
            .parse::<T>()
            .with_context(|| format!("{key} is not valid: {raw:?}"))?;
        Ok(())
    }

}
