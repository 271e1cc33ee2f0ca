use anyhow::Context;
use clap::Parser;
use premarket_core::engine::PreMarketAdjuster;
use premarket_core::time::cn_market;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;

#[derive(Debug, Parser)]
#[command(name = "premarket_worker")]
struct Args {
    /// Trading plan JSON produced by the overnight screen.
    #[arg(long)]
    plan: PathBuf,

    /// Overnight market snapshot JSON.
    #[arg(long)]
    overnight: PathBuf,

    /// Where to write the adjusted plan JSON. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Where to write the markdown report. Defaults to stdout.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run instant (RFC 3339). Defaults to now.
    #[arg(long)]
    now: Option<String>,

    /// Log the outcome without writing any output.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = premarket_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args, &settings) {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "pre-market adjustment failed");
        return Err(err);
    }
    Ok(())
}

fn run(args: &Args, settings: &premarket_core::config::Settings) -> anyhow::Result<()> {
    let now = resolve_now(args.now.as_deref())?;

    let trading_date = cn_market::resolve_trading_date(now, &settings.market_holidays);
    if !cn_market::is_trading_day(cn_market::to_market_time(now).date_naive(), &settings.market_holidays) {
        tracing::warn!(%trading_date, "not a trading day; last trading day shown");
    }
    if !cn_market::is_pre_market_window(now) {
        tracing::warn!(
            market_time = %cn_market::format_report_time(now),
            "running outside the 09:00-09:15 pre-market window"
        );
    }

    let plan = input::load_plan(&args.plan)?;
    let overnight = input::load_overnight(&args.overnight)?;

    let adjuster = PreMarketAdjuster::new(settings.adjuster.clone());
    let (adjusted, report) = adjuster.run(&plan, &overnight, now);

    if args.dry_run {
        tracing::info!(
            %trading_date,
            dry_run = true,
            severity = %report.severity,
            adjustments = report.adjustments.len(),
            summary = %report.summary,
            "pre-market adjustment (dry-run)"
        );
        return Ok(());
    }

    let adjusted_json =
        serde_json::to_string_pretty(&adjusted).context("failed to serialize adjusted plan")?;
    let markdown = report.to_markdown();

    match &args.out {
        Some(path) => {
            input::write_output(path, &adjusted_json)?;
            tracing::info!(path = %path.display(), "wrote adjusted plan");
        }
        None => println!("{adjusted_json}"),
    }
    match &args.report {
        Some(path) => {
            input::write_output(path, &markdown)?;
            tracing::info!(path = %path.display(), "wrote adjustment report");
        }
        None => println!("{markdown}"),
    }

    Ok(())
}

fn init_sentry(settings: &premarket_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_now(now_arg: Option<&str>) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    match now_arg {
        Some(s) => Ok(chrono::DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("--now is not RFC 3339: {s}"))?
            .with_timezone(&chrono::Utc)),
        None => Ok(chrono::Utc::now()),
    }
}
