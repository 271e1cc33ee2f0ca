use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use premarket_core::domain::adjustment::AdjustedTradingPlan;
use premarket_core::domain::contract::{validate_plan, validate_snapshot};
use premarket_core::domain::overnight::OvernightMarketSnapshot;
use premarket_core::domain::recommendation::TradingPlan;
use premarket_core::engine::{AdjustmentReport, PreMarketAdjuster};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = premarket_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let state = AppState {
        adjuster: Arc::new(PreMarketAdjuster::new(settings.adjuster.clone())),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/adjustments", post(post_adjustment))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    adjuster: Arc<PreMarketAdjuster>,
}

#[derive(Debug, Deserialize)]
struct AdjustRequest {
    plan: TradingPlan,
    overnight: OvernightMarketSnapshot,
    /// Run instant; the server clock is used when absent.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct AdjustResponse {
    adjusted_plan: AdjustedTradingPlan,
    report: AdjustmentReport,
    report_markdown: String,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn unprocessable(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError {
            error: format!("{err:#}"),
        }),
    )
}

async fn post_adjustment(
    State(state): State<AppState>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<AdjustResponse> {
    validate_plan(&req.plan).map_err(unprocessable)?;
    validate_snapshot(&req.overnight).map_err(unprocessable)?;

    let now = req.now.unwrap_or_else(Utc::now);
    let (adjusted_plan, report) = state.adjuster.run(&req.plan, &req.overnight, now);
    let report_markdown = report.to_markdown();

    Ok(Json(AdjustResponse {
        adjusted_plan,
        report,
        report_markdown,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
