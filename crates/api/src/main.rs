use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalist_core::domain::{Article, StockSearchResult};
use signalist_core::market::{FinnhubClient, MarketDataProvider};
use signalist_core::news::NewsAggregator;
use signalist_core::search::SearchAggregator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalist_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Market data access is the whole point of this service, so a missing
    // token is fatal here rather than a degraded mode.
    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(FinnhubClient::from_settings(&settings)?);

    let state = AppState {
        search: Arc::new(SearchAggregator::new(provider.clone())),
        news: Arc::new(NewsAggregator::new(provider)),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/search", get(search_stocks))
        .route("/news", get(get_news))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Read-only endpoints consumed by a browser frontend on another
        // origin.
        .layer(CorsLayer::permissive());

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

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    search: Arc<SearchAggregator>,
    news: Arc<NewsAggregator>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_stocks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<StockSearchResult>> {
    Json(state.search.search(params.q.as_deref()).await)
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    symbols: Option<String>,
}

async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<Vec<Article>>, StatusCode> {
    let symbols = parse_symbols(params.symbols.as_deref());

    let articles = state.news.news_for_symbols(&symbols).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(articles))
}

fn parse_symbols(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &signalist_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
