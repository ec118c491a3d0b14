//! Stepboard API Server
//!
//! Ingests step samples from client devices, keeps per-user daily totals and
//! serves history and leaderboards.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresDailyStepsRepository, PostgresGroupDirectory, PostgresSocialGraph, PostgresStepLedger,
    PostgresStepSampleRepository, PostgresUserDirectory,
};
use app::{HistoryService, IngestionService, LeaderboardService};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion_service:
        Arc<IngestionService<PostgresStepSampleRepository, PostgresStepLedger>>,
    pub leaderboard_service: Arc<
        LeaderboardService<
            PostgresDailyStepsRepository,
            PostgresUserDirectory,
            PostgresSocialGraph,
            PostgresGroupDirectory,
        >,
    >,
    pub history_service: Arc<HistoryService<PostgresDailyStepsRepository>>,
    pub users: Arc<PostgresUserDirectory>,
    pub config: Config,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stepboard_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stepboard API...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Create adapters
    let sample_repo = Arc::new(PostgresStepSampleRepository::new(db.clone()));
    let step_ledger = Arc::new(PostgresStepLedger::new(db.clone()));
    let daily_repo = Arc::new(PostgresDailyStepsRepository::new(db.clone()));
    let user_directory = Arc::new(PostgresUserDirectory::new(db.clone()));
    let social_graph = Arc::new(PostgresSocialGraph::new(db.clone()));
    let group_directory = Arc::new(PostgresGroupDirectory::new(db.clone()));

    // Create application services
    let ingestion_service = Arc::new(IngestionService::new(
        sample_repo,
        step_ledger,
        Duration::minutes(config.max_future_skew_minutes),
    ));

    let leaderboard_service = Arc::new(LeaderboardService::new(
        daily_repo.clone(),
        user_directory.clone(),
        social_graph,
        group_directory,
    ));

    let history_service = Arc::new(HistoryService::new(daily_repo));

    let state = AppState {
        ingestion_service,
        leaderboard_service,
        history_service,
        users: user_directory,
        config: config.clone(),
    };

    // Uploads are rate limited per peer IP taken from the socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(config.upload_rate_per_second)
            .burst_size(config.upload_rate_burst)
            .finish()
            .context("Invalid upload rate limit configuration")?,
    );

    let upload_routes = Router::new()
        .route("/upload", post(handlers::upload))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // All step routes require an authenticated user
    let step_routes = Router::new()
        .route("/daily", get(handlers::daily))
        .route("/history", get(handlers::history))
        .route("/leaderboard/friends", get(handlers::friends_leaderboard))
        .route(
            "/leaderboard/groups/:group_id",
            get(handlers::group_leaderboard),
        )
        .merge(upload_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/steps", step_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
