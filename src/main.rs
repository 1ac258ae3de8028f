mod config;
mod db;
mod enrichment;
mod errors;
mod geo;
mod handlers;
mod lead_storage;
mod models;
mod notifier;
mod scoring;
mod search;

use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database pool, the submission
/// dedup cache, and the optional lead-notification webhook client, then
/// starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_intel_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Submission dedup cache: repeat posts of the same email inside the
    // window are acknowledged without inserting a second record
    let recent_submission_cache = Cache::builder()
        .time_to_live(Duration::from_secs(config.dedup_ttl_secs))
        .max_capacity(10_000)
        .build();
    tracing::info!("Submission dedup cache initialized");

    // Optional new-lead webhook client
    let notifier = match config.notify_webhook_url.clone() {
        Some(url) => match notifier::LeadNotifier::new(url.clone()) {
            Ok(client) => {
                tracing::info!("Lead notifier initialized: {}", url);
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to initialize lead notifier: {}", e);
                None
            }
        },
        None => {
            tracing::info!("No NOTIFY_WEBHOOK_URL configured, notifications disabled");
            None
        }
    };

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        config: config.clone(),
        notifier,
        recent_submission_cache,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route("/api/v1/leads", post(handlers::submit_lead))
        .route("/api/v1/leads/search", get(handlers::search_leads))
        .route("/api/v1/leads/rescore", post(handlers::rescore_leads))
        .route("/api/v1/leads/:id", get(handlers::get_lead))
        .route("/api/v1/leads/:id/enrich", post(handlers::enrich_lead))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses the rate limiter
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
