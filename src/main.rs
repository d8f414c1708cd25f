use axum::{routing::get, Router};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_bi_geo_api::config::Config;
use rust_bi_geo_api::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes logging, configuration, the UF resolver with its lookup caches
/// and circuit breakers, then serves the HTTP routes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_bi_geo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // CEP/CNPJ caches are bounded and expire; negative entries expire sooner
    let app_state = Arc::new(AppState::new(config.clone())?);
    tracing::info!(
        "✓ UF resolver initialized (cache capacity {}, ttl {:?}, negative ttl {:?})",
        config.cache_max_capacity,
        config.cache_ttl,
        config.cache_negative_ttl
    );

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    // Body limit: 5MB max payload (tower-http and the Json extractor)
    // Rate limiting: 10 req/sec per IP, burst of 20
    let protected_routes = handlers::api_routes().layer(GovernorLayer {
        config: governor_conf,
    });

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
