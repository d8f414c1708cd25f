use crate::config::Config;
use crate::enrichment::EnrichmentOptions;
use crate::errors::AppError;
use crate::kpi::{Kpi, KpiSummary};
use crate::map_data::build_map_report;
use crate::models::{LocationKeys, MapDataRequest, MapReport, ResolveQueryParams};
use crate::resolver::{UfResolution, UfResolver};
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// UF resolver holding the lookup clients and their caches.
    pub resolver: UfResolver,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let resolver = UfResolver::new(&config)?;
        Ok(Self { config, resolver })
    }

    pub fn enrichment_options(&self) -> EnrichmentOptions {
        EnrichmentOptions::from_config(&self.config)
    }
}

/// API routes, without rate limiting.
///
/// The `Json` extractor has its own 2MB default limit, so it is raised to
/// match the tower-http limit.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/kpis", get(list_kpis))
        .route("/api/v1/map-data", post(map_data))
        .route("/api/v1/uf/resolve", get(resolve_uf))
        .route("/api/v1/cache/invalidate", post(invalidate_cache))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-bi-geo-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/v1/kpis
pub async fn list_kpis() -> Json<Vec<KpiSummary>> {
    Json(Kpi::ALL.iter().map(Kpi::summary).collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDataResponse {
    #[serde(flatten)]
    pub report: MapReport,
    pub gerado_em: String,
}

/// POST /api/v1/map-data
///
/// Builds the per-state map markers for a KPI. An unknown (or blank) KPI is not
/// an error: the response simply carries no states.
pub async fn map_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MapDataRequest>,
) -> Result<Json<MapDataResponse>, AppError> {
    tracing::info!(
        "POST /map-data - kpi: '{}', saidas: {}, servicos: {}, entradas: {}",
        request.kpi,
        request.data.saidas.len(),
        request.data.servicos.len(),
        request.data.entradas.len()
    );

    let report = build_map_report(
        &state.resolver,
        &request.data,
        &request.kpi,
        &state.enrichment_options(),
    )
    .await;

    Ok(Json(MapDataResponse {
        report,
        gerado_em: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/v1/uf/resolve
pub async fn resolve_uf(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQueryParams>,
) -> Result<Json<UfResolution>, AppError> {
    tracing::info!("GET /uf/resolve - params: {:?}", params);

    let location: LocationKeys = params.into();
    if location.uf.is_none() && location.cep.is_none() && location.cnpj.is_none() {
        return Err(AppError::BadRequest(
            "At least one of uf, cep or cnpj is required".to_string(),
        ));
    }

    Ok(Json(state.resolver.resolve(&location).await))
}

/// POST /api/v1/cache/invalidate
///
/// Clears the CEP and CNPJ caches so stale negative results are looked up again.
pub async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.resolver.invalidate_caches();
    (
        StatusCode::OK,
        Json(json!({
            "status": "invalidated",
            "caches": [
                state.resolver.cep_cache().name(),
                state.resolver.cnpj_cache().name()
            ]
        })),
    )
}
