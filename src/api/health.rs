//! Health check endpoints.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::services::login::ProviderRegistry;
use crate::sources::SourceRegistry;

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Server information response.
#[derive(Serialize, ToSchema)]
pub struct ServerInfoResponse {
    version: &'static str,
    environment: String,
    providers: Vec<String>,
    sources: usize,
}

/// Health check endpoint.
///
/// Returns 200 if the service is running.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Server information: version, environment and what is configured.
#[utoipa::path(
    get,
    path = "/api/v1/info",
    tag = "Health",
    responses(
        (status = 200, description = "Server information", body = ServerInfoResponse)
    )
)]
#[get("/info")]
pub async fn info(
    config: web::Data<Config>,
    providers: web::Data<ProviderRegistry>,
    sources: web::Data<SourceRegistry>,
) -> HttpResponse {
    HttpResponse::Ok().json(ServerInfoResponse {
        version: env!("CARGO_PKG_VERSION"),
        environment: config.environment.to_string(),
        providers: providers.iter().map(|p| p.name().to_string()).collect(),
        sources: sources.len(),
    })
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(info);
}
