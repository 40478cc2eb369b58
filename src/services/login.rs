//! Provider-backed login routes.
//!
//! Endpoints:
//! 1. GET /auth/providers: configured providers with their scopes
//! 2. GET /auth/{provider}/login: redirect to the provider's authorize page
//! 3. POST /auth/{provider}/principal: resolve the principal behind a bearer token

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::oauth::{GenericProvider, GitHubProvider, Provider, ProviderError, authenticated_client};

/// Configured providers, in registration order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider whose credentials are configured.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        if let Some(ref github) = config.github {
            registry.register(Arc::new(GitHubProvider::new(github.clone())));
        }
        if let Some(ref generic) = config.generic {
            registry.register(Arc::new(GenericProvider::new(generic.clone())));
        }
        registry
    }

    /// Add a provider. A later provider with the same name replaces the earlier one.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        info!(provider = %provider.name(), scopes = ?provider.scopes(), "OAuth provider registered");
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Resolve the principal for `access_token`, giving up after `timeout`.
///
/// On timeout the in-flight provider calls are dropped and no principal is
/// returned.
pub async fn resolve_principal(
    provider: &dyn Provider,
    access_token: &SecretString,
    timeout: Duration,
) -> AppResult<String> {
    let client = authenticated_client(access_token)?;
    let principal = tokio::time::timeout(timeout, provider.principal_id(&client))
        .await
        .map_err(|_| ProviderError::Timeout)
        .and_then(|result| result);

    match principal {
        Ok(principal) => Ok(principal),
        Err(e) => {
            warn!(provider = %provider.name(), "Principal resolution failed: {}", e);
            Err(e.into())
        }
    }
}

/// Configure login routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_providers)
        .service(provider_login)
        .service(resolve);
}

/// Provider entry of the listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub name: String,
    pub scopes: Vec<String>,
    /// Route starting the login flow for this provider
    pub login: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderInfo>,
}

/// Principal resolved for a bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrincipalResponse {
    pub provider: String,
    pub principal: String,
}

/// Query of the login redirect.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Opaque anti-forgery value echoed back by the provider
    pub state: String,
}

fn lookup(registry: &ProviderRegistry, name: &str) -> AppResult<Arc<dyn Provider>> {
    registry
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Provider {}", name)))
}

/// List the configured OAuth providers.
///
/// GET /api/v1/auth/providers
#[utoipa::path(
    get,
    path = "/api/v1/auth/providers",
    tag = "Auth",
    responses(
        (status = 200, description = "Configured providers", body = ProviderListResponse)
    )
)]
#[get("/auth/providers")]
pub async fn list_providers(registry: web::Data<ProviderRegistry>) -> HttpResponse {
    let providers = registry
        .iter()
        .map(|p| ProviderInfo {
            name: p.name().to_string(),
            scopes: p.scopes(),
            login: format!("/api/v1/auth/{}/login", urlencoding::encode(p.name())),
        })
        .collect();
    HttpResponse::Ok().json(ProviderListResponse { providers })
}

/// Redirect the browser to the provider's authorization page.
///
/// GET /api/v1/auth/{provider}/login?state=...
#[utoipa::path(
    get,
    path = "/api/v1/auth/{provider}/login",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("state" = String, Query, description = "Anti-forgery state")
    ),
    responses(
        (status = 302, description = "Redirect to the provider"),
        (status = 400, description = "Missing state"),
        (status = 404, description = "Unknown provider")
    )
)]
#[get("/auth/{provider}/login")]
pub async fn provider_login(
    registry: web::Data<ProviderRegistry>,
    path: web::Path<String>,
    query: web::Query<LoginQuery>,
) -> AppResult<HttpResponse> {
    let provider = lookup(&registry, &path.into_inner())?;
    if query.state.is_empty() {
        return Err(AppError::InvalidInput("state is required".to_string()));
    }

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, provider.config().authorize_url(&query.state)))
        .finish())
}

/// Resolve the principal behind the caller's provider access token.
///
/// POST /api/v1/auth/{provider}/principal
#[utoipa::path(
    post,
    path = "/api/v1/auth/{provider}/principal",
    tag = "Auth",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 200, description = "Principal resolved", body = PrincipalResponse),
        (status = 401, description = "Missing token or principal refused"),
        (status = 404, description = "Unknown provider")
    ),
    security(("bearer" = []))
)]
#[post("/auth/{provider}/principal")]
pub async fn resolve(
    req: HttpRequest,
    registry: web::Data<ProviderRegistry>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let provider = lookup(&registry, &path.into_inner())?;
    let token = bearer_token(&req)?;

    let timeout = Duration::from_secs(config.principal_timeout_secs);
    let principal = resolve_principal(provider.as_ref(), &token, timeout).await?;

    info!(provider = %provider.name(), "Principal resolved");
    Ok(HttpResponse::Ok().json(PrincipalResponse {
        provider: provider.name().to_string(),
        principal,
    }))
}

/// Provider access token from `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> AppResult<SecretString> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.to_string()))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}
