//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dashboard Auth Server",
        version = "0.1.0",
        description = "OAuth2 principal resolution and per-source role management"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::info,
        // Login endpoints
        services::login::list_providers,
        services::login::provider_login,
        services::login::resolve,
        // Role endpoints
        services::roles::create_role,
        services::roles::list_roles,
        services::roles::get_role,
        services::roles::update_role,
        services::roles::delete_role,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::SelfLinks,
            // Health
            api::health::HealthResponse,
            api::health::ServerInfoResponse,
            // Auth
            services::login::ProviderInfo,
            services::login::ProviderListResponse,
            services::login::PrincipalResponse,
            // Roles
            models::RoleUser,
            models::UserResponse,
            models::RoleRequest,
            models::RoleResponse,
            models::RoleListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "OAuth provider login and principal resolution"),
        (name = "Roles", description = "Roles of data sources")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
