//! Source role management endpoints.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Permissions, RoleListResponse, RoleRequest, RoleResponse, RoleUser};
use crate::sources::SourceSeries;
use crate::store::StoreError;

/// Longest role name a source accepts.
pub const MAX_ROLE_NAME_LEN: usize = 254;

/// Configure source role routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_roles)
        .service(create_role)
        .service(get_role)
        .service(update_role)
        .service(delete_role);
}

/// Check a role about to be created.
pub fn validate_create(req: &RoleRequest) -> AppResult<()> {
    if req.name.is_empty() || req.name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(AppError::InvalidInput(
            "Name is required for a role".to_string(),
        ));
    }
    validate_users(req.users.as_deref())?;
    validate_permissions(req.permissions.as_ref())
}

/// Check a role update. The name may be empty since the path names the role.
pub fn validate_update(req: &RoleRequest) -> AppResult<()> {
    if req.name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Role name too long; must be at most {} characters",
            MAX_ROLE_NAME_LEN
        )));
    }
    validate_users(req.users.as_deref())?;
    validate_permissions(req.permissions.as_ref())
}

fn validate_users(users: Option<&[RoleUser]>) -> AppResult<()> {
    if users.unwrap_or_default().iter().any(|u| u.name.is_empty()) {
        return Err(AppError::InvalidInput("Username required".to_string()));
    }
    Ok(())
}

/// Permission scopes must be named and list only named actions.
pub fn validate_permissions(permissions: Option<&Permissions>) -> AppResult<()> {
    let Some(permissions) = permissions else {
        return Ok(());
    };
    for (scope, actions) in permissions {
        if scope.is_empty() {
            return Err(AppError::InvalidInput(
                "Permission scope is required".to_string(),
            ));
        }
        if actions.iter().any(|a| a.is_empty()) {
            return Err(AppError::InvalidInput(format!(
                "Empty action in permission scope '{}'",
                scope
            )));
        }
    }
    Ok(())
}

fn located(builder: &mut actix_web::HttpResponseBuilder, role: RoleResponse) -> HttpResponse {
    builder
        .insert_header((header::LOCATION, role.links.self_link.clone()))
        .json(role)
}

/// Create a role on a source.
///
/// POST /api/v1/sources/{id}/roles
#[utoipa::path(
    post,
    path = "/api/v1/sources/{id}/roles",
    tag = "Roles",
    params(("id" = i64, Path, description = "Source ID")),
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Invalid role or role already exists"),
        (status = 404, description = "Source not found or without role capability")
    )
)]
#[post("/sources/{id}/roles")]
pub async fn create_role(
    body: web::Json<RoleRequest>,
    series: SourceSeries,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_create(&req)?;

    let roles = series.roles()?;
    let role = req.into_role();
    let name = role.name.clone();
    let created = roles.add(role).await.map_err(|e| match e {
        StoreError::AlreadyExists(_) => AppError::AlreadyExists(format!(
            "Source {} already has role {}",
            series.id(),
            name
        )),
        other => other.into(),
    })?;

    info!(source_id = series.id(), role = %created.name, "Role created");
    Ok(located(
        &mut HttpResponse::Created(),
        RoleResponse::new(series.id(), &created),
    ))
}

/// List the roles of a source, ordered by name.
///
/// GET /api/v1/sources/{id}/roles
#[utoipa::path(
    get,
    path = "/api/v1/sources/{id}/roles",
    tag = "Roles",
    params(("id" = i64, Path, description = "Source ID")),
    responses(
        (status = 200, description = "Roles of the source", body = RoleListResponse),
        (status = 404, description = "Source not found or without role capability")
    )
)]
#[get("/sources/{id}/roles")]
pub async fn list_roles(series: SourceSeries) -> AppResult<HttpResponse> {
    let roles = series.roles()?.all().await?;
    let roles = roles
        .iter()
        .map(|r| RoleResponse::new(series.id(), r))
        .collect();
    Ok(HttpResponse::Ok().json(RoleListResponse { roles }))
}

/// Get one role of a source.
///
/// GET /api/v1/sources/{id}/roles/{name}
#[utoipa::path(
    get,
    path = "/api/v1/sources/{id}/roles/{name}",
    tag = "Roles",
    params(
        ("id" = i64, Path, description = "Source ID"),
        ("name" = String, Path, description = "Role name")
    ),
    responses(
        (status = 200, description = "Role details", body = RoleResponse),
        (status = 404, description = "Source, capability or role not found")
    )
)]
#[get("/sources/{id}/roles/{name}")]
pub async fn get_role(
    series: SourceSeries,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (_, name) = path.into_inner();
    let role = series.roles()?.get(&name).await?;
    Ok(HttpResponse::Ok().json(RoleResponse::new(series.id(), &role)))
}

/// Change the users and/or permissions of a role.
///
/// PATCH /api/v1/sources/{id}/roles/{name}
#[utoipa::path(
    patch,
    path = "/api/v1/sources/{id}/roles/{name}",
    tag = "Roles",
    params(
        ("id" = i64, Path, description = "Source ID"),
        ("name" = String, Path, description = "Role name")
    ),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Source, capability or role not found")
    )
)]
#[patch("/sources/{id}/roles/{name}")]
pub async fn update_role(
    body: web::Json<RoleRequest>,
    series: SourceSeries,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_update(&req)?;

    let roles = series.roles()?;
    let (_, name) = path.into_inner();
    let updated = roles.update(req.into_update(name)).await?;

    info!(source_id = series.id(), role = %updated.name, "Role updated");
    Ok(located(
        &mut HttpResponse::Ok(),
        RoleResponse::new(series.id(), &updated),
    ))
}

/// Remove a role from a source.
///
/// DELETE /api/v1/sources/{id}/roles/{name}
#[utoipa::path(
    delete,
    path = "/api/v1/sources/{id}/roles/{name}",
    tag = "Roles",
    params(
        ("id" = i64, Path, description = "Source ID"),
        ("name" = String, Path, description = "Role name")
    ),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Source, capability or role not found")
    )
)]
#[delete("/sources/{id}/roles/{name}")]
pub async fn delete_role(
    series: SourceSeries,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (_, name) = path.into_inner();
    series.roles()?.delete(&name).await?;

    info!(source_id = series.id(), role = %name, "Role deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// JSON body config rendering malformed bodies as `InvalidInput`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidInput(format!("Unparsable JSON: {}", err)).into()
    })
}
