//! Shared test helpers for the role API tests.

use actix_web::{App, dev::ServiceResponse, test, web};
use dashauth_lib::models::{Source, SourceKind};
use dashauth_lib::services::roles;
use dashauth_lib::sources::SourceRegistry;
use serde_json::Value;

/// Source backed by a role-capable store.
pub const ENTERPRISE_SOURCE: i64 = 1;

fn source(id: i64, kind: SourceKind) -> Source {
    Source {
        id,
        name: format!("source-{}", id),
        kind,
        url: "http://localhost:8086".to_string(),
    }
}

/// Create a test app serving source 1 (with roles) and source 2 (without).
pub async fn create_test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let sources = SourceRegistry::new([
        source(ENTERPRISE_SOURCE, SourceKind::InfluxEnterprise),
        source(2, SourceKind::Influx),
    ]);

    test::init_service(
        App::new()
            .app_data(web::Data::new(sources))
            .app_data(roles::json_config())
            .service(web::scope("/api/v1").configure(roles::configure_routes)),
    )
    .await
}

/// Send a request and return status, `Location` header and JSON body
/// (`Value::Null` for empty bodies).
pub async fn send<S>(app: &S, req: test::TestRequest) -> (u16, Option<String>, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let location = resp
        .headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, location, body)
}

/// Create a role and assert it succeeded.
pub async fn create_role<S>(app: &S, source_id: i64, body: Value) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sources/{}/roles", source_id))
        .set_json(body);
    let (status, _, body) = send(app, req).await;
    assert_eq!(status, 201, "Failed to create role: {}", body);
    body
}
