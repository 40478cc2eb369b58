//! Source resolution and role capability probing.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_source_without_roles_is_not_found() {
    let app = create_test_app().await;

    let requests = [
        test::TestRequest::get().uri("/api/v1/sources/2/roles"),
        test::TestRequest::get().uri("/api/v1/sources/2/roles/admin"),
        test::TestRequest::post()
            .uri("/api/v1/sources/2/roles")
            .set_json(json!({"name": "admin"})),
        test::TestRequest::patch()
            .uri("/api/v1/sources/2/roles/admin")
            .set_json(json!({"users": []})),
        test::TestRequest::delete().uri("/api/v1/sources/2/roles/admin"),
    ];

    for req in requests {
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "NO_ROLE_CAPABILITY");
        assert_eq!(body["message"], "Source 2 does not have role capability");
    }
}

#[actix_rt::test]
async fn test_unknown_source() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/sources/42/roles");
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Source 42 not found");
}

#[actix_rt::test]
async fn test_non_numeric_source_id() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/sources/abc/roles");
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_sources_keep_separate_roles() {
    let sources = [
        (1, dashauth_lib::models::SourceKind::InfluxEnterprise),
        (3, dashauth_lib::models::SourceKind::InfluxEnterprise),
    ];
    let registry = dashauth_lib::sources::SourceRegistry::new(sources.map(|(id, kind)| {
        dashauth_lib::models::Source {
            id,
            name: format!("source-{}", id),
            kind,
            url: "http://localhost:8086".to_string(),
        }
    }));
    let app = test::init_service(
        actix_web::App::new()
            .app_data(actix_web::web::Data::new(registry))
            .service(
                actix_web::web::scope("/api/v1")
                    .configure(dashauth_lib::services::roles::configure_routes),
            ),
    )
    .await;

    create_role(&app, 1, json!({"name": "admin"})).await;

    let req = test::TestRequest::get().uri("/api/v1/sources/3/roles/admin");
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, 404);
    let req = test::TestRequest::get().uri("/api/v1/sources/1/roles/admin");
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, 200);
}
