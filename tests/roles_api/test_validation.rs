//! Request validation on create and update.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_rejects_invalid_roles() {
    let app = create_test_app().await;

    let bodies = [
        json!({"users": [{"name": "marty"}]}),
        json!({"name": ""}),
        json!({"name": "r".repeat(255)}),
        json!({"name": "admin", "users": [{"name": ""}]}),
        json!({"name": "admin", "permissions": {"": ["ViewAdmin"]}}),
        json!({"name": "admin", "permissions": {"all": [""]}}),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/api/v1/sources/1/roles")
            .set_json(body.clone());
        let (status, _, resp) = send(&app, req).await;
        assert_eq!(status, 400, "expected 400 for {}", body);
        assert_eq!(resp["error"], "INVALID_INPUT");
    }

    let req = test::TestRequest::get().uri("/api/v1/sources/1/roles");
    let (_, _, body) = send(&app, req).await;
    assert_eq!(body, json!({"roles": []}));
}

#[actix_rt::test]
async fn test_create_accepts_longest_name() {
    let app = create_test_app().await;
    create_role(&app, ENTERPRISE_SOURCE, json!({"name": "r".repeat(254)})).await;
}

#[actix_rt::test]
async fn test_update_validation() {
    let app = create_test_app().await;
    create_role(&app, ENTERPRISE_SOURCE, json!({"name": "admin"})).await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/sources/1/roles/admin")
        .set_json(json!({"users": [{"name": ""}]}));
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, 400);

    let req = test::TestRequest::patch()
        .uri("/api/v1/sources/1/roles/admin")
        .set_json(json!({"name": "r".repeat(255)}));
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_malformed_json() {
    let app = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/sources/1/roles")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"name\": ");
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}
