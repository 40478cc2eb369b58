//! GitHub provider: organization paging and membership, primary email.

use dashauth_lib::oauth::github::MAX_ORG_PAGES;
use dashauth_lib::oauth::{GitHubProvider, Provider, ProviderError};
use serde_json::json;

use super::mock_api::{MockApi, MockState};
use super::test_helpers::*;

fn emails() -> serde_json::Value {
    json!([
        {"email": "marty@gmail.com", "verified": true},
        {"email": "marty@hillvalley.edu", "primary": true, "verified": true}
    ])
}

#[actix_rt::test]
async fn test_primary_email_without_org_filter() {
    let mock = MockApi::start(MockState {
        emails: emails(),
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &[]));

    assert_eq!(
        provider.principal_id(&client()).await.unwrap(),
        "marty@hillvalley.edu"
    );
    assert!(mock.org_requests().is_empty());
}

#[actix_rt::test]
async fn test_member_found_on_later_page() {
    let page1: Vec<_> = (0..10).map(|i| json!({"login": format!("org-{i}")})).collect();
    let mock = MockApi::start(MockState {
        emails: emails(),
        org_pages: vec![json!(page1), json!([{"login": "hill-valley"}])],
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &["hill-valley"]));

    assert_eq!(
        provider.principal_id(&client()).await.unwrap(),
        "marty@hillvalley.edu"
    );
    assert_eq!(mock.org_requests(), vec![1, 2]);
}

#[actix_rt::test]
async fn test_non_member_refused_before_email_lookup() {
    let mock = MockApi::start(MockState {
        emails: emails(),
        org_pages: vec![json!([{"login": "biffco"}, {}])],
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &["hill-valley"]));

    let err = provider.principal_id(&client()).await.unwrap_err();
    assert!(matches!(err, ProviderError::OrgNotAllowed), "{err}");
    assert_eq!(mock.email_calls(), 0);
}

#[actix_rt::test]
async fn test_endless_org_paging_is_cut_off() {
    let mock = MockApi::start(MockState {
        emails: emails(),
        org_pages: vec![json!([{"login": "biffco"}])],
        endless_orgs: true,
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &["hill-valley"]));

    let err = provider.principal_id(&client()).await.unwrap_err();
    assert!(matches!(err, ProviderError::PaginationLimit(n) if n == MAX_ORG_PAGES));
    assert_eq!(mock.org_requests().len(), MAX_ORG_PAGES as usize);
}

#[actix_rt::test]
async fn test_forbidden_org_listing() {
    let mock = MockApi::start(MockState {
        status: Some(403),
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &["hill-valley"]));

    let err = provider.principal_id(&client()).await.unwrap_err();
    assert!(err.is_forbidden(), "{err}");
}

#[actix_rt::test]
async fn test_email_failure_is_an_error() {
    let mock = MockApi::start(MockState {
        status: Some(500),
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &[]));

    let err = provider.principal_id(&client()).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
}

#[actix_rt::test]
async fn test_unverified_primary_is_not_a_principal() {
    let mock = MockApi::start(MockState {
        emails: json!([{"email": "marty@hillvalley.edu", "primary": true}]),
        ..Default::default()
    })
    .await;
    let provider = GitHubProvider::new(github_settings(&mock, &[]));

    let err = provider.principal_id(&client()).await.unwrap_err();
    assert!(matches!(err, ProviderError::NoPrimaryEmail), "{err}");
}
