//! Shared test helpers for provider tests.

use dashauth_lib::config::{GenericOAuthSettings, GitHubOAuthSettings};
use secrecy::SecretString;

use super::mock_api::{MockApi, TEST_TOKEN};

/// Generic provider settings pointing at the mock userinfo endpoint.
pub fn generic_settings(mock: &MockApi, domains: &[&str]) -> GenericOAuthSettings {
    GenericOAuthSettings {
        name: Some("pinheads".to_string()),
        client_id: "generic-client".to_string(),
        client_secret: SecretString::from("generic-secret"),
        scopes: vec!["openid".to_string(), "email".to_string()],
        domains: domains.iter().map(|d| d.to_string()).collect(),
        redirect_url: None,
        auth_url: mock.url("/authorize"),
        token_url: mock.url("/token"),
        api_url: mock.url("/userinfo"),
    }
}

/// GitHub provider settings pointing at the mock API root.
pub fn github_settings(mock: &MockApi, orgs: &[&str]) -> GitHubOAuthSettings {
    GitHubOAuthSettings {
        client_id: "github-client".to_string(),
        client_secret: SecretString::from("github-secret"),
        orgs: orgs.iter().map(|o| o.to_string()).collect(),
        redirect_url: None,
        api_url: mock.base_url.clone(),
    }
}

/// Token the mock accepts.
pub fn token() -> SecretString {
    SecretString::from(TEST_TOKEN)
}

/// Client presenting the accepted token.
pub fn client() -> reqwest::Client {
    dashauth_lib::oauth::authenticated_client(&token()).expect("failed to build client")
}
