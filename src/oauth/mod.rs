//! OAuth2 identity providers.
//!
//! A provider knows how to describe its OAuth2 exchange (client credentials,
//! scopes, endpoints) and how to turn an already-authenticated HTTP client
//! into a principal: the user's verified primary email address.
//!
//! The code-for-token exchange happens outside this crate. Callers hand
//! over a client built by [`authenticated_client`] once they hold a token.

mod email;
pub mod generic;
pub mod github;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

pub use email::{UserEmail, primary_email};
pub use generic::GenericProvider;
pub use github::GitHubProvider;

/// HTTP connect timeout for provider API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for provider API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// User agent sent to provider APIs (GitHub rejects requests without one).
const PROVIDER_USER_AGENT: &str = "dashauth";

/// Errors raised while resolving a principal.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network failure talking to the provider
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned status {0}")]
    Status(StatusCode),

    /// Provider response body could not be decoded
    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Access token cannot be carried in an HTTP header
    #[error("Access token is not a valid header value")]
    InvalidToken,

    #[error("No primary email address")]
    NoPrimaryEmail,

    #[error("Not a member of required domain")]
    DomainNotAllowed,

    #[error("Not a member of required organization")]
    OrgNotAllowed,

    /// Organization listing did not terminate within the page cap
    #[error("Organization listing exceeded {0} pages")]
    PaginationLimit(u32),

    #[error("Principal resolution timed out")]
    Timeout,
}

impl ProviderError {
    /// HTTP status reported by the provider, if the failure carried one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Status(status) => Some(*status),
            ProviderError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// True when the provider refused the token (401/403).
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// OAuth2 authorization server endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub auth_url: String,
    pub token_url: String,
}

/// Everything a generic OAuth2 exchange needs from a provider.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub scopes: Vec<String>,
    pub redirect_url: Option<String>,
    pub endpoint: Endpoint,
}

impl OAuth2Config {
    /// Build the authorization URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        let separator = if self.endpoint.auth_url.contains('?') {
            '&'
        } else {
            '?'
        };

        let mut url = format!(
            "{}{}response_type=code&client_id={}",
            self.endpoint.auth_url,
            separator,
            urlencoding::encode(&self.client_id)
        );
        if let Some(ref redirect) = self.redirect_url {
            url.push_str("&redirect_uri=");
            url.push_str(&urlencoding::encode(redirect));
        }
        if !self.scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(&self.scopes.join(" ")));
        }
        url.push_str("&state=");
        url.push_str(&urlencoding::encode(state));
        url
    }
}

/// An identity source able to resolve a principal after OAuth2 login.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used for routing and display.
    fn name(&self) -> &str;

    /// OAuth2 client ID.
    fn id(&self) -> &str;

    /// OAuth2 client secret.
    fn secret(&self) -> &str;

    /// Minimum scopes needed to resolve a principal.
    fn scopes(&self) -> Vec<String>;

    /// OAuth2 exchange information and endpoints.
    fn config(&self) -> OAuth2Config;

    /// Resolve and authorize the principal behind an authenticated client.
    ///
    /// Returns the verified email only when every configured restriction
    /// passed.
    async fn principal_id(&self, client: &reqwest::Client) -> Result<String, ProviderError>;
}

/// Build an HTTP client that presents `access_token` to the provider API.
pub fn authenticated_client(access_token: &SecretString) -> Result<reqwest::Client, ProviderError> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", access_token.expose_secret()))
        .map_err(|_| ProviderError::InvalidToken)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(PROVIDER_USER_AGENT));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// GET `url`, failing on transport errors and non-success statuses.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    url: &str,
) -> Result<reqwest::Response, ProviderError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status));
    }
    Ok(response)
}

/// Read a response body as JSON.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
