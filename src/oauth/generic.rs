//! Generic OAuth2 provider backed by an OpenID-style userinfo endpoint.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, error};

use super::{Endpoint, OAuth2Config, Provider, ProviderError, UserEmail, decode, fetch, primary_email};
use crate::config::GenericOAuthSettings;

/// Name used when the configuration does not give one.
pub const DEFAULT_NAME: &str = "generic";

/// Userinfo payload; only the email matters here.
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

/// Provider for any OAuth2 server exposing a userinfo endpoint.
#[derive(Debug, Clone)]
pub struct GenericProvider {
    settings: GenericOAuthSettings,
}

impl GenericProvider {
    pub fn new(settings: GenericOAuthSettings) -> Self {
        Self { settings }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.settings.api_url.trim_end_matches('/'))
    }

    /// Look the address up from the email listing when userinfo had none.
    async fn lookup_primary_email(&self, client: &reqwest::Client) -> Result<String, ProviderError> {
        let response = fetch(client, &self.emails_url()).await?;
        let emails: Vec<Option<UserEmail>> = decode(response).await?;

        primary_email(&emails).inspect_err(|e| {
            error!(provider = %self.name(), "Unable to retrieve primary email: {}", e);
        })
    }
}

#[async_trait]
impl Provider for GenericProvider {
    fn name(&self) -> &str {
        self.settings.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    fn id(&self) -> &str {
        &self.settings.client_id
    }

    fn secret(&self) -> &str {
        self.settings.client_secret.expose_secret()
    }

    fn scopes(&self) -> Vec<String> {
        self.settings.scopes.clone()
    }

    fn config(&self) -> OAuth2Config {
        OAuth2Config {
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            scopes: self.scopes(),
            redirect_url: self.settings.redirect_url.clone(),
            endpoint: Endpoint {
                auth_url: self.settings.auth_url.clone(),
                token_url: self.settings.token_url.clone(),
            },
        }
    }

    async fn principal_id(&self, client: &reqwest::Client) -> Result<String, ProviderError> {
        let response = fetch(client, &self.settings.api_url).await?;
        let info: UserInfo = decode(response).await?;

        let email = match info.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                debug!(provider = %self.name(), "userinfo carried no email, listing emails");
                self.lookup_primary_email(client).await?
            }
        };

        if !self.settings.domains.is_empty() && !of_domain(&self.settings.domains, &email) {
            error!(
                provider = %self.name(),
                domains = ?self.settings.domains,
                "Not a member of required domain"
            );
            return Err(ProviderError::DomainNotAllowed);
        }

        Ok(email)
    }
}

/// True when `email` ends with `@domain` for one of the allowed domains.
pub fn of_domain(required_domains: &[String], email: &str) -> bool {
    required_domains
        .iter()
        .any(|domain| email.ends_with(&format!("@{}", domain)))
}
