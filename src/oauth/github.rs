//! GitHub OAuth2 provider.
//!
//! Resolves the user's primary email through the REST API and, when an
//! organization allow-list is configured, requires membership in one of
//! the listed organizations. Non-members are refused before any email
//! lookup happens.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, error};

use super::{Endpoint, OAuth2Config, Provider, ProviderError, UserEmail, decode, fetch, primary_email};
use crate::config::{GitHubOAuthSettings, defaults};

/// Organizations requested per page.
const ORGS_PER_PAGE: u32 = 10;
/// Hard stop for organization paging.
pub const MAX_ORG_PAGES: u32 = 100;

/// Organization as listed by `GET /user/orgs`.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub login: Option<String>,
}

/// GitHub login with optional organization restriction.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    settings: GitHubOAuthSettings,
}

impl GitHubProvider {
    pub fn new(settings: GitHubOAuthSettings) -> Self {
        Self { settings }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    /// Collect every organization of the authenticated user.
    async fn organizations(
        &self,
        client: &reqwest::Client,
    ) -> Result<Vec<Organization>, ProviderError> {
        let mut orgs = Vec::new();
        let mut page = 1;

        for _ in 0..MAX_ORG_PAGES {
            let url = self.api(&format!("/user/orgs?per_page={}&page={}", ORGS_PER_PAGE, page));
            let (batch, next) = fetch_org_page(client, &url)
                .await
                .inspect_err(|e| log_response_error(e, "organizations"))?;

            orgs.extend(batch);
            if next == 0 {
                return Ok(orgs);
            }
            page = next;
        }

        error!(
            "GitHub organization listing did not finish within {} pages",
            MAX_ORG_PAGES
        );
        Err(ProviderError::PaginationLimit(MAX_ORG_PAGES))
    }

    async fn primary_email(&self, client: &reqwest::Client) -> Result<String, ProviderError> {
        let emails = fetch_emails(client, &self.api("/user/emails"))
            .await
            .inspect_err(|e| log_response_error(e, "email"))?;

        primary_email(&emails).inspect_err(|e| {
            error!("Unable to retrieve primary GitHub email: {}", e);
        })
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn id(&self) -> &str {
        &self.settings.client_id
    }

    fn secret(&self) -> &str {
        self.settings.client_secret.expose_secret()
    }

    /// `user:email` always; `read:org` only when filtering by organization.
    fn scopes(&self) -> Vec<String> {
        let mut scopes = vec!["user:email".to_string()];
        if !self.settings.orgs.is_empty() {
            scopes.push("read:org".to_string());
        }
        scopes
    }

    fn config(&self) -> OAuth2Config {
        OAuth2Config {
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            scopes: self.scopes(),
            redirect_url: self.settings.redirect_url.clone(),
            endpoint: Endpoint {
                auth_url: defaults::GITHUB_AUTH_URL.to_string(),
                token_url: defaults::GITHUB_TOKEN_URL.to_string(),
            },
        }
    }

    async fn principal_id(&self, client: &reqwest::Client) -> Result<String, ProviderError> {
        if !self.settings.orgs.is_empty() {
            let orgs = self.organizations(client).await?;
            if !is_member(&self.settings.orgs, &orgs) {
                error!(
                    required = ?self.settings.orgs,
                    "Not a member of required github organization"
                );
                return Err(ProviderError::OrgNotAllowed);
            }
            debug!("GitHub organization membership confirmed");
        }

        self.primary_email(client).await
    }
}

/// Fetch one page of organizations and the number of the page after it.
async fn fetch_org_page(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<Organization>, u32), ProviderError> {
    let response = fetch(client, url).await?;
    let next = next_page(response.headers());
    let orgs: Vec<Organization> = decode(response).await?;
    Ok((orgs, next))
}

async fn fetch_emails(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Option<UserEmail>>, ProviderError> {
    let response = fetch(client, url).await?;
    decode(response).await
}

fn log_response_error(err: &ProviderError, what: &str) {
    if err.is_forbidden() {
        error!("OAuth access to {} forbidden: {}", what, err);
    } else {
        error!("Unable to retrieve GitHub {}: {}", what, err);
    }
}

/// True when one of the user's organizations is allow-listed (exact login match).
pub fn is_member(required_orgs: &[String], user_orgs: &[Organization]) -> bool {
    required_orgs.iter().any(|required| {
        user_orgs
            .iter()
            .any(|org| org.login.as_deref() == Some(required.as_str()))
    })
}

/// Page number of the `rel="next"` link, or 0 when there is none.
pub fn next_page(headers: &HeaderMap) -> u32 {
    let Some(link) = headers.get(LINK).and_then(|v| v.to_str().ok()) else {
        return 0;
    };

    link.split(',')
        .filter_map(|part| {
            let (target, params) = part.split_once(';')?;
            let is_next = params
                .split(';')
                .any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
            if !is_next {
                return None;
            }
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            let url = reqwest::Url::parse(target).ok()?;
            url.query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse::<u32>().ok())
        })
        .next()
        .unwrap_or(0)
}
