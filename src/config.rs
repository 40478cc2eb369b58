//! Application configuration loaded from environment variables.

use std::env;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::models::{Source, SourceKind};

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8888;
    pub const DEV_PUBLIC_URL: &str = "http://localhost:8888";
    pub const GITHUB_API_URL: &str = "https://api.github.com";
    pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
    pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
    /// Upper bound for one principal resolution, including org paging.
    pub const PRINCIPAL_TIMEOUT_SECS: u64 = 30;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// GitHub OAuth provider settings.
#[derive(Debug, Clone)]
pub struct GitHubOAuthSettings {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Optional organization allow-list
    pub orgs: Vec<String>,
    pub redirect_url: Option<String>,
    /// REST API base (GitHub Enterprise installs use their own)
    pub api_url: String,
}

/// Generic (OpenID userinfo style) OAuth provider settings.
#[derive(Debug, Clone)]
pub struct GenericOAuthSettings {
    /// Name displayed on the login page
    pub name: Option<String>,
    pub client_id: String,
    pub client_secret: SecretString,
    pub scopes: Vec<String>,
    /// Optional email domain allow-list
    pub domains: Vec<String>,
    pub redirect_url: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    /// Userinfo endpoint returning `{"email": ...}`
    pub api_url: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Externally visible base URL, used for OAuth redirect URLs
    pub public_url: String,
    /// GitHub provider, when client credentials are set
    pub github: Option<GitHubOAuthSettings>,
    /// Generic provider, when client credentials are set
    pub generic: Option<GenericOAuthSettings>,
    /// Data sources served by this instance
    pub sources: Vec<Source>,
    /// Timeout for resolving a principal against a provider
    pub principal_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `DASH_HOST`: Server host (default: 127.0.0.1)
    /// - `DASH_PORT`: Server port (default: 8888)
    /// - `DASH_PUBLIC_URL`: Public base URL (required in production)
    /// - `DASH_GITHUB_CLIENT_ID` / `DASH_GITHUB_CLIENT_SECRET`: enable GitHub login
    /// - `DASH_GITHUB_ORGS`: comma-separated organization allow-list
    /// - `DASH_GITHUB_API_URL`: GitHub API base (default: https://api.github.com)
    /// - `DASH_GENERIC_CLIENT_ID` / `DASH_GENERIC_CLIENT_SECRET`: enable generic login
    /// - `DASH_GENERIC_NAME`: provider name (default: generic)
    /// - `DASH_GENERIC_SCOPES`: comma-separated scopes
    /// - `DASH_GENERIC_DOMAINS`: comma-separated email domain allow-list
    /// - `DASH_GENERIC_AUTH_URL`, `DASH_GENERIC_TOKEN_URL`, `DASH_GENERIC_API_URL`
    /// - `DASH_SOURCES_FILE`: JSON file listing data sources
    /// - `DASH_PRINCIPAL_TIMEOUT_SECS`: provider resolution timeout (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("DASH_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("DASH_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("DASH_PORT must be a valid port number"))?;

        let public_url = match env::var("DASH_PUBLIC_URL") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) if environment.is_development() => defaults::DEV_PUBLIC_URL.to_string(),
            Err(_) => return Err(ConfigError::MissingEnvVar("DASH_PUBLIC_URL")),
        };

        let principal_timeout_secs = env::var("DASH_PRINCIPAL_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::PRINCIPAL_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("DASH_PRINCIPAL_TIMEOUT_SECS must be a valid number")
            })?;

        let github = match (
            env::var("DASH_GITHUB_CLIENT_ID").ok(),
            env::var("DASH_GITHUB_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(client_secret)) => Some(GitHubOAuthSettings {
                client_id,
                client_secret: SecretString::from(client_secret),
                orgs: split_list(&env::var("DASH_GITHUB_ORGS").unwrap_or_default()),
                redirect_url: Some(format!("{}/oauth/github/callback", public_url)),
                api_url: env::var("DASH_GITHUB_API_URL")
                    .unwrap_or_else(|_| defaults::GITHUB_API_URL.to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "DASH_GITHUB_CLIENT_ID and DASH_GITHUB_CLIENT_SECRET must be set together",
                ));
            }
        };

        let generic = match (
            env::var("DASH_GENERIC_CLIENT_ID").ok(),
            env::var("DASH_GENERIC_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(client_secret)) => {
                let name = env::var("DASH_GENERIC_NAME").ok().filter(|n| !n.is_empty());
                let callback_name = name.clone().unwrap_or_else(|| "generic".to_string());
                Some(GenericOAuthSettings {
                    redirect_url: Some(format!("{}/oauth/{}/callback", public_url, callback_name)),
                    name,
                    client_id,
                    client_secret: SecretString::from(client_secret),
                    scopes: split_list(&env::var("DASH_GENERIC_SCOPES").unwrap_or_default()),
                    domains: split_list(&env::var("DASH_GENERIC_DOMAINS").unwrap_or_default()),
                    auth_url: env::var("DASH_GENERIC_AUTH_URL")
                        .map_err(|_| ConfigError::MissingEnvVar("DASH_GENERIC_AUTH_URL"))?,
                    token_url: env::var("DASH_GENERIC_TOKEN_URL")
                        .map_err(|_| ConfigError::MissingEnvVar("DASH_GENERIC_TOKEN_URL"))?,
                    api_url: env::var("DASH_GENERIC_API_URL")
                        .map_err(|_| ConfigError::MissingEnvVar("DASH_GENERIC_API_URL"))?,
                })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "DASH_GENERIC_CLIENT_ID and DASH_GENERIC_CLIENT_SECRET must be set together",
                ));
            }
        };

        let sources = match env::var("DASH_SOURCES_FILE").ok().map(PathBuf::from) {
            Some(path) => load_sources(&path)?,
            None if environment.is_development() => dev_sources(),
            None => Vec::new(),
        };

        let config = Config {
            environment,
            host,
            port,
            public_url,
            github,
            generic,
            sources,
            principal_timeout_secs,
        };

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.public_url == defaults::DEV_PUBLIC_URL {
            errors.push(format!(
                "DASH_PUBLIC_URL is using development default '{}'. Set the externally visible URL.",
                defaults::DEV_PUBLIC_URL
            ));
        }

        if self.github.is_none() && self.generic.is_none() {
            errors.push(
                "No OAuth provider configured. Set DASH_GITHUB_CLIENT_ID or DASH_GENERIC_CLIENT_ID."
                    .to_string(),
            );
        }

        if let Some(ref generic) = self.generic
            && !generic.api_url.starts_with("https://")
        {
            errors.push("DASH_GENERIC_API_URL must use https in production".to_string());
        }

        let mut ids: Vec<i64> = self.sources.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            errors.push("DASH_SOURCES_FILE contains duplicate source IDs".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Split a comma-separated variable, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the JSON list of sources.
fn load_sources(path: &Path) -> Result<Vec<Source>, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::SourcesFile(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| ConfigError::SourcesFile(format!("{}: {}", path.display(), e)))
}

/// Sources seeded in development: one with role support, one without.
fn dev_sources() -> Vec<Source> {
    vec![
        Source {
            id: 1,
            name: "enterprise-dev".to_string(),
            kind: SourceKind::InfluxEnterprise,
            url: "http://localhost:8086".to_string(),
        },
        Source {
            id: 2,
            name: "influx-dev".to_string(),
            kind: SourceKind::Influx,
            url: "http://localhost:8087".to_string(),
        },
    ]
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Unable to load sources file {0}")]
    SourcesFile(String),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
