//! Data sources (tenants) that roles are scoped to.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Flavour of time-series backend behind a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Open source InfluxDB: users only, no roles
    Influx,
    /// InfluxDB Enterprise: users and roles
    InfluxEnterprise,
}

impl SourceKind {
    /// Whether sources of this kind manage roles.
    pub fn supports_roles(&self) -> bool {
        matches!(self, Self::InfluxEnterprise)
    }
}

/// A configured data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Source {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub url: String,
}
