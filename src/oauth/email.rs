//! Email records returned by provider email-listing endpoints.

use serde::{Deserialize, Serialize};

use super::ProviderError;

/// One entry of a provider's email list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl UserEmail {
    /// A record qualifies once the provider reported all three fields.
    pub fn is_eligible(&self) -> bool {
        self.email.is_some() && self.primary.is_some() && self.verified.is_some()
    }
}

/// First eligible email, in the order the provider returned them.
///
/// `null` entries are skipped.
pub fn primary_email(emails: &[Option<UserEmail>]) -> Result<String, ProviderError> {
    emails
        .iter()
        .flatten()
        .find(|m| m.is_eligible())
        .and_then(|m| m.email.clone())
        .ok_or(ProviderError::NoPrimaryEmail)
}
