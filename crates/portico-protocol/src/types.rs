//! Core protocol types for the session service's wire format.
//!
//! Field names on the wire follow the service's JSON (`clientID`,
//! `providerID`, `redirectURL`, `accessKey`), so most structs carry
//! `#[serde(rename = ...)]` attributes while keeping Rust-style names
//! in code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// AccessCredential
// ---------------------------------------------------------------------------

/// An opaque bearer token granting API access.
///
/// Issued by the login exchange (or handed in directly by a caller that
/// already owns a key). It's a newtype around `String` so it can't be
/// mixed up with an authorization code or a nonce, and so it never ends
/// up in logs by accident: both `Debug` and `Display` print a redacted
/// placeholder. Use [`expose`](Self::expose) when the raw value is
/// genuinely needed (the `Authorization` header, the credential store).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCredential(String);

impl AccessCredential {
    /// Wraps a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential(<redacted>)")
    }
}

impl fmt::Display for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<&str> for AccessCredential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessCredential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// IdentityProvider
// ---------------------------------------------------------------------------

/// A configured identity provider the user can log in with.
///
/// Fetched once from the provider directory when the controller starts.
/// The directory returns an ordered list and that order is preserved:
/// it's the order the login chooser shows them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    /// Server-assigned provider ID. Sent back as `providerID` on login.
    pub id: String,

    /// The provider's host, without scheme (e.g. `idp.example.com`).
    pub url: String,

    /// OAuth2 client ID registered with the provider.
    #[serde(rename = "clientID")]
    pub client_id: String,

    /// Human-readable name for the login chooser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdentityProvider {
    /// Returns the name to show in a login chooser, falling back to the
    /// provider's host when the directory didn't supply one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }

    /// Checks that this record has everything needed to build an
    /// authorization request.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidProvider`] when the host or client
    /// ID is empty.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let reason = if self.url.trim().is_empty() {
            "empty url"
        } else if self.client_id.trim().is_empty() {
            "empty clientID"
        } else {
            return Ok(());
        };
        Err(ProtocolError::InvalidProvider {
            id: self.id.clone(),
            reason: reason.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// The user returned by introspection.
///
/// Only `id` is required. Anything else the service sends is kept in
/// `extra` so a rendering layer can read fields Portico doesn't model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID.
    pub id: String,

    /// Display name, if the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address, if the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Every other field from the introspection response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Creates a profile with just an ID.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            extra: serde_json::Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Login exchange
// ---------------------------------------------------------------------------

/// Body of `POST /v1/login`: trade an authorization code for a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Which provider issued the code.
    #[serde(rename = "providerID")]
    pub provider_id: String,

    /// The single-use authorization code from the callback.
    pub code: String,

    /// The redirect URL the authorization request used. Providers
    /// require it to match exactly.
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
}

/// Response of `POST /v1/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The issued access credential.
    #[serde(rename = "accessKey")]
    pub access_key: AccessCredential,

    /// The logged-in user's ID, when the service includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The logged-in user's name, when the service includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(url: &str, client_id: &str) -> IdentityProvider {
        IdentityProvider {
            id: "p1".into(),
            url: url.into(),
            client_id: client_id.into(),
            name: None,
        }
    }

    #[test]
    fn test_access_credential_debug_is_redacted() {
        let cred = AccessCredential::new("super-secret");

        assert!(!format!("{cred:?}").contains("super-secret"));
        assert!(!cred.to_string().contains("super-secret"));
        assert_eq!(cred.expose(), "super-secret");
    }

    #[test]
    fn test_access_credential_serializes_as_bare_string() {
        let json = serde_json::to_string(&AccessCredential::new("tok")).unwrap();

        assert_eq!(json, r#""tok""#);
    }

    #[test]
    fn test_display_name_falls_back_to_url() {
        let mut p = provider("idp.example.com", "abc");
        assert_eq!(p.display_name(), "idp.example.com");

        p.name = Some("Okta".into());
        assert_eq!(p.display_name(), "Okta");
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let err = provider("  ", "abc").validate().unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::InvalidProvider { ref reason, .. } if reason == "empty url"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let err = provider("idp.example.com", "").validate().unwrap_err();

        assert!(err.to_string().contains("clientID"));
    }

    #[test]
    fn test_validate_accepts_complete_provider() {
        assert!(provider("idp.example.com", "abc").validate().is_ok());
    }

    #[test]
    fn test_user_profile_keeps_unknown_fields() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id":"u1","email":"a@b.c","groups":["admins"]}"#,
        )
        .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
        assert!(user.name.is_none());
        assert_eq!(user.extra["groups"][0], "admins");
    }

    #[test]
    fn test_login_response_requires_access_key() {
        let result: Result<LoginResponse, _> = serde_json::from_str(r#"{"id":"u1"}"#);

        assert!(result.is_err());
    }
}
