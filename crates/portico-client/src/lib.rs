//! Session service clients for Portico.
//!
//! Provides the [`SessionApi`] trait, which abstracts the four calls the
//! session controller makes to the identity/session service:
//!
//! | Call | Endpoint | Auth |
//! |---|---|---|
//! | [`list_providers`](SessionApi::list_providers) | `GET /v1/providers` | none |
//! | [`login`](SessionApi::login) | `POST /v1/login` | none |
//! | [`introspect`](SessionApi::introspect) | `GET /v1/introspect` | bearer |
//! | [`logout`](SessionApi::logout) | `POST /v1/logout` | bearer |
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpSessionApi`], a `reqwest`-backed client

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use error::ClientError;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSessionApi};
pub use memory::{ApiCall, InMemorySessionApi};

use portico_protocol::{
    AccessCredential, IdentityProvider, LoginRequest, LoginResponse,
    UserProfile,
};

/// The identity/session service, as seen by the session controller.
///
/// Combines the provider directory client (read once at startup) and the
/// session exchange client (code exchange, introspection, logout).
pub trait SessionApi: Send + Sync + 'static {
    /// Fetches the ordered list of configured identity providers.
    async fn list_providers(
        &self,
    ) -> Result<Vec<IdentityProvider>, ClientError>;

    /// Exchanges an authorization code for an access credential.
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ClientError>;

    /// Validates a credential and returns the user it belongs to.
    async fn introspect(
        &self,
        credential: &AccessCredential,
    ) -> Result<UserProfile, ClientError>;

    /// Revokes a credential server-side.
    async fn logout(
        &self,
        credential: &AccessCredential,
    ) -> Result<(), ClientError>;
}

impl<T: SessionApi + ?Sized> SessionApi for std::sync::Arc<T> {
    async fn list_providers(
        &self,
    ) -> Result<Vec<IdentityProvider>, ClientError> {
        (**self).list_providers().await
    }

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ClientError> {
        (**self).login(request).await
    }

    async fn introspect(
        &self,
        credential: &AccessCredential,
    ) -> Result<UserProfile, ClientError> {
        (**self).introspect(credential).await
    }

    async fn logout(
        &self,
        credential: &AccessCredential,
    ) -> Result<(), ClientError> {
        (**self).logout(credential).await
    }
}
