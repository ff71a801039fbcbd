//! Error types for the session layer.
//!
//! Two levels:
//!
//! - [`SessionError`]: a local collaborator failed (the credential store,
//!   local storage, or the navigator).
//! - [`AuthError`]: what a [`SessionController`](crate::SessionController)
//!   operation returns. Every variant corresponds to one branch of the
//!   login state machine, so callers can tell "the service rejected the
//!   code" apart from "the service is down" apart from "the callback's
//!   state didn't match". [`AuthError::kind`] flattens it to a `Copy` tag
//!   for rendering.

use portico_client::ClientError;
use portico_protocol::ProtocolError;

/// Errors raised by the local collaborators of the controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing the persisted credential failed.
    #[error("credential store failed: {0}")]
    Store(#[source] std::io::Error),

    /// The persisted credential record exists but doesn't parse.
    #[error("credential record is corrupt: {0}")]
    CorruptRecord(#[source] serde_json::Error),

    /// Local (handshake) storage failed.
    #[error("local storage failed: {0}")]
    Storage(String),
}

/// The failure branch an [`AuthError`] came from.
///
/// Unlike a single "login failed" boolean, this lets a UI say *which*
/// step broke. `login_error` is still raised for every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The provider directory couldn't be fetched.
    DirectoryUnavailable,
    /// The login exchange was refused or failed.
    ExchangeRejected,
    /// The credential didn't introspect. If `credential_persisted` is
    /// true, the credential is still in the store.
    IntrospectionFailed { credential_persisted: bool },
    /// The logout call failed.
    LogoutFailed,
    /// The callback's `state` didn't match the stored nonce, or there was
    /// no pending login at all.
    StateMismatch,
    /// The provider record can't be used to build an authorization URL.
    InvalidProvider,
    /// A local collaborator (store, storage, navigator) failed.
    Local,
}

/// Errors returned by [`SessionController`](crate::SessionController)
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("provider directory unavailable: {0}")]
    DirectoryUnavailable(#[source] ClientError),

    #[error("login exchange failed: {0}")]
    ExchangeRejected(#[source] ClientError),

    #[error("introspection failed: {source}")]
    IntrospectionFailed {
        credential_persisted: bool,
        #[source]
        source: ClientError,
    },

    #[error("logout failed: {0}")]
    LogoutFailed(#[source] ClientError),

    #[error("callback state does not match the pending login")]
    StateMismatch,

    /// Only built from [`IdentityProvider::validate`](portico_protocol::IdentityProvider::validate);
    /// other protocol failures arrive wrapped in a [`ClientError`].
    #[error(transparent)]
    InvalidProvider(ProtocolError),

    #[error(transparent)]
    Local(#[from] SessionError),
}

impl AuthError {
    /// Returns the branch this error came from.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::DirectoryUnavailable(_) => AuthErrorKind::DirectoryUnavailable,
            Self::ExchangeRejected(_) => AuthErrorKind::ExchangeRejected,
            Self::IntrospectionFailed {
                credential_persisted,
                ..
            } => AuthErrorKind::IntrospectionFailed {
                credential_persisted: *credential_persisted,
            },
            Self::LogoutFailed(_) => AuthErrorKind::LogoutFailed,
            Self::StateMismatch => AuthErrorKind::StateMismatch,
            Self::InvalidProvider(_) => AuthErrorKind::InvalidProvider,
            Self::Local(_) => AuthErrorKind::Local,
        }
    }
}
