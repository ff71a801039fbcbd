//! Unified error type for Portico.

use portico_client::ClientError;
use portico_protocol::ProtocolError;
use portico_session::{AuthError, SessionError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `portico` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. `#[from]` on each
/// variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PorticoError {
    /// A controller operation failed (directory, exchange, introspection,
    /// logout, callback state).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A session service call failed outside a controller operation.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A body or route didn't parse.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local collaborator (store, storage, navigator) failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
