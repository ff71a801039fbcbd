//! Error types for the protocol layer.
//!
//! Each crate in Portico defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of the data (a body that
//! doesn't parse, a provider record that can't be used), not in networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a server that answered with HTML instead of JSON,
    /// missing required fields like `accessKey`, or a truncated body.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A provider record that can't be used to start a login,
    /// e.g. one with an empty host or client ID.
    #[error("invalid provider {id}: {reason}")]
    InvalidProvider {
        /// The offending provider's ID.
        id: String,
        /// What's wrong with it.
        reason: String,
    },
}
