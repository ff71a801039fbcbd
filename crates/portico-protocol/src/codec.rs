//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The HTTP client reads response bodies as bytes and hands them to a
//! codec, so every decoding failure surfaces as a [`ProtocolError`]
//! regardless of which HTTP library fetched the bytes.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` lets a codec live inside a long-lived client
/// that is shared across async tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The session service speaks JSON on every endpoint, so this is the
/// only codec Portico ships.
///
/// ## Example
///
/// ```rust
/// use portico_protocol::{Codec, JsonCodec, LoginResponse};
///
/// let codec = JsonCodec;
/// let resp: LoginResponse = codec.decode(br#"{"accessKey":"tok"}"#).unwrap();
/// assert_eq!(resp.access_key.expose(), "tok");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IdentityProvider, LoginRequest};

    #[test]
    fn test_decode_provider_list_preserves_order() {
        let body = br#"[
            {"id":"b","url":"b.example.com","clientID":"cb"},
            {"id":"a","url":"a.example.com","clientID":"ca","name":"Okta"}
        ]"#;

        let providers: Vec<IdentityProvider> =
            JsonCodec.decode(body).expect("should decode");

        let ids: Vec<_> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(providers[1].name.as_deref(), Some("Okta"));
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<IdentityProvider, _> =
            JsonCodec.decode(b"<html>bad gateway</html>");

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_login_request_uses_service_field_names() {
        let req = LoginRequest {
            provider_id: "p1".into(),
            code: "code123".into(),
            redirect_url: "https://app/callback".into(),
        };

        let bytes = JsonCodec.encode(&req).expect("should encode");
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["providerID"], "p1");
        assert_eq!(json["code"], "code123");
        assert_eq!(json["redirectURL"], "https://app/callback");
    }
}
