//! The OAuth2 authorization-code handshake.
//!
//! Logging in takes two page lifecycles:
//!
//! ```text
//!   page A: begin_login_redirect ──(full-page redirect)──→ provider
//!                                                             │
//!   page B: complete_callback ←──(redirect with code+state)───┘
//! ```
//!
//! Nothing in memory survives that round trip, so everything page B needs
//! (which provider, which nonce, which redirect URL) is written to local
//! storage by page A *before* it leaves. [`OAuthHandshake`] is that record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use portico_protocol::IdentityProvider;
use rand::Rng;

use crate::{ControllerConfig, SessionError};

/// Alphabet for `state` nonces: base-36 digits.
const NONCE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// String key/value storage that survives a full-page navigation.
///
/// Mirrors the browser's `localStorage` API.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        (**self).remove_item(key)
    }
}

/// A [`LocalStorage`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.items
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.items
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OAuthHandshake
// ---------------------------------------------------------------------------

/// The state carried across the redirect round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthHandshake {
    /// The provider the user picked.
    pub provider_id: String,
    /// Random nonce sent as the `state` parameter.
    pub state: String,
    /// Callback URL sent as `redirect_uri`. The login exchange must
    /// repeat it verbatim.
    pub redirect_url: String,
}

impl OAuthHandshake {
    /// Local-storage key for the provider ID.
    pub const PROVIDER_ID_KEY: &'static str = "providerId";
    /// Local-storage key for the nonce.
    pub const STATE_KEY: &'static str = "state";
    /// Local-storage key for the redirect URL.
    pub const REDIRECT_URL_KEY: &'static str = "redirectURL";

    /// Starts a handshake for `provider` with a fresh nonce.
    pub fn start(provider: &IdentityProvider, config: &ControllerConfig) -> Self {
        Self {
            provider_id: provider.id.clone(),
            state: generate_nonce(config.nonce_len),
            redirect_url: config.callback_url(),
        }
    }

    /// Writes all three keys. Provider ID first, then nonce, then redirect
    /// URL; the caller must not navigate away until this returns `Ok`.
    pub fn persist(&self, storage: &impl LocalStorage) -> Result<(), SessionError> {
        storage.set_item(Self::PROVIDER_ID_KEY, &self.provider_id)?;
        storage.set_item(Self::STATE_KEY, &self.state)?;
        storage.set_item(Self::REDIRECT_URL_KEY, &self.redirect_url)?;
        Ok(())
    }

    /// Reads a persisted handshake. Returns `None` unless all three keys
    /// are present.
    pub fn load(storage: &impl LocalStorage) -> Result<Option<Self>, SessionError> {
        let provider_id = storage.get_item(Self::PROVIDER_ID_KEY)?;
        let state = storage.get_item(Self::STATE_KEY)?;
        let redirect_url = storage.get_item(Self::REDIRECT_URL_KEY)?;

        Ok(match (provider_id, state, redirect_url) {
            (Some(provider_id), Some(state), Some(redirect_url)) => Some(Self {
                provider_id,
                state,
                redirect_url,
            }),
            _ => None,
        })
    }

    /// Removes all three keys.
    pub fn clear(storage: &impl LocalStorage) -> Result<(), SessionError> {
        storage.remove_item(Self::PROVIDER_ID_KEY)?;
        storage.remove_item(Self::STATE_KEY)?;
        storage.remove_item(Self::REDIRECT_URL_KEY)?;
        Ok(())
    }

    /// Builds the provider's authorization URL.
    ///
    /// Values go in as-is and scopes are joined with `+`, which is exactly
    /// what providers already have registered for this client:
    ///
    /// ```text
    /// https://<url><authorize_path>?redirect_uri=..&client_id=..
    ///     &response_type=code&scope=openid+email+groups+offline_access&state=..
    /// ```
    pub fn authorize_url(
        &self,
        provider: &IdentityProvider,
        config: &ControllerConfig,
    ) -> String {
        format!(
            "https://{}{}?redirect_uri={}&client_id={}&response_type=code&scope={}&state={}",
            provider.url,
            config.authorize_path,
            self.redirect_url,
            provider.client_id,
            config.scope_param(),
            self.state,
        )
    }

    /// Compares the `state` a callback returned with the stored nonce.
    ///
    /// Runs in time independent of where the first mismatch is.
    pub fn matches_state(&self, returned: &str) -> bool {
        let (a, b) = (self.state.as_bytes(), returned.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

/// Generates a random nonce of `len` characters from `[0-9a-z]`.
pub fn generate_nonce(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| NONCE_ALPHABET[rng.random_range(0..NONCE_ALPHABET.len())] as char)
        .collect()
}
