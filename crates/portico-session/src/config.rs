//! Controller configuration.

use portico_protocol::Route;
use tracing::warn;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// When [`initialize`](crate::SessionController::initialize) should send the
/// user to the login/registration page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandingPolicy {
    /// Every time the controller starts, even over a live session.
    /// Matches what a full page refresh has always done.
    #[default]
    Always,
    /// Only when no session is established yet.
    SkipWhenAuthenticated,
}

/// What [`end_session`](crate::SessionController::end_session) does with
/// local state when the logout call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutPolicy {
    /// Leave flags, user, and stored credential untouched. The session
    /// still looks active, which is accurate: the server never revoked it.
    #[default]
    RetainOnFailure,
    /// Tear down locally anyway. The credential may remain valid
    /// server-side until it expires.
    ClearOnFailure,
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`SessionController`](crate::SessionController).
///
/// The defaults reproduce the wire behavior the session service and its
/// identity providers expect. Usually only `origin` needs to change.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// The application's origin (`scheme://host[:port]`). The OAuth
    /// callback URL is `origin + callback_path`.
    pub origin: String,

    /// Path of the callback page. Default: [`Route::Callback`]'s path.
    pub callback_path: String,

    /// Path of the provider's authorization endpoint.
    /// Default: `/oauth2/v1/authorize`.
    pub authorize_path: String,

    /// Scopes requested from the provider.
    /// Default: `openid email groups offline_access`.
    pub scopes: Vec<String>,

    /// Length of the `state` nonce. Default: 10.
    pub nonce_len: usize,

    pub landing_policy: LandingPolicy,

    pub logout_policy: LogoutPolicy,

    /// Whether [`complete_callback`](crate::SessionController::complete_callback)
    /// checks the returned `state` against the stored nonce. Default: true.
    pub verify_state: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost".to_string(),
            callback_path: Route::Callback.path().to_string(),
            authorize_path: "/oauth2/v1/authorize".to_string(),
            scopes: ["openid", "email", "groups", "offline_access"]
                .map(String::from)
                .to_vec(),
            nonce_len: 10,
            landing_policy: LandingPolicy::default(),
            logout_policy: LogoutPolicy::default(),
            verify_state: true,
        }
    }
}

impl ControllerConfig {
    /// Shortest nonce accepted.
    pub const MIN_NONCE_LEN: usize = 8;
    /// Longest nonce accepted.
    pub const MAX_NONCE_LEN: usize = 128;

    /// Defaults with the given origin.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically when a controller is built. Rules:
    /// - `nonce_len` clamped to [`Self::MIN_NONCE_LEN`]..=[`Self::MAX_NONCE_LEN`].
    /// - Trailing `/` stripped from `origin`.
    /// - `callback_path` and `authorize_path` forced to start with `/`.
    pub fn validated(mut self) -> Self {
        let clamped = self
            .nonce_len
            .clamp(Self::MIN_NONCE_LEN, Self::MAX_NONCE_LEN);
        if clamped != self.nonce_len {
            warn!(
                nonce_len = self.nonce_len,
                clamped, "nonce_len out of range, clamping"
            );
            self.nonce_len = clamped;
        }
        let trimmed_len = self.origin.trim_end_matches('/').len();
        self.origin.truncate(trimmed_len);
        for path in [&mut self.callback_path, &mut self.authorize_path] {
            if !path.starts_with('/') {
                path.insert(0, '/');
            }
        }
        self
    }

    /// The redirect URL registered with the provider.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.origin, self.callback_path)
    }

    /// Scopes as they appear in the authorization query string.
    pub fn scope_param(&self) -> String {
        self.scopes.join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_callback_url_and_scope() {
        let cfg = ControllerConfig::with_origin("https://app.example.com").validated();

        assert_eq!(cfg.callback_path, Route::Callback.path());
        assert_eq!(cfg.callback_url(), "https://app.example.com/account/callback");
        assert_eq!(cfg.scope_param(), "openid+email+groups+offline_access");
    }

    #[test]
    fn test_validated_clamps_nonce_len() {
        let short = ControllerConfig {
            nonce_len: 2,
            ..Default::default()
        }
        .validated();
        let long = ControllerConfig {
            nonce_len: 10_000,
            ..Default::default()
        }
        .validated();

        assert_eq!(short.nonce_len, ControllerConfig::MIN_NONCE_LEN);
        assert_eq!(long.nonce_len, ControllerConfig::MAX_NONCE_LEN);
    }

    #[test]
    fn test_validated_normalizes_origin_and_paths() {
        let cfg = ControllerConfig {
            origin: "https://app/".into(),
            callback_path: "cb".into(),
            ..Default::default()
        }
        .validated();

        assert_eq!(cfg.callback_url(), "https://app/cb");
        assert_eq!(cfg.authorize_path, "/oauth2/v1/authorize");
    }

    #[test]
    fn test_default_policies_match_refresh_behavior() {
        let cfg = ControllerConfig::default();

        assert_eq!(cfg.landing_policy, LandingPolicy::Always);
        assert_eq!(cfg.logout_policy, LogoutPolicy::RetainOnFailure);
        assert!(cfg.verify_state);
    }
}
