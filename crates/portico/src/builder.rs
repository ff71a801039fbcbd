//! `PorticoBuilder`: wires a controller to the real session service.

use std::time::Duration;

use portico_client::{HttpConfig, HttpSessionApi};
use portico_session::{
    ControllerConfig, CredentialStore, LocalStorage, Navigator,
    SessionController,
};

use crate::PorticoError;

/// A [`SessionController`] talking to the session service over HTTP.
pub type HttpSessionController<C, L, N> = SessionController<HttpSessionApi, C, L, N>;

/// Builder for a controller backed by [`HttpSessionApi`].
///
/// # Example
///
/// ```rust,ignore
/// use portico::prelude::*;
///
/// let controller = PorticoBuilder::new()
///     .service_url("https://infra.example.com")
///     .origin("https://app.example.com")
///     .build(store, storage, navigator)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PorticoBuilder {
    http: HttpConfig,
    controller: ControllerConfig,
    origin: Option<String>,
}

impl PorticoBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session service's base URL.
    pub fn service_url(mut self, url: &str) -> Self {
        self.http.base_url = url.to_string();
        self
    }

    /// Sets the per-request timeout for service calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Sets the application origin used to build the callback URL.
    ///
    /// Wins over the origin in [`controller_config`](Self::controller_config),
    /// whichever is called first.
    pub fn origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    /// Replaces the controller config.
    pub fn controller_config(mut self, config: ControllerConfig) -> Self {
        self.controller = config;
        self
    }

    /// Builds the HTTP client and the controller.
    ///
    /// # Errors
    /// [`PorticoError::Client`] if the service URL is invalid or the HTTP
    /// client can't be created.
    pub fn build<C, L, N>(
        self,
        credentials: C,
        storage: L,
        navigator: N,
    ) -> Result<HttpSessionController<C, L, N>, PorticoError>
    where
        C: CredentialStore,
        L: LocalStorage,
        N: Navigator,
    {
        let mut controller = self.controller;
        if let Some(origin) = self.origin {
            controller.origin = origin;
        }
        tracing::debug!(service = %self.http.base_url, origin = %controller.origin, "building controller");
        let api = HttpSessionApi::new(self.http)?;
        Ok(SessionController::new(api, credentials, storage, navigator)
            .with_config(controller))
    }
}

#[cfg(test)]
mod tests {
    use portico_session::{
        LogoutPolicy, MemoryCredentialStore, MemoryStorage, RecordingNavigator,
    };

    use super::*;

    type TestController =
        HttpSessionController<MemoryCredentialStore, MemoryStorage, RecordingNavigator>;

    fn build(builder: PorticoBuilder) -> TestController {
        builder
            .build(
                MemoryCredentialStore::new(),
                MemoryStorage::new(),
                RecordingNavigator::new(),
            )
            .expect("controller should build")
    }

    fn clearing_config() -> ControllerConfig {
        ControllerConfig {
            logout_policy: LogoutPolicy::ClearOnFailure,
            ..ControllerConfig::with_origin("https://from-config")
        }
    }

    #[test]
    fn test_build_origin_before_controller_config_is_kept() {
        let ctl = build(
            PorticoBuilder::new()
                .origin("https://app")
                .controller_config(clearing_config()),
        );

        assert_eq!(ctl.config().origin, "https://app");
        assert_eq!(ctl.config().logout_policy, LogoutPolicy::ClearOnFailure);
    }

    #[test]
    fn test_build_origin_after_controller_config_is_kept() {
        let ctl = build(
            PorticoBuilder::new()
                .controller_config(clearing_config())
                .origin("https://app"),
        );

        assert_eq!(ctl.config().origin, "https://app");
    }

    #[test]
    fn test_build_without_origin_uses_config_origin() {
        let ctl = build(PorticoBuilder::new().controller_config(clearing_config()));

        assert_eq!(ctl.config().origin, "https://from-config");
    }
}
