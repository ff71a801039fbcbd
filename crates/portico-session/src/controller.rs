//! The session controller: the login/redirect state machine.
//!
//! # Lifecycle
//!
//! ```text
//!  initialize() ──→ [login chooser | register]
//!       │
//!       ▼
//!  begin_login_redirect(p) ──(full page)──→ provider ──→ /account/callback
//!                                                            │
//!                     complete_callback(code, state) ◄───────┘
//!                               │ (state ok)
//!                               ▼
//!  exchange_code_for_session ──→ save credential ──→ establish ──→ [home]
//!          │ (fails)                                    │ (fails)
//!          ▼                                            ▼
//!     [login chooser]                       login_error, credential kept
//!
//!  register_session_from_key(k) ──→ save credential ──→ establish
//!  end_session() ──→ logout call ──→ reset flags ──→ landing ──→ clear credential
//! ```
//!
//! # Concurrency note
//!
//! Every operation takes `&mut self`: the controller is a single logical
//! actor, and the borrow checker guarantees no two operations interleave
//! on the same instance. Observers don't need a borrow at all; they
//! [`subscribe`](SessionController::subscribe) to snapshots.

use portico_client::SessionApi;
use portico_protocol::{
    AccessCredential, IdentityProvider, LoginRequest, Route, UserProfile,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    AuthError, ControllerConfig, CredentialStore, LandingPolicy,
    LocalStorage, LogoutPolicy, Navigator, OAuthHandshake, Session,
    SessionSnapshot, TeardownHandle, UiFlags,
};

/// How [`SessionController::initialize`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Providers loaded and the user was sent to this route.
    Landed(Route),
    /// Providers loaded; the landing policy kept the user where they are.
    Stayed,
    /// Torn down before the directory answered. Nothing changed.
    Cancelled,
}

/// Tracks the current user, the identity providers, and the credential,
/// and navigates according to authentication outcomes.
///
/// Generic over its four collaborators so each can be swapped:
///
/// | Param | Trait | In a browser |
/// |---|---|---|
/// | `A` | [`SessionApi`] | the session service |
/// | `C` | [`CredentialStore`] | the `accessKey` cookie |
/// | `L` | [`LocalStorage`] | `window.localStorage` |
/// | `N` | [`Navigator`] | the page router |
pub struct SessionController<A, C, L, N> {
    api: A,
    credentials: C,
    storage: L,
    navigator: N,
    config: ControllerConfig,

    session: Session,
    providers: Vec<IdentityProvider>,
    has_redirected: bool,
    login_error: bool,

    snapshots: watch::Sender<SessionSnapshot>,
    teardown: TeardownHandle,
}

impl<A, C, L, N> SessionController<A, C, L, N>
where
    A: SessionApi,
    C: CredentialStore,
    L: LocalStorage,
    N: Navigator,
{
    /// Creates a controller with the default config.
    ///
    /// Any credential already in `credentials` is picked up (a reload
    /// keeps the cookie), but it isn't introspected until
    /// [`register_session_from_key`](Self::register_session_from_key) is
    /// called with it.
    pub fn new(api: A, credentials: C, storage: L, navigator: N) -> Self {
        let credential = match credentials.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "could not read stored credential");
                None
            }
        };
        let session = Session {
            credential,
            ..Session::default()
        };
        let (snapshots, _) = watch::channel(SessionSnapshot {
            credential: session.credential.clone(),
            ..SessionSnapshot::default()
        });

        Self {
            api,
            credentials,
            storage,
            navigator,
            config: ControllerConfig::default(),
            session,
            providers: Vec::new(),
            has_redirected: false,
            login_error: false,
            snapshots,
            teardown: TeardownHandle::new(),
        }
    }

    /// Replaces the config. The config is [`validated`](ControllerConfig::validated) first.
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config.validated();
        self
    }

    // =====================================================================
    // Operations
    // =====================================================================

    /// Fetches the provider directory and lands the user.
    ///
    /// - Providers loaded, list non-empty → [`Route::Login`].
    /// - Providers loaded, list empty → [`Route::Register`].
    /// - Fetch failed → `login_error` raised, no navigation.
    ///
    /// If the [`TeardownHandle`] fires before the directory answers, the
    /// fetch is dropped and no state changes.
    pub async fn initialize(&mut self) -> Result<Bootstrap, AuthError> {
        let teardown = self.teardown.clone();
        let fetched = tokio::select! {
            biased;
            _ = teardown.torn_down() => None,
            result = self.api.list_providers() => Some(result),
        };

        let providers = match fetched {
            None => {
                debug!("directory fetch cancelled by teardown");
                return Ok(Bootstrap::Cancelled);
            }
            Some(Ok(providers)) => providers,
            Some(Err(e)) => {
                warn!(error = %e, "provider directory unavailable");
                self.login_error = true;
                self.publish();
                return Err(AuthError::DirectoryUnavailable(e));
            }
        };

        info!(count = providers.len(), "provider directory loaded");
        self.providers = providers;
        self.login_error = false;
        self.publish();

        if self.config.landing_policy == LandingPolicy::SkipWhenAuthenticated
            && self.session.ready
        {
            debug!("session already established; not redirecting");
            return Ok(Bootstrap::Stayed);
        }
        Ok(Bootstrap::Landed(self.land().await?))
    }

    /// Starts the authorization-code flow with `provider`.
    ///
    /// Persists the handshake (provider ID, nonce, redirect URL) and then
    /// performs a full-page navigation to the provider. Nothing after this
    /// runs in the current page; the returned handshake is for callers
    /// that want to log or display it.
    ///
    /// `provider` should come from [`providers`](Self::providers).
    pub fn begin_login_redirect(
        &self,
        provider: &IdentityProvider,
    ) -> Result<OAuthHandshake, AuthError> {
        provider.validate().map_err(AuthError::InvalidProvider)?;
        if !self.providers.iter().any(|p| p.id == provider.id) {
            warn!(provider_id = %provider.id, "provider is not in the loaded directory");
        }

        let handshake = OAuthHandshake::start(provider, &self.config);
        handshake.persist(&self.storage)?;

        info!(provider_id = %provider.id, "redirecting to identity provider");
        self.navigator
            .assign(&handshake.authorize_url(provider, &self.config))?;
        Ok(handshake)
    }

    /// Handles the provider's redirect back to the callback page.
    ///
    /// Loads the persisted handshake, checks `returned_state` against the
    /// stored nonce (unless `verify_state` is off), clears the handshake,
    /// and runs [`exchange_code_for_session`](Self::exchange_code_for_session)
    /// with the stored provider ID and redirect URL.
    ///
    /// # Errors
    /// [`AuthError::StateMismatch`] when there is no pending handshake or
    /// the state doesn't match. The code is never sent to the service in
    /// that case.
    pub async fn complete_callback(
        &mut self,
        code: &str,
        returned_state: &str,
    ) -> Result<UserProfile, AuthError> {
        let handshake = match OAuthHandshake::load(&self.storage)? {
            Some(handshake) => handshake,
            None => {
                warn!("callback without a pending login");
                return self.reject_callback().await;
            }
        };

        if self.config.verify_state && !handshake.matches_state(returned_state) {
            warn!(provider_id = %handshake.provider_id, "callback state mismatch");
            return self.reject_callback().await;
        }

        OAuthHandshake::clear(&self.storage)?;
        self.exchange_code_for_session(
            code,
            &handshake.provider_id,
            &handshake.redirect_url,
        )
        .await
    }

    /// Exchanges an authorization code for a credential, stores it, and
    /// establishes the session.
    ///
    /// `has_redirected` is raised before the service is contacted. The
    /// exchange is attempted once: authorization codes are single-use.
    ///
    /// This doesn't check the callback's `state`; prefer
    /// [`complete_callback`](Self::complete_callback).
    pub async fn exchange_code_for_session(
        &mut self,
        code: &str,
        provider_id: &str,
        redirect_url: &str,
    ) -> Result<UserProfile, AuthError> {
        self.has_redirected = true;
        self.publish();

        let request = LoginRequest {
            provider_id: provider_id.to_string(),
            code: code.to_string(),
            redirect_url: redirect_url.to_string(),
        };
        let response = match self.api.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%provider_id, error = %e, "login exchange failed");
                self.session.ready = false;
                self.login_error = true;
                self.publish();
                self.navigator.push(Route::Login).await?;
                return Err(AuthError::ExchangeRejected(e));
            }
        };

        info!(%provider_id, "login exchange succeeded");
        self.persist_credential(&response.access_key)?;
        self.establish(response.access_key).await
    }

    /// Establishes a session from a credential the caller already has,
    /// bypassing the code exchange.
    pub async fn register_session_from_key(
        &mut self,
        key: AccessCredential,
    ) -> Result<UserProfile, AuthError> {
        self.persist_credential(&key)?;
        self.establish(key).await
    }

    /// Logs out.
    ///
    /// On success: flags reset, user cleared, the landing route decided
    /// again from the cached provider list, and the credential removed
    /// from the store. With no stored credential the service call is
    /// skipped and only the local part runs.
    ///
    /// On failure the [`LogoutPolicy`] decides whether local state is kept
    /// (default) or torn down anyway; either way the error is returned.
    pub async fn end_session(&mut self) -> Result<(), AuthError> {
        let credential = self.credentials.load()?.or_else(|| self.session.credential.clone());

        let outcome = match &credential {
            Some(credential) => self.api.logout(credential).await,
            None => {
                debug!("no stored credential; skipping logout call");
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {
                info!("logged out");
                self.reset_local().await
            }
            Err(e) => {
                warn!(error = %e, policy = ?self.config.logout_policy, "logout failed");
                if self.config.logout_policy == LogoutPolicy::ClearOnFailure {
                    self.reset_local().await?;
                }
                Err(AuthError::LogoutFailed(e))
            }
        }
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    /// The current flags.
    pub fn flags(&self) -> UiFlags {
        UiFlags {
            auth_ready: self.session.ready,
            has_redirected: self.has_redirected,
            login_error: self.login_error,
        }
    }

    /// The current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The signed-in user, once the session is established.
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    /// The provider directory, in server order. Empty until
    /// [`initialize`](Self::initialize) succeeds.
    pub fn providers(&self) -> &[IdentityProvider] {
        &self.providers
    }

    /// The credential the controller last saw in the store.
    pub fn credential(&self) -> Option<&AccessCredential> {
        self.session.credential.as_ref()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Everything a rendering layer needs, in one value.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            flags: self.flags(),
            user: self.session.user.clone(),
            providers: self.providers.clone(),
            credential: self.session.credential.clone(),
        }
    }

    /// Subscribes to snapshots. The receiver sees a new value after every
    /// state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// A handle that cancels a pending [`initialize`](Self::initialize).
    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Sends the user to the login chooser or the registration page,
    /// depending on whether any provider is configured.
    async fn land(&mut self) -> Result<Route, AuthError> {
        let route = Route::landing_for(self.providers.len());
        self.navigator.push(route).await?;
        Ok(route)
    }

    fn persist_credential(&mut self, credential: &AccessCredential) -> Result<(), AuthError> {
        if let Err(e) = self.credentials.save(credential) {
            warn!(error = %e, "could not persist credential");
            self.session.ready = false;
            self.login_error = true;
            self.publish();
            return Err(e.into());
        }
        // A replaced credential hasn't been introspected yet.
        self.session.ready = false;
        self.session.credential = Some(credential.clone());
        self.publish();
        Ok(())
    }

    /// Introspects `credential`; on success the session is ready and the
    /// user goes home.
    ///
    /// On failure the credential stays in the store. The caller decides
    /// whether to clear it.
    async fn establish(
        &mut self,
        credential: AccessCredential,
    ) -> Result<UserProfile, AuthError> {
        match self.api.introspect(&credential).await {
            Ok(user) => {
                info!(user_id = %user.id, "session established");
                self.session.user = Some(user.clone());
                self.session.ready = true;
                self.login_error = false;
                self.publish();
                self.navigator.push(Route::Home).await?;
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "introspection failed; credential left in store");
                self.session.user = None;
                self.session.ready = false;
                self.login_error = true;
                self.publish();
                Err(AuthError::IntrospectionFailed {
                    credential_persisted: true,
                    source: e,
                })
            }
        }
    }

    async fn reject_callback(&mut self) -> Result<UserProfile, AuthError> {
        self.session.ready = false;
        self.login_error = true;
        self.publish();
        self.navigator.push(Route::Login).await?;
        Err(AuthError::StateMismatch)
    }

    /// Local half of logout. The credential is removed even when the
    /// landing navigation fails.
    async fn reset_local(&mut self) -> Result<(), AuthError> {
        self.session.ready = false;
        self.session.user = None;
        self.has_redirected = false;
        self.login_error = false;
        self.publish();

        let landed = self.land().await;

        self.credentials.clear()?;
        self.session.credential = None;
        self.publish();

        landed.map(|route| debug!(%route, "landed after logout"))
    }
}
