//! An in-process session service.
//!
//! [`InMemorySessionApi`] behaves like the real service closely enough to
//! drive the controller end to end without a network: authorization codes
//! are single-use, logout revokes the credential, and unknown credentials
//! are rejected with 401. Use it in tests and offline demos.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use portico_protocol::{
    AccessCredential, IdentityProvider, LoginRequest, LoginResponse,
    UserProfile,
};

use crate::{ClientError, SessionApi};

/// A call recorded by [`InMemorySessionApi`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListProviders,
    Login(LoginRequest),
    Introspect(AccessCredential),
    Logout(AccessCredential),
}

#[derive(Default)]
struct Inner {
    providers: Vec<IdentityProvider>,
    /// code → (provider ID, credential it will be exchanged for)
    codes: HashMap<String, (String, AccessCredential)>,
    /// raw credential → user
    users: HashMap<String, UserProfile>,
    directory_down: bool,
    logout_down: bool,
    calls: Vec<ApiCall>,
}

/// A [`SessionApi`] that keeps all of its state in memory.
///
/// # Example
///
/// ```rust
/// use portico_client::InMemorySessionApi;
/// use portico_protocol::{IdentityProvider, UserProfile};
///
/// let api = InMemorySessionApi::new()
///     .with_provider(IdentityProvider {
///         id: "p1".into(),
///         url: "idp.example.com".into(),
///         client_id: "abc".into(),
///         name: None,
///     })
///     .with_code("p1", "code123", "tok")
///     .with_user("tok", UserProfile::with_id("u1"));
/// ```
#[derive(Default)]
pub struct InMemorySessionApi {
    inner: Mutex<Inner>,
}

impl InMemorySessionApi {
    /// Creates a service with no providers, codes, or users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the directory.
    pub fn with_provider(self, provider: IdentityProvider) -> Self {
        self.lock().providers.push(provider);
        self
    }

    /// Registers an authorization code that `provider_id` issued, which
    /// exchanges for `access_key`.
    pub fn with_code(
        self,
        provider_id: &str,
        code: &str,
        access_key: &str,
    ) -> Self {
        self.lock().codes.insert(
            code.to_string(),
            (provider_id.to_string(), AccessCredential::new(access_key)),
        );
        self
    }

    /// Makes `access_key` introspect to `user`.
    pub fn with_user(self, access_key: &str, user: UserProfile) -> Self {
        self.lock().users.insert(access_key.to_string(), user);
        self
    }

    /// Makes the provider directory answer 503.
    pub fn with_directory_down(self) -> Self {
        self.lock().directory_down = true;
        self
    }

    /// Makes logout answer 503.
    pub fn with_logout_down(self) -> Self {
        self.lock().logout_down = true;
        self
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Returns `true` if `access_key` would still introspect successfully.
    pub fn is_active(&self, access_key: &str) -> bool {
        self.lock().users.contains_key(access_key)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock can only come from a test
        // assertion; the data is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn status(status: u16, body: &str) -> ClientError {
    ClientError::Status {
        status,
        body: body.to_string(),
    }
}

impl SessionApi for InMemorySessionApi {
    async fn list_providers(
        &self,
    ) -> Result<Vec<IdentityProvider>, ClientError> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::ListProviders);
        if inner.directory_down {
            return Err(status(503, "provider directory unavailable"));
        }
        Ok(inner.providers.clone())
    }

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ClientError> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::Login(request.clone()));

        // Codes are single-use: remove before checking anything else.
        let (provider_id, access_key) = inner
            .codes
            .remove(&request.code)
            .ok_or_else(|| status(401, "invalid authorization code"))?;
        if provider_id != request.provider_id {
            return Err(status(401, "code issued by another provider"));
        }

        let user = inner.users.get(access_key.expose()).cloned();
        Ok(LoginResponse {
            access_key,
            id: user.as_ref().map(|u| u.id.clone()),
            name: user.and_then(|u| u.name),
        })
    }

    async fn introspect(
        &self,
        credential: &AccessCredential,
    ) -> Result<UserProfile, ClientError> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::Introspect(credential.clone()));
        inner
            .users
            .get(credential.expose())
            .cloned()
            .ok_or_else(|| status(401, "unknown access key"))
    }

    async fn logout(
        &self,
        credential: &AccessCredential,
    ) -> Result<(), ClientError> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::Logout(credential.clone()));
        if inner.logout_down {
            return Err(status(503, "logout unavailable"));
        }
        inner
            .users
            .remove(credential.expose())
            .map(|_| ())
            .ok_or_else(|| status(401, "unknown access key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p1() -> IdentityProvider {
        IdentityProvider {
            id: "p1".into(),
            url: "idp.example.com".into(),
            client_id: "abc".into(),
            name: None,
        }
    }

    fn login_req(provider_id: &str, code: &str) -> LoginRequest {
        LoginRequest {
            provider_id: provider_id.into(),
            code: code.into(),
            redirect_url: "https://app/account/callback".into(),
        }
    }

    #[tokio::test]
    async fn test_login_code_is_single_use() {
        let api = InMemorySessionApi::new().with_code("p1", "c", "tok");

        let first = api.login(&login_req("p1", "c")).await.unwrap();
        let second = api.login(&login_req("p1", "c")).await;

        assert_eq!(first.access_key.expose(), "tok");
        assert!(matches!(second, Err(ClientError::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_login_wrong_provider_is_rejected() {
        let api = InMemorySessionApi::new().with_code("p1", "c", "tok");

        let result = api.login(&login_req("p2", "c")).await;

        assert!(result.unwrap_err().is_rejection());
    }

    #[tokio::test]
    async fn test_logout_revokes_credential() {
        let api = InMemorySessionApi::new().with_user("tok", UserProfile::with_id("u1"));
        let cred = AccessCredential::new("tok");

        api.logout(&cred).await.unwrap();

        assert!(!api.is_active("tok"));
        assert!(api.introspect(&cred).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_down_returns_503() {
        let api = InMemorySessionApi::new().with_provider(p1()).with_directory_down();

        let result = api.list_providers().await;

        assert!(matches!(result, Err(ClientError::Status { status: 503, .. })));
        assert_eq!(api.calls(), vec![ApiCall::ListProviders]);
    }
}
