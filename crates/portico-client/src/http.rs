//! HTTP session client using `reqwest`.

use std::time::Duration;

use portico_protocol::{
    AccessCredential, Codec, IdentityProvider, JsonCodec, LoginRequest,
    LoginResponse, UserProfile,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::{ClientError, SessionApi};

const PROVIDERS_PATH: &str = "v1/providers";
const LOGIN_PATH: &str = "v1/login";
const INTROSPECT_PATH: &str = "v1/introspect";
const LOGOUT_PATH: &str = "v1/logout";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Connection settings for [`HttpSessionApi`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Where the session service lives, e.g. `https://infra.example.com`.
    /// Endpoint paths are resolved relative to it.
    pub base_url: String,

    /// Per-request timeout. Default: 10 seconds.
    pub timeout: Duration,
}

impl HttpConfig {
    /// Creates a config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// A [`SessionApi`] backed by the real session service over HTTP.
pub struct HttpSessionApi {
    client: Client,
    base_url: Url,
    codec: JsonCodec,
}

impl HttpSessionApi {
    /// Builds a client for the given config.
    ///
    /// # Errors
    /// - [`ClientError::InvalidUrl`] if `base_url` doesn't parse
    /// - [`ClientError::Http`] if the underlying client can't be built
    pub fn new(config: HttpConfig) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        // `Url::join` replaces the last path segment unless the base
        // ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        tracing::debug!(base_url = %base_url, "session client ready");

        Ok(Self {
            client,
            base_url,
            codec: JsonCodec,
        })
    }

    /// Fetches only the providers whose name matches `name`.
    pub async fn list_providers_named(
        &self,
        name: &str,
    ) -> Result<Vec<IdentityProvider>, ClientError> {
        let resp = self
            .client
            .get(self.endpoint(PROVIDERS_PATH)?)
            .query(&[("name", name)])
            .send()
            .await?;
        self.read_json(resp).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Reads the whole body and decodes it, turning non-2xx statuses
    /// into [`ClientError::Status`].
    async fn read_json<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, ClientError> {
        let body = Self::read_success(resp).await?;
        Ok(self.codec.decode(&body)?)
    }

    async fn read_success(resp: Response) -> Result<Vec<u8>, ClientError> {
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}

impl SessionApi for HttpSessionApi {
    async fn list_providers(
        &self,
    ) -> Result<Vec<IdentityProvider>, ClientError> {
        let resp = self
            .client
            .get(self.endpoint(PROVIDERS_PATH)?)
            .send()
            .await?;
        self.read_json(resp).await
    }

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ClientError> {
        let resp = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(self.codec.encode(request)?)
            .send()
            .await?;
        self.read_json(resp).await
    }

    async fn introspect(
        &self,
        credential: &AccessCredential,
    ) -> Result<UserProfile, ClientError> {
        let resp = self
            .client
            .get(self.endpoint(INTROSPECT_PATH)?)
            .bearer_auth(credential.expose())
            .send()
            .await?;
        self.read_json(resp).await
    }

    async fn logout(
        &self,
        credential: &AccessCredential,
    ) -> Result<(), ClientError> {
        let resp = self
            .client
            .post(self.endpoint(LOGOUT_PATH)?)
            .bearer_auth(credential.expose())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(self.codec.encode(&serde_json::Map::new())?)
            .send()
            .await?;
        // The body is ignored; only the status matters.
        Self::read_success(resp).await.map(|_| ())
    }
}
