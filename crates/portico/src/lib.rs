//! # Portico
//!
//! Client-side authentication session manager.
//!
//! Portico tracks the current user, the available identity providers, and
//! the access credential, and navigates according to authentication
//! outcomes. The heavy lifting (issuing and validating credentials) stays
//! in the identity/session service; Portico drives the OAuth2
//! authorization-code flow against it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portico::prelude::*;
//!
//! # async fn run() -> Result<(), PorticoError> {
//! let mut controller = PorticoBuilder::new()
//!     .service_url("https://infra.example.com")
//!     .origin("https://app.example.com")
//!     .build(
//!         MemoryCredentialStore::new(),
//!         MemoryStorage::new(),
//!         RecordingNavigator::new(),
//!     )?;
//!
//! controller.initialize().await?;
//! if let Some(provider) = controller.providers().first().cloned() {
//!     controller.begin_login_redirect(&provider)?;
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod logging;

pub use builder::{HttpSessionController, PorticoBuilder};
pub use error::PorticoError;
pub use logging::init_logging;

pub use portico_client as client;
pub use portico_protocol as protocol;
pub use portico_session as session;

/// Everything most applications need.
pub mod prelude {
    pub use crate::{init_logging, HttpSessionController, PorticoBuilder, PorticoError};

    pub use portico_client::{ClientError, HttpConfig, HttpSessionApi, SessionApi};
    pub use portico_protocol::{
        AccessCredential, IdentityProvider, Route, UserProfile,
    };
    pub use portico_session::{
        AuthError, AuthErrorKind, Bootstrap, ControllerConfig,
        CredentialStore, FileCredentialStore, LandingPolicy, LocalStorage,
        LogoutPolicy, MemoryCredentialStore, MemoryStorage, Navigation,
        Navigator, OAuthHandshake, RecordingNavigator, SessionController,
        SessionError, SessionSnapshot, UiFlags,
    };
}
