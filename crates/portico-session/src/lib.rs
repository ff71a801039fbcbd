//! Client-side session management for Portico.
//!
//! This crate holds the login/redirect state machine:
//!
//! 1. **Discovery**: fetch the provider directory and land the user on the
//!    login chooser or the registration page
//! 2. **Authorization**: redirect to a provider with a persisted
//!    [`OAuthHandshake`], then trade the returned code for a credential
//! 3. **Establishment**: introspect the credential and track the user
//! 4. **Logout**: revoke, reset, and land again
//!
//! # How it fits in the stack
//!
//! ```text
//! Application / UI (above)  ← reads snapshots, calls operations
//!     ↕
//! Session Layer (this crate)  ← SessionController + local collaborators
//!     ↕
//! Client Layer (below)  ← SessionApi: the identity/session service
//! ```
//!
//! Local collaborators are traits so a browser, a desktop shell, or a test
//! can each supply their own: [`CredentialStore`], [`LocalStorage`],
//! [`Navigator`].

#![allow(async_fn_in_trait)]

mod config;
mod controller;
mod error;
mod handshake;
mod navigate;
mod session;
mod store;
mod teardown;

pub use config::{ControllerConfig, LandingPolicy, LogoutPolicy};
pub use controller::{Bootstrap, SessionController};
pub use error::{AuthError, AuthErrorKind, SessionError};
pub use handshake::{generate_nonce, LocalStorage, MemoryStorage, OAuthHandshake};
pub use navigate::{Navigation, Navigator, RecordingNavigator};
pub use session::{Session, SessionSnapshot, UiFlags};
pub use store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore,
    CREDENTIAL_COOKIE, CREDENTIAL_PATH,
};
pub use teardown::TeardownHandle;
