//! Session types: what the controller knows about the current user.
//!
//! - [`Session`]: the user, their credential, and whether the session is
//!   ready (the credential passed introspection).
//! - [`UiFlags`]: the three booleans a rendering layer branches on.
//! - [`SessionSnapshot`]: everything above plus the provider list, as one
//!   cloneable value published to subscribers after every change.

use portico_protocol::{AccessCredential, IdentityProvider, UserProfile};

/// The current user's session.
///
/// Owned by the [`SessionController`](crate::SessionController) and only
/// changed through its operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Populated once introspection succeeds; cleared on logout and on
    /// introspection failure.
    pub user: Option<UserProfile>,

    /// The credential currently held in the credential store. Can be
    /// `Some` while `ready` is false: a credential that was saved but
    /// then failed introspection stays stored.
    pub credential: Option<AccessCredential>,

    /// `true` only after the credential passed introspection.
    pub ready: bool,
}

/// State-machine phase, as booleans.
///
/// Invariant: `auth_ready` implies the session's `user` is populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiFlags {
    /// A session is established.
    pub auth_ready: bool,
    /// A code exchange has started on this page. Guards against a
    /// callback handler firing twice.
    pub has_redirected: bool,
    /// The last operation failed. Stays set until a later operation
    /// succeeds.
    pub login_error: bool,
}

/// A point-in-time view of the controller, for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub flags: UiFlags,
    pub user: Option<UserProfile>,
    pub providers: Vec<IdentityProvider>,
    pub credential: Option<AccessCredential>,
}
