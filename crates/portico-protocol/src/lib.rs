//! Wire protocol for Portico.
//!
//! This crate defines the "language" the session controller and the
//! identity/session service speak:
//!
//! - **Types** ([`IdentityProvider`], [`UserProfile`], [`AccessCredential`],
//!   [`LoginRequest`], [`LoginResponse`]): the bodies that travel over HTTP.
//! - **Routes** ([`Route`]): the client-side pages the controller can
//!   navigate to.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Client (HTTP bytes) → Protocol (typed bodies) → Session (controller state)
//! ```
//!
//! The protocol layer knows nothing about HTTP or storage. It only knows
//! what the messages look like.

mod codec;
mod error;
mod route;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use route::Route;
pub use types::{
    AccessCredential, IdentityProvider, LoginRequest, LoginResponse,
    UserProfile,
};
