//! Client-side routes the session controller navigates between.

use std::fmt;

/// A page in the application that the controller may send the user to.
///
/// These are client-side route changes (no full page load), with the
/// exception of the provider's authorization endpoint, which isn't a
/// `Route` at all: it's an external URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/account/login`: pick an identity provider.
    Login,
    /// `/account/register`: shown when no provider is configured yet.
    Register,
    /// `/account/callback`: where the provider sends the user back.
    Callback,
    /// `/`: the dashboard, once a session is established.
    Home,
}

impl Route {
    /// The URL path for this route.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/account/login",
            Self::Register => "/account/register",
            Self::Callback => "/account/callback",
            Self::Home => "/",
        }
    }

    /// Where to land when nobody is signed in: the login chooser when at
    /// least one provider exists, the registration page otherwise.
    pub fn landing_for(provider_count: usize) -> Self {
        if provider_count > 0 {
            Self::Login
        } else {
            Self::Register
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
