//! Page navigation.
//!
//! The controller moves the user around in two ways:
//!
//! - **push**: a client-side route change inside the app. Awaited: the
//!   controller doesn't continue until the router has finished.
//! - **assign**: a full-page load of an external URL (the provider's
//!   authorization endpoint). Nothing after it runs in the current page,
//!   so it's synchronous and the controller treats it as terminal.

use std::sync::{Arc, Mutex};

use portico_protocol::Route;

use crate::SessionError;

/// Performs page transitions on behalf of the controller.
pub trait Navigator: Send + Sync {
    /// Client-side transition to `route`.
    async fn push(&self, route: Route) -> Result<(), SessionError>;

    /// Full-page navigation to an external `url`.
    fn assign(&self, url: &str) -> Result<(), SessionError>;
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    async fn push(&self, route: Route) -> Result<(), SessionError> {
        (**self).push(route).await
    }

    fn assign(&self, url: &str) -> Result<(), SessionError> {
        (**self).assign(url)
    }
}

/// One entry in a [`RecordingNavigator`]'s history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Push(Route),
    Assign(String),
}

/// A [`Navigator`] that records every transition instead of performing it.
///
/// Useful anywhere there's no real router: tests, headless embedders,
/// and the console demo, which reads the history to decide what to do
/// next.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transition so far, oldest first.
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<Navigation> {
        self.history.lock().unwrap_or_else(|p| p.into_inner()).last().cloned()
    }

    /// Only the client-side routes, oldest first.
    pub fn routes(&self) -> Vec<Route> {
        self.history()
            .into_iter()
            .filter_map(|n| match n {
                Navigation::Push(route) => Some(route),
                Navigation::Assign(_) => None,
            })
            .collect()
    }

    fn record(&self, entry: Navigation) {
        self.history.lock().unwrap_or_else(|p| p.into_inner()).push(entry);
    }
}

impl Navigator for RecordingNavigator {
    async fn push(&self, route: Route) -> Result<(), SessionError> {
        tracing::debug!(%route, "navigate");
        self.record(Navigation::Push(route));
        Ok(())
    }

    fn assign(&self, url: &str) -> Result<(), SessionError> {
        tracing::debug!("full-page navigate");
        self.record(Navigation::Assign(url.to_string()));
        Ok(())
    }
}
