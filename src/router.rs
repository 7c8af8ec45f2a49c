//! Route table and the authentication guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation goes through [`RouteGuard::navigate`]. The guard never
//! trusts cached state: it asks the session store to re-read storage first,
//! so a logout elsewhere takes effect on the very next guarded navigation.

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

use crate::session::SessionStore;

pub const HOME_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/signin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
}

/// Routes the application knows about. Only sign-in is reachable without a session.
pub const ROUTES: &[RouteDef] = &[
    RouteDef { name: "home", path: HOME_PATH, requires_auth: true },
    RouteDef { name: "signin", path: SIGN_IN_PATH, requires_auth: false },
    RouteDef { name: "trending", path: "/trending", requires_auth: true },
    RouteDef { name: "browse", path: "/browse", requires_auth: true },
    RouteDef { name: "myList", path: "/my-list", requires_auth: true },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

impl From<bool> for AuthState {
    fn from(authenticated: bool) -> Self {
        if authenticated { Self::Authenticated } else { Self::Unauthenticated }
    }
}

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(RouteDef),
    Redirect { from: RouteDef, to: &'static str },
    NotFound,
}

/// Guard decision for a resolved route.
#[must_use]
pub fn decide(route: RouteDef, state: AuthState) -> Navigation {
    if route.requires_auth && state == AuthState::Unauthenticated {
        Navigation::Redirect { from: route, to: SIGN_IN_PATH }
    } else {
        Navigation::Proceed(route)
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    routes: Vec<RouteDef>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(ROUTES.to_vec())
    }
}

impl RouteGuard {
    #[must_use]
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Match `path` exactly, ignoring a trailing slash and any query string.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteDef> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => HOME_PATH,
            trimmed => trimmed,
        };
        self.routes.iter().find(|r| r.path == path).copied()
    }

    /// Resolve `path` and gate it on a freshly re-read session.
    pub fn navigate(&self, path: &str, session: &mut SessionStore) -> Navigation {
        let Some(route) = self.resolve(path) else {
            tracing::debug!(%path, "no route");
            return Navigation::NotFound;
        };
        let state = AuthState::from(session.check_auth());
        let decision = decide(route, state);
        if let Navigation::Redirect { to, .. } = decision {
            tracing::info!(from = route.path, %to, "unauthenticated navigation redirected");
        }
        decision
    }
}
