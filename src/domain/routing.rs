use crate::domain::session::Session;
use crate::domain::user::Role;
use derive_more::Display;

/// Every screen the client can show
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    #[display("Login")]
    Login,
    #[display("Register")]
    Register,
    #[display("Home")]
    Home,
    #[display("Tasks")]
    Tasks,
    #[display("Users")]
    Users,
    #[display("Profile")]
    Profile,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Tasks,
        Route::Users,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::Tasks => "/task",
            Self::Users => "/user",
            Self::Profile => "/profile",
        }
    }

    /// Matches a path with or without its leading or trailing slash
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_matches('/');
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_matches('/') == trimmed)
    }

    /// Public routes are reachable without signing in and render outside the authenticated shell
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Role a viewer needs to see this route, if any
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::Users => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated { role: Option<Role> },
}

impl AuthState {
    pub fn of(session: &Session) -> AuthState {
        if session.is_authenticated() {
            AuthState::Authenticated {
                role: session.role(),
            }
        } else {
            AuthState::Unauthenticated
        }
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// The route actually rendered when `requested` is asked for under `session`
    pub fn resolve(session: &Session, requested: Route) -> Route {
        if requested.is_public() {
            return requested;
        }

        match AuthState::of(session) {
            AuthState::Unauthenticated => Route::Login,
            AuthState::Authenticated { role } => match requested.required_role() {
                Some(required) if role != Some(required) => Route::Home,
                _ => requested,
            },
        }
    }

    /// Like [RouteGuard::resolve], with unknown paths landing on the default screen
    pub fn resolve_path(session: &Session, path: &str) -> Route {
        let requested = Route::from_path(path).unwrap_or(Route::Home);
        Self::resolve(session, requested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarLink {
    pub route: Route,
    pub label: String,
}

/// Navigation entries of the authenticated shell. Role-gated routes are left out for viewers
/// who could not open them.
pub fn sidebar_links(session: &Session) -> Vec<SidebarLink> {
    [Route::Home, Route::Users, Route::Tasks]
        .into_iter()
        .filter(|route| RouteGuard::resolve(session, *route) == *route)
        .map(|route| SidebarLink {
            route,
            label: route.to_string(),
        })
        .collect()
}
