use super::Prompt;
use super::auth::LoginView;
use super::modal::FormOutcome;
use super::profile::ProfileView;
use crate::domain::Error;
use crate::domain::routing::{Route, RouteGuard, SidebarLink, sidebar_links};
use crate::domain::session::{
    KeyValueStore, Session, SessionStore, driven_ports::Authenticator, driving_ports::LoginPort,
};
use crate::domain::user::{driven_ports::UserWriter, driving_ports::UserPort};
use crate::external_connections::ExternalConnectivity;
use tracing::{debug, info, warn};

/// Top of the client: owns the session storage and the connection, and decides which screen
/// is shown for every navigation.
pub struct AppShell<S: KeyValueStore, C: ExternalConnectivity> {
    sessions: SessionStore<S>,
    ext_cxn: C,
    route: Route,
}

impl<S: KeyValueStore, C: ExternalConnectivity> AppShell<S, C> {
    /// Restores whatever session was stored and lands on the home screen, or on the login
    /// screen when nobody is signed in
    pub fn new(sessions: SessionStore<S>, ext_cxn: C) -> AppShell<S, C> {
        let ext_cxn = ext_cxn.with_session(sessions.current());
        let route = RouteGuard::resolve(ext_cxn.session(), Route::Home);

        AppShell {
            sessions,
            ext_cxn,
            route,
        }
    }

    pub fn session(&self) -> &Session {
        self.ext_cxn.session()
    }

    pub fn ext_cxn(&self) -> &C {
        &self.ext_cxn
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn sidebar(&self) -> Vec<SidebarLink> {
        if self.route.is_public() {
            return Vec::new();
        }
        sidebar_links(self.session())
    }

    pub fn navigate(&mut self, path: &str) -> Route {
        self.sync_session();
        self.show(RouteGuard::resolve_path(self.session(), path))
    }

    pub fn go_to(&mut self, requested: Route) -> Route {
        self.sync_session();
        self.show(RouteGuard::resolve(self.session(), requested))
    }

    /// Submits the login form. A successful login switches the connection to the new session
    /// and moves to the home screen.
    pub async fn log_in(
        &mut self,
        view: &mut LoginView,
        login_port: &impl LoginPort,
        authenticator: &impl Authenticator,
    ) -> bool {
        let Some(session) = view
            .submit(&self.sessions, &self.ext_cxn, login_port, authenticator)
            .await
        else {
            return false;
        };

        self.switch_session(session);
        self.go_to(Route::Home);
        true
    }

    pub fn log_out(&mut self, login_port: &impl LoginPort) -> Result<(), Error> {
        login_port.log_out(&self.sessions)?;
        self.switch_session(Session::default());
        self.show(Route::Login);

        Ok(())
    }

    /// Saves the profile form. The stored token was issued for the old credentials, so a
    /// successful save ends the session.
    pub async fn save_profile(
        &mut self,
        view: &mut ProfileView,
        user_port: &impl UserPort,
        u_writer: &impl UserWriter,
        login_port: &impl LoginPort,
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let outcome = view.save(&self.ext_cxn, user_port, u_writer, prompt).await?;
        if outcome.is_submitted() {
            if let Err(err) = self.log_out(login_port) {
                warn!("Could not log out after a profile change: {err}");
            }
        }
        Some(outcome)
    }

    fn show(&mut self, route: Route) -> Route {
        debug!(%route, "Showing {}", route.path());
        self.route = route;
        route
    }

    /// Picks up session changes made through the store since the last navigation
    fn sync_session(&mut self) {
        let stored = self.sessions.current();
        if &stored != self.ext_cxn.session() {
            info!("Stored session changed");
            self.switch_session(stored);
        }
    }

    /// Cached results belong to the previous viewer, so they go with the old session
    fn switch_session(&mut self, session: Session) {
        let dropped = self.ext_cxn.query_cache().len();
        self.ext_cxn.query_cache().clear();
        debug!("Dropped {dropped} cached queries");
        self.ext_cxn = self.ext_cxn.with_session(session);
    }
}
