//! Public screens: signing in and signing up.

use super::{Notification, Prompt};
use crate::domain::routing::Route;
use crate::domain::session::{
    KeyValueStore, Session, SessionStore, driven_ports::Authenticator, driving_ports::LoginPort,
};
use crate::domain::user::{driven_ports::UserWriter, driving_ports::UserPort};
use crate::dto::FieldErrors;
use crate::dto::auth::{LoginForm, RegistrationForm};
use crate::external_connections::ExternalConnectivity;
use tracing::warn;

#[derive(Clone, Default)]
pub struct LoginView {
    pub form: LoginForm,
    errors: FieldErrors,
    /// Why the last attempt was refused
    failure: Option<String>,
}

impl LoginView {
    pub fn new() -> LoginView {
        LoginView::default()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Signs in with the form's credentials, returning the new session on success
    pub async fn submit(
        &mut self,
        sessions: &SessionStore<impl KeyValueStore>,
        ext_cxn: &impl ExternalConnectivity,
        login_port: &impl LoginPort,
        authenticator: &impl Authenticator,
    ) -> Option<Session> {
        self.failure = None;
        let credentials = match self.form.credentials() {
            Ok(credentials) => credentials,
            Err(errors) => {
                self.errors = errors;
                return None;
            }
        };
        self.errors = FieldErrors::default();

        match login_port
            .log_in(&credentials, sessions, ext_cxn, authenticator)
            .await
        {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("Login refused: {err}");
                self.failure = Some(err.user_message());
                None
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct RegistrationView {
    pub form: RegistrationForm,
    errors: FieldErrors,
}

impl RegistrationView {
    pub fn new() -> RegistrationView {
        RegistrationView::default()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Creates the account. On success the user is sent to the login screen.
    pub async fn submit(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_writer: &impl UserWriter,
        prompt: &impl Prompt,
    ) -> Option<Route> {
        let new_user = match self.form.new_user() {
            Ok(new_user) => new_user,
            Err(errors) => {
                self.errors = errors;
                return None;
            }
        };
        self.errors = FieldErrors::default();

        match user_port.create_user(&new_user, ext_cxn, u_writer).await {
            Ok(()) => {
                prompt.notify(&Notification::success("User created successfully!"));
                Some(Route::Login)
            }
            Err(err) => {
                prompt.notify(&Notification::error(err.user_message()));
                None
            }
        }
    }
}
