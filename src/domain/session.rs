use crate::domain::user::{Role, UserRef};
use crate::domain::{DrivenPortError, Error};
use crate::external_connections::ExternalConnectivity;
use std::fmt;
use tracing::{info, warn};

/// Storage key of the API token
pub const TOKEN_KEY: &str = "authToken";
/// Storage key of the role tag
pub const ROLE_KEY: &str = "role";

/// Opaque API token. Never validated or inspected by the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> AuthToken {
        AuthToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Credentials of whoever is using the client right now. Passed explicitly to everything that
/// talks to the API or decides what to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<AuthToken>,
    role: Option<Role>,
}

impl Session {
    pub fn new(token: AuthToken, role: Option<Role>) -> Session {
        Session {
            token: Some(token),
            role,
        }
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role.is_some_and(|role| role.is_admin())
    }

    /// Value of the `Authorization` header, absent when there is no token
    pub fn authorization_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("JWT {}", token.as_str()))
    }
}

/// Durable string key-value storage the session lives in
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Keeps the token and role tag in a [KeyValueStore]. Both values are written and removed
/// together.
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> SessionStore<S> {
        SessionStore { store }
    }

    pub fn set_token(&self, token: &AuthToken, role: Role) -> anyhow::Result<()> {
        self.store.set(TOKEN_KEY, token.as_str())?;
        self.store.set(ROLE_KEY, role.tag())
    }

    /// Stored token. Unreadable storage counts as signed out.
    pub fn token(&self) -> Option<AuthToken> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.map(AuthToken),
            Err(err) => {
                warn!("Could not read the stored token: {err:#}");
                None
            }
        }
    }

    pub fn role(&self) -> Option<Role> {
        let stored = match self.store.get(ROLE_KEY) {
            Ok(stored) => stored?,
            Err(err) => {
                warn!("Could not read the stored role: {err:#}");
                return None;
            }
        };

        match stored.parse() {
            Ok(role) => Some(role),
            Err(err) => {
                warn!("Ignoring stored role: {err}");
                None
            }
        }
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(ROLE_KEY)
    }

    pub fn current(&self) -> Session {
        match self.token() {
            Some(token) => Session::new(token, self.role()),
            None => Session::default(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// What a successful `tokenAuth` hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: AuthToken,
    pub user: UserRef,
    pub role: Role,
}

pub mod driven_ports {
    use super::*;

    pub trait Authenticator {
        /// Exchanges credentials for a token. Refused credentials come back as
        /// [DrivenPortError::Rejected] with the server's explanation.
        async fn token_auth(
            &self,
            credentials: &Credentials,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<AuthGrant, DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait LoginPort {
        /// Authenticates and persists the new session
        async fn log_in(
            &self,
            credentials: &Credentials,
            session_store: &SessionStore<impl KeyValueStore>,
            ext_cxn: &impl ExternalConnectivity,
            authenticator: &impl driven_ports::Authenticator,
        ) -> Result<Session, Error>;
        fn log_out(&self, session_store: &SessionStore<impl KeyValueStore>) -> Result<(), Error>;
    }
}

pub struct LoginService {}

impl driving_ports::LoginPort for LoginService {
    async fn log_in(
        &self,
        credentials: &Credentials,
        session_store: &SessionStore<impl KeyValueStore>,
        ext_cxn: &impl ExternalConnectivity,
        authenticator: &impl driven_ports::Authenticator,
    ) -> Result<Session, Error> {
        let grant = authenticator
            .token_auth(credentials, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("log in"))?;

        session_store
            .set_token(&grant.token, grant.role)
            .map_err(|cause| Error::RetrieveFailure {
                action: "save the session".to_owned(),
                cause,
            })?;
        info!(user_id = %grant.user.id, role = %grant.role, "Logged in as {}", grant.user.username);

        Ok(Session::new(grant.token, Some(grant.role)))
    }

    fn log_out(&self, session_store: &SessionStore<impl KeyValueStore>) -> Result<(), Error> {
        session_store
            .clear()
            .map_err(|cause| Error::RetrieveFailure {
                action: "clear the session".to_owned(),
                cause,
            })?;
        info!("Logged out");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use speculoos::prelude::*;

    mod session {
        use super::*;

        #[test]
        fn header_is_only_present_with_a_token() {
            let anonymous = Session::default();
            assert_that!(anonymous.authorization_header()).is_none();
            assert!(!anonymous.is_authenticated());

            let signed_in = Session::new(AuthToken::new("abc.def"), Some(Role::Normal));
            assert_that!(signed_in.authorization_header())
                .is_some()
                .is_equal_to("JWT abc.def".to_owned());
        }

        #[test]
        fn admin_requires_a_token_and_the_admin_role() {
            assert!(Session::new(AuthToken::new("t"), Some(Role::Admin)).is_admin());
            assert!(!Session::new(AuthToken::new("t"), Some(Role::Normal)).is_admin());
            assert!(!Session::new(AuthToken::new("t"), None).is_admin());
        }

        #[test]
        fn tokens_never_show_up_in_debug_output() {
            let session = Session::new(AuthToken::new("super-secret"), None);
            assert!(!format!("{session:?}").contains("super-secret"));
        }
    }

    mod session_store {
        use super::*;

        #[test]
        fn set_token_writes_both_keys() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_set()
                .with(eq(TOKEN_KEY), eq("abc"))
                .times(1)
                .returning(|_, _| Ok(()));
            kv.expect_set()
                .with(eq(ROLE_KEY), eq("ADMIN"))
                .times(1)
                .returning(|_, _| Ok(()));

            let store = SessionStore::new(kv);
            assert_that!(store.set_token(&AuthToken::new("abc"), Role::Admin)).is_ok();
        }

        #[test]
        fn clear_removes_both_keys() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_remove()
                .with(eq(TOKEN_KEY))
                .times(1)
                .returning(|_| Ok(()));
            kv.expect_remove()
                .with(eq(ROLE_KEY))
                .times(1)
                .returning(|_| Ok(()));

            assert_that!(SessionStore::new(kv).clear()).is_ok();
        }

        #[test]
        fn current_session_reads_token_and_role() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_get()
                .with(eq(TOKEN_KEY))
                .returning(|_| Ok(Some("abc".to_owned())));
            kv.expect_get()
                .with(eq(ROLE_KEY))
                .returning(|_| Ok(Some("admin".to_owned())));

            let session = SessionStore::new(kv).current();
            assert!(session.is_admin());
            assert_that!(session.token()).is_equal_to(Some(&AuthToken::new("abc")));
        }

        #[test]
        fn unreadable_storage_means_signed_out() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_get().returning(|_| Err(anyhow!("disk on fire")));

            let session = SessionStore::new(kv).current();
            assert!(!session.is_authenticated());
        }

        #[test]
        fn unknown_roles_are_dropped() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_get()
                .with(eq(ROLE_KEY))
                .returning(|_| Ok(Some("wizard".to_owned())));

            assert_that!(SessionStore::new(kv).role()).is_none();
        }
    }

    mod login_service {
        use super::*;
        use crate::domain::session::driving_ports::LoginPort;
        use crate::domain::session::test_util::*;
        use crate::domain::EntityId;
        use crate::external_connections;

        fn admin_grant() -> AuthGrant {
            AuthGrant {
                token: AuthToken::new("fresh-token"),
                user: UserRef {
                    id: EntityId(1),
                    username: "root".to_owned(),
                },
                role: Role::Admin,
            }
        }

        fn credentials() -> Credentials {
            Credentials {
                username: "root".to_owned(),
                password: "hunter22".to_owned(),
            }
        }

        #[tokio::test]
        async fn successful_login_persists_the_session() {
            let ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let authenticator = MockAuthenticator::build_locked(|auth| {
                auth.token_auth_response.set_returned_result(Ok(admin_grant()));
            });
            let mut kv = MockKeyValueStore::new();
            kv.expect_set().times(2).returning(|_, _| Ok(()));
            let store = SessionStore::new(kv);

            let session = LoginService {}
                .log_in(&credentials(), &store, &ext_cxn, &authenticator)
                .await;
            assert_that!(session).is_ok().matches(|session| session.is_admin());

            let locked = authenticator.lock().expect("mock poisoned");
            assert_that!(locked.token_auth_response.calls().len()).is_equal_to(1);
            assert_that!(locked.token_auth_response.calls()[0].username.as_str())
                .is_equal_to("root");
        }

        #[tokio::test]
        async fn refused_login_stores_nothing() {
            let ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let authenticator = MockAuthenticator::build_locked(|auth| {
                auth.token_auth_response.set_returned_result(Err(DrivenPortError::Rejected(
                    "Please, enter valid credentials.".to_owned(),
                )));
            });
            let mut kv = MockKeyValueStore::new();
            kv.expect_set().never();
            let store = SessionStore::new(kv);

            let session = LoginService {}
                .log_in(&credentials(), &store, &ext_cxn, &authenticator)
                .await;
            let Err(error) = session else {
                panic!("Login should have been refused");
            };
            assert_that!(error.user_message())
                .is_equal_to("Please, enter valid credentials.".to_owned());
        }

        #[test]
        fn log_out_clears_the_store() {
            let mut kv = MockKeyValueStore::new();
            kv.expect_remove().times(2).returning(|_| Ok(()));

            assert_that!(LoginService {}.log_out(&SessionStore::new(kv))).is_ok();
        }
    }
}
