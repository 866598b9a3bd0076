use crate::app_env::test::{TEST_API_URL, TEST_PASSWORD, TEST_USERNAME};
use crate::domain::session::driving_ports::LoginPort;
use crate::domain::session::{Credentials, LoginService, SessionStore};
use crate::external_connections::ExternalConnectivity;
use crate::remote::RemoteConnectivity;
use crate::remote::remote_auth_driven_ports::RemoteAuthenticator;
use crate::storage::MemoryKeyValueStore;
use dotenv::dotenv;
use std::env;

/// A live session against the API at TEST_API_URL, logged in as TEST_USERNAME
pub struct LiveSession {
    pub sessions: SessionStore<MemoryKeyValueStore>,
    pub ext_cxn: RemoteConnectivity,
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("You must provide the {key} environment variable"))
}

/// Logs in against a running task API. Expects TEST_API_URL, TEST_USERNAME and TEST_PASSWORD
/// to be populated, and the account to be an admin.
pub async fn log_in() -> LiveSession {
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    let ext_cxn = RemoteConnectivity::new(required_env(TEST_API_URL))
        .expect("could not build the HTTP client");
    let sessions = SessionStore::new(MemoryKeyValueStore::new());
    let credentials = Credentials {
        username: required_env(TEST_USERNAME),
        password: required_env(TEST_PASSWORD),
    };

    let session = LoginService {}
        .log_in(&credentials, &sessions, &ext_cxn, &RemoteAuthenticator)
        .await
        .expect("test account could not log in");
    let ext_cxn = ext_cxn.with_session(session);

    LiveSession { sessions, ext_cxn }
}

/// A name no earlier test run has used
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", chrono::Utc::now().timestamp_millis())
}
