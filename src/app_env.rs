use std::env;
use std::path::PathBuf;

/// URL of the task manager's GraphQL endpoint
pub const API_URL: &str = "API_URL";
/// Endpoint used when [API_URL] is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000/graphql";
/// Path of the JSON file holding the persisted session (auth token and role tag)
pub const SESSION_FILE: &str = "SESSION_FILE";
/// Session file used when [SESSION_FILE] is not set
pub const DEFAULT_SESSION_FILE: &str = ".taskboard-session.json";
/// Username the session driver logs in with when no session is stored yet
pub const USERNAME: &str = "TASKBOARD_USERNAME";
/// Password the session driver logs in with when no session is stored yet
pub const PASSWORD: &str = "TASKBOARD_PASSWORD";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Spans are only exported when this is set, typically to
/// http://localhost:4317 where a collector is listening
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Metrics are only exported when this is set, typically to
/// http://localhost:4317 where a collector is listening
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// Where the client talks to and where it keeps its session, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Reads [API_URL] and [SESSION_FILE], falling back to their defaults when unset or blank
    pub fn from_env() -> ClientConfig {
        ClientConfig::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientConfig {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        ClientConfig {
            api_url: read(API_URL, DEFAULT_API_URL),
            session_file: PathBuf::from(read(SESSION_FILE, DEFAULT_SESSION_FILE)),
        }
    }
}
