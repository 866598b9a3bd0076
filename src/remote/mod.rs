//! Driven adapters talking to the task manager's GraphQL API, plus the transport they share.

pub mod cache;
pub mod remote_auth_driven_ports;
pub mod remote_comment_driven_ports;
pub mod remote_project_driven_ports;
pub mod remote_stats_driven_ports;
pub mod remote_task_driven_ports;
pub mod remote_user_driven_ports;

use crate::domain::DrivenPortError;
use crate::domain::session::Session;
use crate::external_connections::{ExternalConnectivity, FetchPolicy};
use anyhow::Context;
use cache::{EntityKind, QueryCache};
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Owns the HTTP client, endpoint, session and query cache used by the remote adapters
#[derive(Clone)]
pub struct RemoteConnectivity {
    http_client: ClientWithMiddleware,
    api_url: String,
    session: Session,
    cache: Arc<QueryCache>,
    fetch_policy: FetchPolicy,
}

impl RemoteConnectivity {
    /// Connectivity for an anonymous session against the GraphQL endpoint at `api_url`
    pub fn new(api_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .context("building the HTTP client")?;
        let http_client = ClientBuilder::new(base_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(RemoteConnectivity {
            http_client,
            api_url: api_url.into(),
            session: Session::default(),
            cache: Arc::new(QueryCache::new()),
            fetch_policy: FetchPolicy::CacheFirst,
        })
    }
}

impl ExternalConnectivity for RemoteConnectivity {
    fn http_client(&self) -> &ClientWithMiddleware {
        &self.http_client
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn query_cache(&self) -> &QueryCache {
        &self.cache
    }

    fn fetch_policy(&self) -> FetchPolicy {
        self.fetch_policy
    }

    fn with_session(&self, session: Session) -> Self {
        RemoteConnectivity {
            session,
            ..self.clone()
        }
    }

    fn for_refetch(&self) -> Self {
        RemoteConnectivity {
            fetch_policy: FetchPolicy::NetworkOnly,
            ..self.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("could not reach the task API: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("the task API answered {operation} with HTTP {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },
    #[error("{}", messages.join("; "))]
    Api {
        operation: &'static str,
        messages: Vec<String>,
    },
    #[error("the task API returned no data for {operation}")]
    MissingData { operation: &'static str },
    #[error("the task API sent a malformed {operation} response: {source}")]
    Malformed {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<RemoteError> for DrivenPortError {
    fn from(value: RemoteError) -> Self {
        DrivenPortError::CommsFailure(anyhow::Error::new(value))
    }
}

/// A read operation and the entity kinds its result is built from
pub(crate) struct Query {
    pub name: &'static str,
    pub document: &'static str,
    pub reads: &'static [EntityKind],
}

/// A write operation and the entity kinds it changes
pub(crate) struct Mutation {
    pub name: &'static str,
    pub document: &'static str,
    pub writes: &'static [EntityKind],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Payload every mutation of the API answers with
#[derive(Debug, Deserialize)]
pub(crate) struct MutationAck {
    success: Option<bool>,
    error: Option<String>,
}

impl MutationAck {
    pub(crate) fn into_result(self) -> Result<(), DrivenPortError> {
        if self.success == Some(true) {
            return Ok(());
        }

        let message = self
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "The request was not accepted".to_owned());
        Err(DrivenPortError::Rejected(message))
    }
}

/// Runs a query, answering from the cache when the connection's fetch policy allows it
#[instrument(skip_all, fields(operation = query.name))]
pub(crate) async fn run_query<T: DeserializeOwned>(
    ext_cxn: &impl ExternalConnectivity,
    query: &Query,
    variables: Value,
) -> Result<T, RemoteError> {
    let key = QueryCache::key(query.name, &variables);
    if ext_cxn.fetch_policy() == FetchPolicy::CacheFirst {
        if let Some(cached) = ext_cxn.query_cache().get(&key) {
            debug!("Answering {} from the cache", query.name);
            return parse_data(query.name, cached);
        }
    }

    let data = post(ext_cxn, query.name, query.document, &variables).await?;
    let typed = parse_data(query.name, data.clone())?;
    ext_cxn.query_cache().put(key, data, query.reads);

    Ok(typed)
}

/// Runs a mutation and drops every cached query built from the kinds it writes
#[instrument(skip_all, fields(operation = mutation.name))]
pub(crate) async fn run_mutation<T: DeserializeOwned>(
    ext_cxn: &impl ExternalConnectivity,
    mutation: &Mutation,
    variables: Value,
) -> Result<T, RemoteError> {
    let outcome = post(ext_cxn, mutation.name, mutation.document, &variables).await;
    // Even a failed call may have changed something on the server
    ext_cxn.query_cache().invalidate(mutation.writes);

    parse_data(mutation.name, outcome?)
}

async fn post(
    ext_cxn: &impl ExternalConnectivity,
    operation: &'static str,
    document: &str,
    variables: &Value,
) -> Result<Value, RemoteError> {
    let body = GraphQlRequest {
        query: document,
        operation_name: operation,
        variables,
    };
    let mut request = ext_cxn.http_client().post(ext_cxn.api_url()).json(&body);
    if let Some(credential) = ext_cxn.session().authorization_header() {
        request = request.header(AUTHORIZATION, credential);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(reqwest_middleware::Error::from)?;

    read_envelope(operation, status, &text)
}

/// Picks the `data` out of a GraphQL response body, turning every kind of failure into a
/// [RemoteError]
fn read_envelope(
    operation: &'static str,
    status: StatusCode,
    body: &str,
) -> Result<Value, RemoteError> {
    let envelope: GraphQlResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => return Err(RemoteError::Status { operation, status }),
        Err(source) => return Err(RemoteError::Malformed { operation, source }),
    };

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|err| err.message).collect();
        warn!(operation, "The task API reported errors: {messages:?}");
        return Err(RemoteError::Api {
            operation,
            messages,
        });
    }
    if !status.is_success() {
        return Err(RemoteError::Status { operation, status });
    }

    match envelope.data {
        Some(Value::Null) | None => Err(RemoteError::MissingData { operation }),
        Some(data) => Ok(data),
    }
}

fn parse_data<T: DeserializeOwned>(operation: &'static str, data: Value) -> Result<T, RemoteError> {
    serde_json::from_value(data).map_err(|source| RemoteError::Malformed { operation, source })
}

/// Reads a `Date` field. Some API fields carry a full timestamp, of which only the day is kept.
pub(crate) fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let day = raw.split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Formats a date the way the API's `Date` scalar expects it
pub(crate) fn date_variable(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Wire shape of the user slices embedded in other entities
#[derive(Deserialize)]
pub(crate) struct UserRefRow {
    pub id: crate::domain::EntityId,
    pub username: String,
}

impl From<UserRefRow> for crate::domain::user::UserRef {
    fn from(value: UserRefRow) -> Self {
        crate::domain::user::UserRef {
            id: value.id,
            username: value.username,
        }
    }
}

/// Wire shape of the project slices embedded in tasks
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectRefRow {
    pub id: crate::domain::EntityId,
    pub project_name: String,
}

impl From<ProjectRefRow> for crate::domain::project::ProjectRef {
    fn from(value: ProjectRefRow) -> Self {
        crate::domain::project::ProjectRef {
            id: value.id,
            name: value.project_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use speculoos::prelude::*;

    mod envelope {
        use super::*;

        #[test]
        fn data_is_extracted() {
            let data = read_envelope("getUsers", StatusCode::OK, r#"{"data": {"users": []}}"#);
            assert_that!(data).is_ok_containing(json!({ "users": [] }));
        }

        #[test]
        fn graphql_errors_win_over_data() {
            let data = read_envelope(
                "getUsers",
                StatusCode::OK,
                r#"{"data": null, "errors": [{"message": "Not logged in"}, {"message": "Denied"}]}"#,
            );
            let Err(err) = data else {
                panic!("errors should fail the call");
            };
            assert_that!(err.to_string()).is_equal_to("Not logged in; Denied".to_owned());
        }

        #[test]
        fn http_failures_without_errors_report_the_status() {
            let data = read_envelope("getUsers", StatusCode::BAD_GATEWAY, "<html>oops</html>");
            assert_that!(data).is_err().matches(|err| {
                matches!(err, RemoteError::Status { status, .. } if *status == StatusCode::BAD_GATEWAY)
            });
        }

        #[test]
        fn missing_data_is_an_error() {
            let data = read_envelope("me", StatusCode::OK, r#"{"data": null}"#);
            assert_that!(data)
                .is_err()
                .matches(|err| matches!(err, RemoteError::MissingData { operation: "me" }));
        }

        #[test]
        fn unparseable_bodies_are_malformed() {
            let data = read_envelope("me", StatusCode::OK, "not json");
            assert_that!(data)
                .is_err()
                .matches(|err| matches!(err, RemoteError::Malformed { .. }));
        }
    }

    mod acknowledgements {
        use super::*;

        #[test]
        fn only_explicit_success_is_accepted() {
            let accepted: MutationAck =
                serde_json::from_value(json!({ "success": true, "error": null })).expect("ack");
            assert_that!(accepted.into_result()).is_ok();

            let refused: MutationAck = serde_json::from_value(
                json!({ "success": false, "error": "Only admin can delete a project" }),
            )
            .expect("ack");
            assert_that!(refused.into_result()).is_err().matches(|err| {
                matches!(err, DrivenPortError::Rejected(msg) if msg == "Only admin can delete a project")
            });

            let silent: MutationAck = serde_json::from_value(json!({})).expect("ack");
            assert_that!(silent.into_result()).is_err();
        }
    }

    #[test]
    fn dates_accept_timestamps() {
        #[derive(Deserialize)]
        struct Dated {
            #[serde(deserialize_with = "deserialize_date")]
            due: NaiveDate,
        }

        let plain: Dated = serde_json::from_value(json!({ "due": "2030-01-31" })).expect("date");
        let stamped: Dated =
            serde_json::from_value(json!({ "due": "2030-01-31T00:00:00+00:00" })).expect("date");
        assert_that!(plain.due).is_equal_to(stamped.due);
        assert_that!(date_variable(plain.due)).is_equal_to("2030-01-31".to_owned());
    }

    #[test]
    fn remote_errors_become_comms_failures() {
        let port_error = DrivenPortError::from(RemoteError::MissingData { operation: "stats" });
        assert!(matches!(port_error, DrivenPortError::CommsFailure(_)));
    }
}
