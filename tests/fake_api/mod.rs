//! A stand-in for the task API's GraphQL endpoint. Every request is recorded and answered by a
//! test-provided closure.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub variables: Value,
    pub authorization: Option<String>,
}

type Responder = Arc<dyn Fn(&str, &Value) -> Value + Send + Sync>;

#[derive(Clone)]
struct FakeApiState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    respond: Responder,
}

pub struct FakeApi {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeApi {
    /// Serves on a random local port. `respond` gets the operation name and variables of each
    /// request and returns the whole response envelope.
    pub async fn start(respond: impl Fn(&str, &Value) -> Value + Send + Sync + 'static) -> FakeApi {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = FakeApiState {
            calls: calls.clone(),
            respond: Arc::new(respond),
        };
        let app = Router::new()
            .route("/graphql", post(answer))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("could not bind the fake API");
        let address = listener.local_addr().expect("fake API has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("fake API stopped unexpectedly");
        });

        FakeApi {
            url: format!("http://{address}/graphql"),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }
}

async fn answer(
    State(state): State<FakeApiState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let operation = body["operationName"].as_str().unwrap_or_default().to_owned();
    let variables = body["variables"].clone();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let response = (state.respond)(&operation, &variables);
    state
        .calls
        .lock()
        .expect("call log poisoned")
        .push(RecordedCall {
            operation,
            variables,
            authorization,
        });

    Json(response)
}
