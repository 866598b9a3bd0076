use crate::domain::session::Session;
use crate::remote::cache::QueryCache;
use reqwest_middleware::ClientWithMiddleware;

/// Whether a query may be answered from the query cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Serve cached results when present, otherwise ask the API and cache the answer
    CacheFirst,
    /// Always ask the API, replacing whatever was cached for the query
    NetworkOnly,
}

/// Everything a driven adapter needs to talk to the task API on behalf of the current session.
/// The session travels with the connection so no adapter ever reads credentials from ambient state.
pub trait ExternalConnectivity {
    fn http_client(&self) -> &ClientWithMiddleware;
    fn api_url(&self) -> &str;
    fn session(&self) -> &Session;
    fn query_cache(&self) -> &QueryCache;
    fn fetch_policy(&self) -> FetchPolicy;

    /// A copy of this connection acting for a different session
    fn with_session(&self, session: Session) -> Self
    where
        Self: Sized;

    /// A copy of this connection whose queries bypass the cache, used to re-fetch after mutations
    fn for_refetch(&self) -> Self
    where
        Self: Sized;
}
