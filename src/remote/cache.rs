use derive_more::Display;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Kinds of entity a GraphQL operation reads or writes
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[display("user")]
    User,
    #[display("project")]
    Project,
    #[display("task")]
    Task,
    #[display("comment")]
    Comment,
    /// Aggregates computed from tasks
    #[display("stats")]
    Stats,
}

/// Entries kept before the oldest write is evicted. Each expanded task adds a comment query,
/// so a long session would otherwise grow without limit.
pub const DEFAULT_CAPACITY: usize = 64;

struct CachedResult {
    data: Value,
    reads: Vec<EntityKind>,
    written: u64,
}

#[derive(Default)]
struct Entries {
    results: HashMap<String, CachedResult>,
    writes: u64,
}

/// In-memory store of query results shared by every view of a session. Entries are keyed by
/// operation name and variables, and dropped as soon as a mutation writes one of the entity
/// kinds they were built from. Past its capacity the least recently written entry goes first.
pub struct QueryCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache::default()
    }

    /// A cache holding at most `capacity` results, and at least one
    pub fn with_capacity(capacity: usize) -> QueryCache {
        QueryCache {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    /// Cache key of an operation invocation. `serde_json` keeps object keys sorted, so equal
    /// variable sets always produce the same key.
    pub fn key(operation: &str, variables: &Value) -> String {
        format!("{operation}:{variables}")
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // Entries are replaced whole, so a panic mid-update cannot leave one half-written
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries().results.get(key).map(|entry| entry.data.clone())
    }

    pub fn put(&self, key: String, data: Value, reads: &[EntityKind]) {
        let mut entries = self.entries();
        if !entries.results.contains_key(&key) && entries.results.len() >= self.capacity {
            let oldest = entries
                .results
                .iter()
                .min_by_key(|(_, entry)| entry.written)
                .map(|(oldest, _)| oldest.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting cached query {oldest}");
                entries.results.remove(&oldest);
            }
        }

        entries.writes += 1;
        let written = entries.writes;
        entries.results.insert(
            key,
            CachedResult {
                data,
                reads: reads.to_vec(),
                written,
            },
        );
    }

    /// Drops every entry built from any of `writes`, returning how many went away
    pub fn invalidate(&self, writes: &[EntityKind]) -> usize {
        let mut entries = self.entries();
        let before = entries.results.len();
        entries
            .results
            .retain(|_, entry| !entry.reads.iter().any(|kind| writes.contains(kind)));

        let dropped = before - entries.results.len();
        if dropped > 0 {
            debug!(?writes, "Invalidated {dropped} cached queries");
        }
        dropped
    }

    pub fn clear(&self) {
        self.entries().results.clear();
    }

    pub fn len(&self) -> usize {
        self.entries().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use speculoos::prelude::*;

    #[test]
    fn keys_depend_on_operation_and_variables() {
        let assigned = QueryCache::key("getTasks", &json!({ "created": false }));
        let created = QueryCache::key("getTasks", &json!({ "created": true }));
        let users = QueryCache::key("getUsers", &json!({}));

        assert_that!(assigned).is_not_equal_to(created.clone());
        assert_that!(created).is_not_equal_to(users);
        assert_that!(QueryCache::key("getTasks", &json!({ "created": false })))
            .is_equal_to(assigned);
    }

    #[test]
    fn mutations_only_drop_what_they_touch() {
        let cache = QueryCache::new();
        cache.put("tasks".to_owned(), json!([1]), &[EntityKind::Task]);
        cache.put(
            "stats".to_owned(),
            json!({ "completed": 1 }),
            &[EntityKind::Stats, EntityKind::Task],
        );
        cache.put("users".to_owned(), json!([]), &[EntityKind::User]);

        assert_that!(cache.invalidate(&[EntityKind::Task])).is_equal_to(2);
        assert_that!(cache.get("tasks")).is_none();
        assert_that!(cache.get("stats")).is_none();
        assert_that!(cache.get("users")).is_equal_to(Some(json!([])));
    }

    #[test]
    fn full_caches_evict_the_oldest_write() {
        let cache = QueryCache::with_capacity(2);
        let comments = |task: i32| QueryCache::key("getComments", &json!({ "taskId": task }));
        cache.put(comments(1), json!([]), &[EntityKind::Comment]);
        cache.put(comments(2), json!([]), &[EntityKind::Comment]);
        // Rewriting an entry refreshes it without evicting anything
        cache.put(comments(1), json!(["hi"]), &[EntityKind::Comment]);
        assert_that!(cache.len()).is_equal_to(2);

        cache.put(comments(3), json!([]), &[EntityKind::Comment]);

        assert_that!(cache.len()).is_equal_to(2);
        assert_that!(cache.get(&comments(2))).is_none();
        assert_that!(cache.get(&comments(1))).is_equal_to(Some(json!(["hi"])));
        assert_that!(cache.get(&comments(3))).is_equal_to(Some(json!([])));
    }

    #[test]
    fn expanding_many_tasks_stays_within_capacity() {
        let cache = QueryCache::new();
        for task in 0..(DEFAULT_CAPACITY as i32 * 3) {
            cache.put(
                QueryCache::key("getComments", &json!({ "taskId": task })),
                json!([]),
                &[EntityKind::Comment],
            );
        }
        assert_that!(cache.len()).is_equal_to(DEFAULT_CAPACITY);
    }

    #[test]
    fn clear_forgets_everything() {
        let cache = QueryCache::new();
        cache.put("users".to_owned(), json!([]), &[EntityKind::User]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
