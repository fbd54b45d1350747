//! Namespaced document store with equality indexes.

mod document;
mod index;
mod namespace;
mod schema;
mod table;

pub use document::{normalize_field, Document, NAMESPACE_FIELD, SYNC_FIELD};
pub use namespace::{namespace_name, type_namespace_name, Namespace};
pub use schema::Schema;
pub(crate) use table::DocTable;

use crate::error::CoreResult;
use crate::state::Shared;
use memstash_codec::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one pass over the unsynced documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Documents pushed and marked synced.
    pub synced: usize,
    /// Documents whose push failed; they stay unsynced.
    pub failed: usize,
}

/// Handle to the document half of a [`Store`](crate::Store).
#[derive(Clone)]
pub struct DataStore {
    shared: Arc<Shared>,
}

impl DataStore {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Declares a namespace and returns a handle to it.
    ///
    /// Declaring an existing namespace replaces its schema and rebuilds its
    /// index; its documents are kept.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidNamespace`](crate::CoreError::InvalidNamespace)
    /// if the name is blank.
    pub fn namespace(&self, name: &str, schema: Option<Schema>) -> CoreResult<Namespace> {
        let name = namespace_name(name)?;
        self.declare(name, schema)
    }

    /// Declares the namespace named after type `T`.
    ///
    /// ```
    /// use memstash_core::{Config, Store};
    ///
    /// struct User;
    ///
    /// let store = Store::open(Config::default()).unwrap();
    /// let users = store.data_store().namespace_for::<User>(None).unwrap();
    /// assert_eq!(users.name(), "users");
    /// ```
    ///
    /// # Errors
    ///
    /// As [`namespace`](Self::namespace).
    pub fn namespace_for<T: ?Sized>(&self, schema: Option<Schema>) -> CoreResult<Namespace> {
        let name = type_namespace_name::<T>()?;
        self.declare(name, schema)
    }

    fn declare(&self, name: String, schema: Option<Schema>) -> CoreResult<Namespace> {
        self.shared.state.write().docs.declare(&name, schema);
        debug!(namespace = %name, "namespace declared");
        Ok(Namespace::new(Arc::clone(&self.shared), name))
    }

    /// Returns the names of every namespace, sorted.
    pub fn list_namespaces(&self) -> Vec<String> {
        self.shared.state.read().docs.names()
    }

    /// Total number of documents across namespaces.
    pub fn document_count(&self) -> usize {
        self.shared.state.read().docs.document_count()
    }

    /// Number of documents not yet pushed to a sink.
    pub fn unsynced_count(&self) -> usize {
        let state = self.shared.state.read();
        state.docs.iter().map(|(_, ns)| ns.unsynced()).sum()
    }

    /// Offers every unsynced document to `push`, marking successes synced.
    ///
    /// `push` receives the namespace name and a copy of the document without
    /// the sync flag. Failures are logged and left for the next pass. The
    /// store lock is held for the whole pass, so no mutation interleaves
    /// with it.
    pub fn sync_pending<F, E>(&self, mut push: F) -> SyncOutcome
    where
        F: FnMut(&str, &Document) -> Result<(), E>,
        E: fmt::Display,
    {
        let mut outcome = SyncOutcome::default();
        let mut state = self.shared.state.write();
        for (name, ns) in state.docs.iter_mut() {
            let mut touched = false;
            for position in 0..ns.documents.len() {
                if ns.documents[position].is_synced() {
                    continue;
                }
                let row = ns.documents[position].without_sync_flag();
                match push(name, &row) {
                    Ok(()) => {
                        ns.set_field(position, SYNC_FIELD, Value::Bool(true));
                        outcome.synced += 1;
                        touched = true;
                    }
                    Err(e) => {
                        warn!(namespace = name, position, error = %e, "sync insert failed, will retry");
                        outcome.failed += 1;
                    }
                }
            }
            if touched {
                ns.rebuild_index();
            }
        }
        drop(state);

        self.shared
            .stats
            .record_sync(outcome.synced as u64, outcome.failed as u64);
        if outcome.synced + outcome.failed > 0 {
            debug!(synced = outcome.synced, failed = outcome.failed, "sync pass complete");
        }
        outcome
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("namespaces", &self.list_namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use memstash_codec::TypeTag;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        name: String,
        age: i64,
    }

    fn data_store() -> DataStore {
        DataStore::new(Arc::new(Shared::new(None)))
    }

    fn jane() -> Document {
        Document::from([("Name", Value::from("Jane")), ("Age", Value::from(30))])
    }

    #[test]
    fn create_and_query() {
        let ds = data_store();
        let users = ds.namespace("user", None).unwrap();
        users.create(jane()).unwrap();

        let found = users.query(&Document::from([("Age", 30)]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("name"), Some(&Value::from("Jane")));
        assert_eq!(found[0].get("age"), Some(&Value::from(30)));
        assert_eq!(found[0].get(SYNC_FIELD), Some(&Value::from(false)));
    }

    #[test]
    fn handles_share_namespace() {
        let ds = data_store();
        ds.namespace("user", None).unwrap().create(jane()).unwrap();
        assert_eq!(ds.namespace("users", None).unwrap().count(), 1);
        assert_eq!(ds.list_namespaces(), vec!["users"]);
    }

    #[test]
    fn schema_enforced() {
        let ds = data_store();
        let schema = Schema::new().field("age", TypeTag::Int);
        let users = ds.namespace("user", Some(schema)).unwrap();

        let err = users.create(Document::from([("age", "thirty")])).unwrap_err();
        assert!(matches!(err, CoreError::SchemaTypeMismatch { .. }));
        users.create(Document::from([("age", 30)])).unwrap();

        let err = users
            .update(&Document::from([("age", 30)]), Document::from([("age", 1.5)]))
            .unwrap_err();
        assert!(matches!(err, CoreError::SchemaTypeMismatch { .. }));
    }

    #[test]
    fn query_returns_copies() {
        let ds = data_store();
        let users = ds.namespace("user", None).unwrap();
        users.create(jane()).unwrap();

        let mut copy = users.query(&Document::new()).remove(0);
        copy.insert("name", "Mutated");
        assert_eq!(
            users.query(&Document::new())[0].get("name"),
            Some(&Value::from("Jane"))
        );
    }

    #[test]
    fn find_and_first_decode() {
        let ds = data_store();
        let users = ds.namespace("user", None).unwrap();
        users
            .create_from(&User {
                name: "Jane".into(),
                age: 30,
            })
            .unwrap();
        users
            .create_from(&User {
                name: "John".into(),
                age: 30,
            })
            .unwrap();

        let all: Vec<User> = users.find(&Document::from([("age", 30)])).unwrap();
        assert_eq!(all.len(), 2);

        let john: User = users.first(&Document::from([("name", "John")])).unwrap();
        assert_eq!(john.age, 30);

        assert!(matches!(
            users.first::<User>(&Document::from([("age", 30)])),
            Err(CoreError::TooManyResults { count: 2 })
        ));
        assert!(matches!(
            users.first::<User>(&Document::from([("age", 5)])),
            Err(CoreError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn sync_pending_marks_successes() {
        let ds = data_store();
        let users = ds.namespace("user", None).unwrap();
        users.create(jane()).unwrap();
        users.create(Document::from([("name", "Fail")])).unwrap();

        let mut rows = Vec::new();
        let outcome = ds.sync_pending(|table, row| {
            if row.get("name") == Some(&Value::from("Fail")) {
                return Err("rejected");
            }
            rows.push((table.to_string(), row.clone()));
            Ok(())
        });

        assert_eq!(outcome, SyncOutcome { synced: 1, failed: 1 });
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "users");
        assert!(!rows[0].1.contains_key(SYNC_FIELD));
        assert_eq!(ds.unsynced_count(), 1);
        assert_eq!(users.query(&Document::from([(SYNC_FIELD, true)])).len(), 1);
    }
}
