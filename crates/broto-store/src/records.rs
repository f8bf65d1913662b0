//! Generic key-value record store.
//!
//! Each namespace in the `records` table holds one JSON document serialized
//! to text — either a whole collection (users, complaints) or a scalar
//! (session pointer, sequence counter, legacy admin flag). Writes replace
//! the entire document; callers read-modify-write the full collection for
//! any single-record change.
//!
//! Reads fail soft: a missing namespace or unparseable payload is treated
//! as absent data, never surfaced as an error. Substrate failures (the
//! database itself erroring) do propagate.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::db::Database;
use crate::error::StoreResult;

/// Namespace holding the serialized complaint collection.
pub const NS_COMPLAINTS: &str = "complaints";
/// Namespace holding the serialized user collection.
pub const NS_USERS: &str = "users";
/// Namespace holding the current-session user snapshot.
pub const NS_CURRENT_USER: &str = "current_user";
/// Namespace holding the complaint-code sequence counter.
pub const NS_COMPLAINT_COUNTER: &str = "complaint_counter";
/// Namespace holding the legacy admin-session flag.
pub const NS_ADMIN_AUTHENTICATED: &str = "admin_authenticated";

/// Whole-collection persistence against named key-value namespaces.
#[derive(Clone)]
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Create a new record store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Borrow the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Load the collection stored under `namespace`.
    ///
    /// Returns an empty vec if the namespace does not exist or its content
    /// cannot be deserialized (corrupt data is treated as absent).
    #[instrument(skip(self))]
    pub async fn load<T: DeserializeOwned + Send + 'static>(
        &self,
        namespace: &str,
    ) -> StoreResult<Vec<T>> {
        match self.read_raw(namespace).await? {
            None => Ok(Vec::new()),
            Some(text) => match serde_json::from_str(&text) {
                Ok(items) => Ok(items),
                Err(err) => {
                    warn!(namespace, %err, "discarding unparseable collection");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Overwrite the entire collection stored under `namespace`.
    #[instrument(skip(self, items))]
    pub async fn save<T: Serialize>(&self, namespace: &str, items: &[T]) -> StoreResult<()> {
        let text = serde_json::to_string(items)?;
        self.write_raw(namespace, text).await
    }

    /// Read a scalar value stored under `namespace`.
    ///
    /// Returns `None` if the namespace is absent or unparseable.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(
        &self,
        namespace: &str,
    ) -> StoreResult<Option<T>> {
        match self.read_raw(namespace).await? {
            None => Ok(None),
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    warn!(namespace, %err, "discarding unparseable scalar");
                    Ok(None)
                }
            },
        }
    }

    /// Write a scalar value under `namespace` (insert or update).
    #[instrument(skip(self, value))]
    pub async fn put<T: Serialize>(&self, namespace: &str, value: &T) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.write_raw(namespace, text).await
    }

    /// Remove `namespace` entirely, returning `true` if it existed.
    #[instrument(skip(self))]
    pub async fn clear(&self, namespace: &str) -> StoreResult<bool> {
        let namespace = namespace.to_string();
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM records WHERE namespace = ?1",
                    rusqlite::params![namespace],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Return whether `namespace` currently holds a value.
    #[instrument(skip(self))]
    pub async fn exists(&self, namespace: &str) -> StoreResult<bool> {
        Ok(self.read_raw(namespace).await?.is_some())
    }

    /// Atomically increment the integer stored under `namespace` and return
    /// the new value. An absent or unparseable value counts as 0, so the
    /// first call returns 1.
    ///
    /// The read and write happen inside one critical section on the
    /// connection, so the sequence stays gap-free even with multiple
    /// callers.
    #[instrument(skip(self))]
    pub async fn increment(&self, namespace: &str) -> StoreResult<i64> {
        let namespace = namespace.to_string();
        self.db
            .execute(move |conn| {
                let current: Option<String> = match conn.query_row(
                    "SELECT value FROM records WHERE namespace = ?1",
                    rusqlite::params![namespace],
                    |row| row.get(0),
                ) {
                    Ok(value) => Some(value),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };

                let next = current
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .unwrap_or(0)
                    + 1;

                conn.execute(
                    "INSERT INTO records (namespace, value) VALUES (?1, ?2) \
                     ON CONFLICT(namespace) DO UPDATE SET value = excluded.value",
                    rusqlite::params![namespace, next.to_string()],
                )?;
                debug!(namespace = %namespace, next, "counter advanced");
                Ok(next)
            })
            .await
    }

    // ── raw text access ──────────────────────────────────────────────

    async fn read_raw(&self, namespace: &str) -> StoreResult<Option<String>> {
        let namespace = namespace.to_string();
        self.db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT value FROM records WHERE namespace = ?1",
                    rusqlite::params![namespace],
                    |row| row.get(0),
                );
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn write_raw(&self, namespace: &str, value: String) -> StoreResult<()> {
        let namespace = namespace.to_string();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO records (namespace, value) VALUES (?1, ?2) \
                     ON CONFLICT(namespace) DO UPDATE SET value = excluded.value",
                    rusqlite::params![namespace, value],
                )?;
                debug!(namespace = %namespace, "namespace written");
                Ok(())
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────
