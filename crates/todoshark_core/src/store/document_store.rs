//! Document store contract and SQLite-backed implementation.
//!
//! # Responsibility
//! - Provide collection-scoped add/update/delete/query over documents.
//! - Push full collection snapshots to registered watchers after each write.
//!
//! # Invariants
//! - A watcher receives the current snapshot right after registration.
//! - Every successful write to a collection re-queries and re-delivers the
//!   full snapshot to each watcher of that collection.
//! - Listeners run without any store lock held. A listener must not write to
//!   the store synchronously; nested deliveries to a busy listener are skipped.

use crate::db::{open_db, open_db_in_memory};
use crate::model::EntityId;
use crate::store::document::{Document, DocumentPatch, OrderBy, StoredDocument};
use crate::store::{StoreError, StoreResult};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, TryLockError};
use uuid::Uuid;

/// Registration handle returned by [`DocumentStore::watch`].
pub type WatchId = u64;

/// Callback receiving each full snapshot (or the query error that replaced it).
pub type SnapshotListener = Box<dyn FnMut(StoreResult<Vec<StoredDocument>>) + Send>;

/// Document store operations used by entity repositories.
pub trait DocumentStore: Send + Sync {
    /// Writes a new document and returns its store-assigned id.
    fn add(&self, collection: &str, document: Document) -> StoreResult<EntityId>;
    /// Merges `patch` into an existing document. Fails with `NotFound` when absent.
    fn update(&self, collection: &str, id: EntityId, patch: &DocumentPatch) -> StoreResult<()>;
    /// Deletes one document. Deleting an absent document is a no-op.
    fn delete(&self, collection: &str, id: EntityId) -> StoreResult<()>;
    /// Reads the whole collection in the requested order.
    fn query(&self, collection: &str, order: &OrderBy) -> StoreResult<Vec<StoredDocument>>;
    /// Registers a snapshot listener for one collection.
    fn watch(
        &self,
        collection: &str,
        order: OrderBy,
        listener: SnapshotListener,
    ) -> StoreResult<WatchId>;
    /// Removes a listener. Returns `false` when the id was not registered.
    fn unwatch(&self, watch_id: WatchId) -> bool;
}

struct Watcher {
    collection: String,
    order: OrderBy,
    listener: Arc<Mutex<SnapshotListener>>,
}

#[derive(Default)]
struct WatcherRegistry {
    next_id: WatchId,
    watchers: BTreeMap<WatchId, Watcher>,
}

/// SQLite-backed document store. Bodies are JSON-encoded `Document`s.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
    watchers: Mutex<WatcherRegistry>,
}

impl SqliteDocumentStore {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            watchers: Mutex::new(WatcherRegistry::default()),
        }
    }

    /// Opens (and migrates) a store file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Number of live watchers across all collections.
    pub fn watcher_count(&self) -> usize {
        self.watchers
            .lock()
            .map(|registry| registry.watchers.len())
            .unwrap_or(0)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned"))?;
        f(&conn)
    }

    fn load_body(conn: &Connection, collection: &str, id: EntityId) -> StoreResult<Option<Document>> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection, id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|text| serde_json::from_str(&text).map_err(StoreError::from))
            .transpose()
    }

    fn notify(&self, collection: &str) {
        let targets: Vec<(WatchId, OrderBy, Arc<Mutex<SnapshotListener>>)> = match self.watchers.lock() {
            Ok(registry) => registry
                .watchers
                .iter()
                .filter(|(_, watcher)| watcher.collection == collection)
                .map(|(id, watcher)| (*id, watcher.order.clone(), Arc::clone(&watcher.listener)))
                .collect(),
            Err(_) => {
                warn!("event=store_notify module=store status=error collection={collection} error=watcher_lock_poisoned");
                return;
            }
        };

        for (watch_id, order, listener) in targets {
            let snapshot = self.query(collection, &order);
            deliver(watch_id, &listener, snapshot);
        }
    }
}

fn deliver(
    watch_id: WatchId,
    listener: &Mutex<SnapshotListener>,
    snapshot: StoreResult<Vec<StoredDocument>>,
) {
    match listener.try_lock() {
        Ok(mut callback) => (*callback)(snapshot),
        Err(TryLockError::WouldBlock) => {
            warn!("event=store_notify module=store status=skipped watch_id={watch_id} reason=listener_busy");
        }
        Err(TryLockError::Poisoned(_)) => {
            warn!("event=store_notify module=store status=error watch_id={watch_id} error=listener_poisoned");
        }
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn add(&self, collection: &str, document: Document) -> StoreResult<EntityId> {
        let id = Uuid::new_v4();
        let body = serde_json::to_string(&document)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
                params![collection, id.to_string(), body],
            )?;
            Ok(())
        })?;
        debug!("event=doc_add module=store status=ok collection={collection} id={id}");
        self.notify(collection);
        Ok(id)
    }

    fn update(&self, collection: &str, id: EntityId, patch: &DocumentPatch) -> StoreResult<()> {
        self.with_conn(|conn| {
            let mut document =
                Self::load_body(conn, collection, id)?.ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id,
                })?;
            patch.apply_to(&mut document);
            let body = serde_json::to_string(&document)?;
            conn.execute(
                "UPDATE documents
                 SET
                    body = ?3,
                    written_at = (strftime('%s', 'now') * 1000)
                 WHERE collection = ?1 AND id = ?2;",
                params![collection, id.to_string(), body],
            )?;
            Ok(())
        })?;
        debug!(
            "event=doc_update module=store status=ok collection={collection} id={id} set_fields={} removed_fields={}",
            patch.set.len(),
            patch.remove.len()
        );
        self.notify(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: EntityId) -> StoreResult<()> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection, id.to_string()],
            )?)
        })?;
        debug!("event=doc_delete module=store status=ok collection={collection} id={id} changed={changed}");
        if changed > 0 {
            self.notify(collection);
        }
        Ok(())
    }

    fn query(&self, collection: &str, order: &OrderBy) -> StoreResult<Vec<StoredDocument>> {
        let mut documents = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, body FROM documents WHERE collection = ?1;")?;
            let mut rows = stmt.query([collection])?;
            let mut documents = Vec::new();
            while let Some(row) = rows.next()? {
                let id_text: String = row.get("id")?;
                let id = Uuid::parse_str(&id_text).map_err(|_| {
                    StoreError::InvalidData(format!(
                        "invalid document id `{id_text}` in collection `{collection}`"
                    ))
                })?;
                let body: String = row.get("body")?;
                documents.push(StoredDocument {
                    id,
                    fields: serde_json::from_str(&body)?,
                });
            }
            Ok(documents)
        })?;
        order.sort(&mut documents);
        Ok(documents)
    }

    fn watch(
        &self,
        collection: &str,
        order: OrderBy,
        listener: SnapshotListener,
    ) -> StoreResult<WatchId> {
        let listener = Arc::new(Mutex::new(listener));
        let watch_id = {
            let mut registry = self
                .watchers
                .lock()
                .map_err(|_| StoreError::Unavailable("watcher lock poisoned"))?;
            registry.next_id += 1;
            let watch_id = registry.next_id;
            registry.watchers.insert(
                watch_id,
                Watcher {
                    collection: collection.to_string(),
                    order: order.clone(),
                    listener: Arc::clone(&listener),
                },
            );
            watch_id
        };
        debug!("event=doc_watch module=store status=ok collection={collection} watch_id={watch_id}");

        let snapshot = self.query(collection, &order);
        deliver(watch_id, &listener, snapshot);
        Ok(watch_id)
    }

    fn unwatch(&self, watch_id: WatchId) -> bool {
        let removed = self
            .watchers
            .lock()
            .map(|mut registry| registry.watchers.remove(&watch_id).is_some())
            .unwrap_or(false);
        debug!("event=doc_unwatch module=store status=ok watch_id={watch_id} removed={removed}");
        removed
    }
}
