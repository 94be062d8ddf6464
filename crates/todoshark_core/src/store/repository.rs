//! Per-entity repositories over a shared document store.
//!
//! # Responsibility
//! - Provide typed create/update/delete/list/subscribe per entity kind.
//! - Own the subscription lifecycle (`Subscription` unwatches on drop).
//!
//! # Invariants
//! - Each subscription callback receives the complete current collection.
//! - A snapshot that fails to decode is reported through `on_error` and is
//!   never delivered partially.

use crate::model::EntityId;
use crate::store::codec::DocumentEntity;
use crate::store::document::OrderBy;
use crate::store::document_store::{DocumentStore, WatchId};
use crate::store::{StoreError, StoreResult};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, Weak};

/// Repository interface for one entity kind.
pub trait CollectionRepository<E: DocumentEntity> {
    /// Writes a new entity and returns its store-assigned id.
    fn create(&self, draft: &E::Draft) -> StoreResult<EntityId>;
    /// Applies a partial update; unset patch fields are left untouched.
    fn update(&self, id: EntityId, patch: &E::Patch) -> StoreResult<()>;
    fn delete(&self, id: EntityId) -> StoreResult<()>;
    fn list(&self, order: &OrderBy) -> StoreResult<Vec<E>>;
    /// Registers full-snapshot callbacks. The returned handle unsubscribes on drop.
    fn subscribe(
        &self,
        order: OrderBy,
        on_change: Box<dyn FnMut(Vec<E>) + Send>,
        on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription>;

    fn list_default(&self) -> StoreResult<Vec<E>> {
        self.list(&E::default_order())
    }

    /// Looks up one entity by id in the current collection.
    fn find(&self, id: EntityId) -> StoreResult<Option<E>> {
        Ok(self
            .list_default()?
            .into_iter()
            .find(|entity| entity.entity_id() == id))
    }
}

/// Document-store backed repository for entity kind `E`.
pub struct DocumentRepository<E> {
    store: Arc<dyn DocumentStore>,
    _kind: PhantomData<fn() -> E>,
}

impl<E> Clone for DocumentRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

impl<E: DocumentEntity> DocumentRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    fn decode_all(documents: &[crate::store::document::StoredDocument]) -> StoreResult<Vec<E>> {
        documents.iter().map(E::decode).collect()
    }
}

impl<E: DocumentEntity> CollectionRepository<E> for DocumentRepository<E> {
    fn create(&self, draft: &E::Draft) -> StoreResult<EntityId> {
        self.store.add(E::COLLECTION, E::encode_draft(draft))
    }

    fn update(&self, id: EntityId, patch: &E::Patch) -> StoreResult<()> {
        self.store.update(E::COLLECTION, id, &E::encode_patch(patch))
    }

    fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.store.delete(E::COLLECTION, id)
    }

    fn list(&self, order: &OrderBy) -> StoreResult<Vec<E>> {
        let documents = self.store.query(E::COLLECTION, order)?;
        Self::decode_all(&documents)
    }

    fn subscribe(
        &self,
        order: OrderBy,
        mut on_change: Box<dyn FnMut(Vec<E>) + Send>,
        mut on_error: Box<dyn FnMut(StoreError) + Send>,
    ) -> StoreResult<Subscription> {
        let watch_id = self.store.watch(
            E::COLLECTION,
            order,
            Box::new(move |snapshot| match snapshot.and_then(|docs| Self::decode_all(&docs)) {
                Ok(entities) => on_change(entities),
                Err(err) => on_error(err),
            }),
        )?;
        Ok(Subscription {
            store: Arc::downgrade(&self.store),
            watch_id,
            active: true,
        })
    }
}

/// Live snapshot listener registration.
///
/// Dropping the handle unsubscribes; leaking it keeps the listener alive.
pub struct Subscription {
    store: Weak<dyn DocumentStore>,
    watch_id: WatchId,
    active: bool,
}

impl Subscription {
    pub fn watch_id(&self) -> WatchId {
        self.watch_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops snapshot delivery. Idempotent.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(store) = self.store.upgrade() {
            store.unwatch(self.watch_id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// View-side state fed by one subscription: `{items, loading, error}`.
///
/// `loading` is true until the first snapshot or error arrives. A snapshot
/// clears any previous error; an error keeps the last good items.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotState<E> {
    pub items: Vec<E>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<E> Default for SnapshotState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<E> SnapshotState<E> {
    pub fn apply_snapshot(&mut self, items: Vec<E>) {
        self.items = items;
        self.loading = false;
        self.error = None;
    }

    pub fn apply_error(&mut self, error: &StoreError) {
        self.loading = false;
        self.error = Some(error.to_string());
    }
}

/// Subscribes `repo` into a shared [`SnapshotState`] cell.
///
/// Returns the cell together with the subscription keeping it fed.
pub fn subscribe_state<E, R>(
    repo: &R,
    order: OrderBy,
) -> StoreResult<(Arc<Mutex<SnapshotState<E>>>, Subscription)>
where
    E: DocumentEntity,
    R: CollectionRepository<E>,
{
    let state = Arc::new(Mutex::new(SnapshotState::default()));
    let on_change_state = Arc::clone(&state);
    let on_error_state = Arc::clone(&state);
    let subscription = repo.subscribe(
        order,
        Box::new(move |items| {
            if let Ok(mut state) = on_change_state.lock() {
                state.apply_snapshot(items);
            }
        }),
        Box::new(move |err| {
            log::error!(
                "event=snapshot module=store status=error collection={} error={}",
                E::COLLECTION,
                err
            );
            if let Ok(mut state) = on_error_state.lock() {
                state.apply_error(&err);
            }
        }),
    )?;
    Ok((state, subscription))
}
