//! In-memory implementation of the store collections.
//!
//! # Purpose
//! Each [`Collection`] holds its documents in a `Vec` guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is delegated elsewhere
//!
//! # Atomicity
//! Every operation takes the collection lock for its full critical section,
//! so each listed primitive is atomic at the collection level. There is no
//! cross-collection transaction; multi-document flows (schema-removal
//! cascade, producer create with station auto-create) are explicitly
//! non-transactional and handled by their callers.
//!
//! # Filters
//! Queries take plain predicate closures over the document type. Uniqueness
//! is expressed by the predicate handed to `upsert_set_on_insert`: the match
//! key is whatever the closure matches on.
//!
//! # Performance characteristics
//! Reads clone matching documents; writes are serialized per collection.
//! Linear scans are acceptable at control-plane cardinalities.
use super::StoreResult;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Typed handle over one document collection.
///
/// Cloning the handle shares the underlying data, so the `Db` can be cheaply
/// threaded through request handlers and background tasks.
#[derive(Debug)]
pub struct Collection<T> {
    name: &'static str,
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Clone + Send + Sync> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn insert_one(&self, doc: T) -> StoreResult<()> {
        let mut rows = self.rows.write().await;
        rows.push(doc);
        self.record_size(rows.len());
        Ok(())
    }

    pub async fn find_one(&self, pred: impl Fn(&T) -> bool) -> StoreResult<Option<T>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| pred(row)).cloned())
    }

    pub async fn find_many_sorted<K: Ord>(
        &self,
        pred: impl Fn(&T) -> bool,
        key: impl Fn(&T) -> K,
        order: SortOrder,
    ) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<T> = rows.iter().filter(|row| pred(row)).cloned().collect();
        matched.sort_by_key(|row| key(row));
        if order == SortOrder::Descending {
            matched.reverse();
        }
        Ok(matched)
    }

    /// Apply `update` to the first matching document. Returns whether a
    /// document matched.
    pub async fn update_one(
        &self,
        pred: impl Fn(&T) -> bool,
        update: impl Fn(&mut T),
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| pred(row)) {
            Some(row) => {
                update(row);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply `update` to every matching document. Returns the matched count.
    pub async fn update_many(
        &self,
        pred: impl Fn(&T) -> bool,
        update: impl Fn(&mut T),
    ) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        let mut updated = 0u64;
        for row in rows.iter_mut().filter(|row| pred(row)) {
            update(row);
            updated += 1;
        }
        Ok(updated)
    }

    /// Insert `doc` only when nothing matches `pred`; a matched document is
    /// left untouched. Returns whether the insert happened.
    pub async fn upsert_set_on_insert(
        &self,
        pred: impl Fn(&T) -> bool,
        doc: T,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| pred(row)) {
            return Ok(false);
        }
        rows.push(doc);
        self.record_size(rows.len());
        Ok(true)
    }

    /// Atomic read-modify-write: returns the prior document when one matched.
    pub async fn find_one_and_update(
        &self,
        pred: impl Fn(&T) -> bool,
        update: impl Fn(&mut T),
    ) -> StoreResult<Option<T>> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| pred(row)) {
            Some(row) => {
                let prior = row.clone();
                update(row);
                Ok(Some(prior))
            }
            None => Ok(None),
        }
    }

    pub async fn count(&self, pred: impl Fn(&T) -> bool) -> StoreResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| pred(row)).count() as u64)
    }

    pub async fn delete_many(&self, pred: impl Fn(&T) -> bool) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !pred(row));
        let deleted = (before - rows.len()) as u64;
        self.record_size(rows.len());
        Ok(deleted)
    }

    /// Run a read pipeline over a consistent snapshot of the collection.
    pub async fn aggregate<R>(&self, pipeline: impl FnOnce(&[T]) -> R) -> StoreResult<R> {
        let rows = self.rows.read().await;
        Ok(pipeline(&rows))
    }

    fn record_size(&self, len: usize) {
        metrics::gauge!("store_collection_documents", "collection" => self.name).set(len as f64);
    }
}
