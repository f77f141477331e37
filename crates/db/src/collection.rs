//! In-memory document collection.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A record stored in a [`MemoryCollection`].
pub trait Document: Clone + Send + Sync + 'static {
    /// Server-assigned identifier.
    fn id(&self) -> &str;
}

/// Stream of documents produced by a query.
pub type DocumentStream<T> = BoxStream<'static, T>;

/// Insertion-ordered document collection shared behind an async lock.
///
/// Each call takes the lock once and releases it before returning; query results are
/// snapshots, so a stream never observes writes made after it was produced.
pub struct MemoryCollection<T> {
    name: &'static str,
    documents: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for MemoryCollection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<T: Document> MemoryCollection<T> {
    /// Create an empty collection
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Collection name, used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Insert a document built from a freshly assigned id.
    pub async fn insert_with<F>(&self, build: F) -> T
    where
        F: FnOnce(String) -> T,
    {
        let document = build(Uuid::now_v7().to_string());
        self.documents.write().await.push(document.clone());
        tracing::debug!(
            target: "bookshop-db",
            collection = self.name,
            id = document.id(),
            "document inserted"
        );
        document
    }

    /// Fetch a document by id
    pub async fn get(&self, id: &str) -> Option<T> {
        self.documents
            .read()
            .await
            .iter()
            .find(|document| document.id() == id)
            .cloned()
    }

    /// First document matching `predicate`
    pub async fn find_one<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.documents
            .read()
            .await
            .iter()
            .find(|document| predicate(*document))
            .cloned()
    }

    /// Every document matching `predicate`, in insertion order
    pub async fn find<P>(&self, predicate: P) -> DocumentStream<T>
    where
        P: Fn(&T) -> bool,
    {
        let matches: Vec<T> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| predicate(*document))
            .cloned()
            .collect();
        stream::iter(matches).boxed()
    }

    /// Every document, in insertion order
    pub async fn all(&self) -> DocumentStream<T> {
        self.find(|_| true).await
    }

    /// Apply `change` to the document with `id` and return its new state.
    ///
    /// The id is restored after `change` runs, so callers cannot reassign it.
    pub async fn update<F>(&self, id: &str, change: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut documents = self.documents.write().await;
        let slot = documents.iter_mut().find(|document| document.id() == id)?;
        let before = slot.clone();
        change(&mut *slot);
        if slot.id() != before.id() {
            *slot = before;
            tracing::warn!(
                target: "bookshop-db",
                collection = self.name,
                id,
                "update attempted to change document id; discarded"
            );
            return None;
        }
        Some(slot.clone())
    }

    /// Remove a document and return its last state
    pub async fn remove(&self, id: &str) -> Option<T> {
        let mut documents = self.documents.write().await;
        let index = documents.iter().position(|document| document.id() == id)?;
        let removed = documents.remove(index);
        tracing::debug!(
            target: "bookshop-db",
            collection = self.name,
            id,
            "document removed"
        );
        Some(removed)
    }
}
