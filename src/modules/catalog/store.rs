//! Storage contracts the catalog consumes, with the backends that satisfy them.

use async_trait::async_trait;
use bookshop_db::{Blob, BlobInfo, FsBucket, MemoryCollection, StoreError};
use futures::stream::{BoxStream, StreamExt};
use rust_decimal::Decimal;

use super::models::{Book, BookDraft};

/// Lazily produced query results.
pub type BookStream = BoxStream<'static, Result<Book, StoreError>>;

/// Document store holding catalog records.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_all(&self) -> Result<BookStream, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Books whose title equals `title` exactly
    async fn find_by_title(&self, title: &str) -> Result<BookStream, StoreError>;

    async fn find_by_image_name(&self, image_name: &str) -> Result<Option<Book>, StoreError>;

    /// Persist a new book under a store-assigned id
    async fn insert(&self, draft: BookDraft) -> Result<Book, StoreError>;

    /// Overwrite every field except the id
    async fn replace(&self, id: &str, draft: BookDraft) -> Result<Option<Book>, StoreError>;

    async fn set_price(&self, id: &str, price: Decimal) -> Result<Option<Book>, StoreError>;

    /// Remove a book, returning its last state
    async fn delete(&self, id: &str) -> Result<Option<Book>, StoreError>;
}

/// Read-only blob store holding book images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn open(&self, filename: &str) -> Result<Option<Blob>, StoreError>;

    async fn list(&self) -> Result<Vec<BlobInfo>, StoreError>;
}

#[async_trait]
impl BookStore for MemoryCollection<Book> {
    async fn find_all(&self) -> Result<BookStream, StoreError> {
        Ok(self.all().await.map(Ok).boxed())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.get(id).await)
    }

    async fn find_by_title(&self, title: &str) -> Result<BookStream, StoreError> {
        let matches = self.find(|book| book.title == title).await;
        Ok(matches.map(Ok).boxed())
    }

    async fn find_by_image_name(&self, image_name: &str) -> Result<Option<Book>, StoreError> {
        Ok(self
            .find_one(|book| book.image_name.as_deref() == Some(image_name))
            .await)
    }

    async fn insert(&self, draft: BookDraft) -> Result<Book, StoreError> {
        Ok(self.insert_with(|id| draft.into_book(id)).await)
    }

    async fn replace(&self, id: &str, draft: BookDraft) -> Result<Option<Book>, StoreError> {
        Ok(self
            .update(id, |book| *book = draft.into_book(book.id.clone()))
            .await)
    }

    async fn set_price(&self, id: &str, price: Decimal) -> Result<Option<Book>, StoreError> {
        Ok(self.update(id, |book| book.price = price).await)
    }

    async fn delete(&self, id: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.remove(id).await)
    }
}

#[async_trait]
impl ImageStore for FsBucket {
    async fn open(&self, filename: &str) -> Result<Option<Blob>, StoreError> {
        FsBucket::open(self, filename).await
    }

    async fn list(&self) -> Result<Vec<BlobInfo>, StoreError> {
        FsBucket::list(self).await
    }
}
