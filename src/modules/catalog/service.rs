use std::sync::Arc;

use bookshop_db::{Blob, BlobInfo, StoreError};
use bookshop_http::AppError;
use futures::TryStreamExt;
use rust_decimal::Decimal;
use thiserror::Error;

use super::models::{validate_price, Book, BookPayload, ValidationErrors};
use super::store::{BookStream, BookStore, ImageStore};

/// Failures surfaced by [`BookService`].
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => {
                let message = errors.to_string();
                let details = errors
                    .0
                    .into_iter()
                    .map(|e| serde_json::json!({ "field": e.field, "error": e.error }))
                    .collect();
                AppError::validation(details, message)
            }
            ServiceError::Store(err) => AppError::internal(err),
        }
    }
}

/// Catalog operations over the book and image stores.
///
/// Each method is a single store call; validation runs before anything is written.
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookStore>,
    images: Arc<dyn ImageStore>,
}

impl BookService {
    pub fn new(books: Arc<dyn BookStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { books, images }
    }

    pub async fn get_all(&self) -> Result<BookStream, ServiceError> {
        Ok(self.books.find_all().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Book>, ServiceError> {
        Ok(self.books.find_by_id(id).await?)
    }

    pub async fn search_by_title(&self, title: &str) -> Result<BookStream, ServiceError> {
        tracing::debug!(title, "searching books by title");
        Ok(self.books.find_by_title(title).await?)
    }

    /// Update only the price of a book
    pub async fn change_price(
        &self,
        id: &str,
        price: Decimal,
    ) -> Result<Option<Book>, ServiceError> {
        let price = validate_price(price)?;
        let updated = self.books.set_price(id, price).await?;
        tracing::debug!(id, %price, found = updated.is_some(), "price change");
        Ok(updated)
    }

    pub async fn create(&self, payload: BookPayload) -> Result<Book, ServiceError> {
        let draft = payload.validate()?;
        let book = self.books.insert(draft).await?;
        tracing::info!(id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Replace every field of an existing book; the id is kept
    pub async fn update(
        &self,
        id: &str,
        payload: BookPayload,
    ) -> Result<Option<Book>, ServiceError> {
        let draft = payload.validate()?;
        let updated = self.books.replace(id, draft).await?;
        tracing::debug!(id, found = updated.is_some(), "book replaced");
        Ok(updated)
    }

    /// Delete a book; `None` when nothing was stored under `id`
    pub async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, ServiceError> {
        let removed = self.books.delete(id).await?;
        if removed.is_some() {
            tracing::info!(id, "book deleted");
        }
        Ok(removed)
    }

    /// Open the image referenced by the book with `id`
    pub async fn get_image(&self, id: &str) -> Result<Option<Blob>, ServiceError> {
        let Some(image_name) = self
            .books
            .find_by_id(id)
            .await?
            .and_then(|book| book.image_name)
        else {
            return Ok(None);
        };

        let blob = self.images.open(&image_name).await?;
        if blob.is_none() {
            tracing::warn!(id, image_name = %image_name, "book references a missing image");
        }
        Ok(blob)
    }

    pub async fn get_images(&self) -> Result<Vec<BlobInfo>, ServiceError> {
        Ok(self.images.list().await?)
    }

    /// The book whose `imageName` equals `filename`
    pub async fn by_image_name(&self, filename: &str) -> Result<Option<Book>, ServiceError> {
        Ok(self.books.find_by_image_name(filename).await?)
    }

    /// Validate and insert a batch of books; nothing is written if any entry is invalid.
    pub async fn seed(&self, payloads: Vec<BookPayload>) -> Result<usize, ServiceError> {
        let drafts = payloads
            .into_iter()
            .map(BookPayload::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let count = drafts.len();
        for draft in drafts {
            self.books.insert(draft).await?;
        }
        Ok(count)
    }
}

/// Drain a book stream into memory.
pub async fn collect_books(stream: BookStream) -> Result<Vec<Book>, ServiceError> {
    Ok(stream.try_collect().await?)
}
