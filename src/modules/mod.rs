pub mod catalog;

use std::sync::Arc;

use bookshop_db::MemoryCollection;
use bookshop_kernel::{settings::Settings, ModuleRegistry};

use catalog::{models::Book, service::BookService};

/// Build every project module from settings and register it
pub async fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let images = bookshop_db::open_bucket(&settings.store.image_dir).await?;
    let books = MemoryCollection::<Book>::new("books");

    let service = BookService::new(Arc::new(books), Arc::new(images));
    registry.register(catalog::create_module(service));
    Ok(())
}
