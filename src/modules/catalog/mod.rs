pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use models::BookPayload;
use service::BookService;

/// Book catalog: CRUD over books plus read access to their images
pub struct CatalogModule {
    service: BookService,
}

impl CatalogModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }

    async fn seed_from(&self, seed_file: &Path) -> anyhow::Result<usize> {
        let raw = tokio::fs::read(seed_file)
            .await
            .with_context(|| format!("failed to read seed file {}", seed_file.display()))?;
        let payloads: Vec<BookPayload> = serde_json::from_slice(&raw)
            .with_context(|| format!("seed file {} is not a JSON array of books", seed_file.display()))?;

        self.service
            .seed(payloads)
            .await
            .with_context(|| format!("seed file {} was rejected", seed_file.display()))
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(seed_file) = &ctx.settings.store.seed_file {
            let count = self.seed_from(seed_file).await?;
            tracing::info!(module = self.name(), count, "catalog seeded");
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let no_content = json!({ "description": "No matching book" });
        let server_error = json!({
            "description": "Store failure",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let validation_error = json!({
            "description": "Payload failed validation",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let book = json!({
            "description": "The book",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let books = json!({
            "description": "Books",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Book" }
                    }
                }
            }
        });
        let payload = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                }
            }
        });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Catalog"],
                        "responses": { "200": books, "500": server_error }
                    }
                },
                "/book": {
                    "get": {
                        "summary": "Search books by exact title",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "search",
                            "in": "query",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": { "200": books, "500": server_error }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Catalog"],
                        "requestBody": payload,
                        "responses": {
                            "201": {
                                "description": "Created; Location points at /book/{id}",
                                "headers": {
                                    "Location": { "schema": { "type": "string" } }
                                },
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "422": validation_error,
                            "500": server_error
                        }
                    },
                    "patch": {
                        "summary": "Change the price of a book",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "id",
                            "in": "query",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "type": ["number", "string"] }
                                }
                            }
                        },
                        "responses": {
                            "200": book,
                            "204": no_content,
                            "422": validation_error,
                            "500": server_error
                        }
                    }
                },
                "/book/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Catalog"],
                        "parameters": [id_param],
                        "responses": { "200": book, "204": no_content, "500": server_error }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Catalog"],
                        "parameters": [id_param],
                        "requestBody": payload,
                        "responses": {
                            "200": book,
                            "204": no_content,
                            "422": validation_error,
                            "500": server_error
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Catalog"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "Deleted" },
                            "204": no_content,
                            "500": server_error
                        }
                    }
                },
                "/book/{id}/image": {
                    "get": {
                        "summary": "Download a book's image",
                        "tags": ["Images"],
                        "parameters": [id_param],
                        "responses": {
                            "200": {
                                "description": "Image bytes",
                                "content": {
                                    "application/octet-stream": {
                                        "schema": { "type": "string", "format": "binary" }
                                    }
                                }
                            },
                            "204": { "description": "No book or no stored image" },
                            "500": server_error
                        }
                    }
                },
                "/images": {
                    "get": {
                        "summary": "List stored images",
                        "tags": ["Images"],
                        "responses": {
                            "200": {
                                "description": "Image descriptors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/ImageInfo" }
                                        }
                                    }
                                }
                            },
                            "500": server_error
                        }
                    }
                },
                "/image/{filename}": {
                    "get": {
                        "summary": "Find the book that owns an image",
                        "tags": ["Images"],
                        "parameters": [{
                            "name": "filename",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": { "200": book, "204": no_content, "500": server_error }
                    }
                },
                "/catalog/health": {
                    "get": {
                        "summary": "Catalog health check",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Server-assigned identifier" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "price": { "type": "string", "description": "Decimal amount, e.g. \"12.50\"" },
                            "imageName": { "type": "string", "description": "Filename of the book's image" }
                        },
                        "required": ["id", "title", "author", "price"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 256 },
                            "author": { "type": "string", "maxLength": 256 },
                            "price": {
                                "type": ["number", "string"],
                                "description": "Non-negative, at most two decimal places"
                            },
                            "imageName": { "type": "string" }
                        },
                        "required": ["title", "author", "price"]
                    },
                    "ImageInfo": {
                        "type": "object",
                        "properties": {
                            "filename": { "type": "string" },
                            "length": { "type": "integer", "format": "int64" },
                            "contentType": { "type": "string" },
                            "modified": { "type": "string", "format": "date-time" }
                        },
                        "required": ["filename", "length", "contentType", "modified"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create the catalog module around its service
pub fn create_module(service: BookService) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(service))
}
