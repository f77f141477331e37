//! HTTP handlers for the catalog.
//!
//! Absent resources answer `204 No Content`; errors use the standard error body.

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookshop_db::BlobInfo;
use bookshop_http::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use super::models::{Book, BookPayload};
use super::service::{collect_books, BookService};

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/books", get(list_books))
        .route(
            "/book",
            get(search_by_title).post(create_book).patch(change_price),
        )
        .route(
            "/book/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/book/{id}/image", get(get_book_image))
        .route("/images", get(list_images))
        .route("/image/{filename}", get(get_book_by_image))
        .route("/catalog/health", get(health_check))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceChangeParams {
    pub id: Option<String>,
}

/// `200` with the value, or `204` when there is none
fn found<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health_check() -> &'static str {
    "catalog module is healthy"
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    let books = collect_books(service.get_all().await?).await?;
    Ok(Json(books))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    Ok(found(service.get_by_id(&id).await?))
}

async fn search_by_title(
    State(service): State<BookService>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(params) = query?;
    let title = params
        .search
        .ok_or_else(|| AppError::bad_request("missing query parameter 'search'"))?;

    let books = collect_books(service.search_by_title(&title).await?).await?;
    Ok(Json(books))
}

async fn change_price(
    State(service): State<BookService>,
    query: Result<Query<PriceChangeParams>, QueryRejection>,
    body: Result<Json<Decimal>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(params) = query?;
    let id = params
        .id
        .ok_or_else(|| AppError::bad_request("missing query parameter 'id'"))?;
    let Json(price) = body?;

    Ok(found(service.change_price(&id, price).await?))
}

async fn create_book(
    State(service): State<BookService>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = body?;
    let book = service.create(payload).await?;
    let location = format!("/book/{}", book.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(book),
    )
        .into_response())
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = body?;
    Ok(found(service.update(&id, payload).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    Ok(match service.delete_by_id(&id).await? {
        Some(_) => StatusCode::OK,
        None => StatusCode::NO_CONTENT,
    })
}

async fn get_book_image(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(blob) = service.get_image(&id).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let disposition = format!("inline; filename=\"{}\"", blob.info.filename);
    Ok((
        [
            (header::CONTENT_TYPE, blob.info.content_type),
            (header::CONTENT_LENGTH, blob.info.length.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(blob.file)),
    )
        .into_response())
}

async fn list_images(State(service): State<BookService>) -> Result<Json<Vec<BlobInfo>>, AppError> {
    Ok(Json(service.get_images().await?))
}

async fn get_book_by_image(
    State(service): State<BookService>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    Ok(found(service.by_image_name(&filename).await?))
}
