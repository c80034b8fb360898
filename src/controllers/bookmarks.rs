use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::types::{AppState, BookmarkPayload, BookmarkResponse};

/// Ids that are not integers cannot name a stored bookmark.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| AppError::not_found())
}

fn parse_body(
    payload: Result<Json<BookmarkPayload>, JsonRejection>,
) -> Result<BookmarkPayload, AppError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

pub(super) async fn list_bookmarks(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookmarkResponse>>, AppError> {
    let response = state.services.bookmarks.list().await?;
    Ok(Json(response))
}

pub(super) async fn get_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookmarkResponse>, AppError> {
    let id = parse_id(&id)?;
    let response = state.services.bookmarks.get(id).await?;
    Ok(Json(response))
}

pub(super) async fn create_bookmark(
    State(state): State<AppState>,
    payload: Result<Json<BookmarkPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let payload = parse_body(payload)?;
    let response = state.services.bookmarks.create(payload).await?;
    let location = format!("/bookmarks/{}", response.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(response)).into_response())
}

pub(super) async fn update_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookmarkPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state
        .services
        .bookmarks
        .update(id, parse_body(payload))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn delete_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.services.bookmarks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
