use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{CreateNoteParams, DeleteNoteParams, ErrorResponse, MessageResponse, NoteResponse},
    error::ApiError,
    service::NoteService,
};

pub const USAGE: &str = "
GET request to /api/note to get all the latest notes
GET request to /api/note/id to get a specific note
POST request to /api/note to put a new note
DELETE request to /api/note to delete a specific note
";

#[derive(OpenApi)]
#[openapi(
    paths(get_recent_notes, get_note, create_note, delete_note),
    components(schemas(NoteResponse, MessageResponse, ErrorResponse)),
    tags(
        (name = "notes", description = "Notes vault API")
    )
)]
pub struct ApiDoc;

fn query_rejected(rejection: &QueryRejection) -> ApiError {
    ApiError::invalid_request("Failed to convert parameter", rejection.body_text())
}

fn path_rejected(rejection: &PathRejection) -> ApiError {
    ApiError::invalid_request("Failed to convert parameter", rejection.body_text())
}

/// Parses a note id, accepting only positive integers.
fn parse_note_id(raw: &str) -> Result<i64, ApiError> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| ApiError::invalid_request("Failed to convert parameter", e))?;

    if id <= 0 {
        return Err(ApiError::invalid_request(
            "Failed to convert parameter",
            format!("note id must be positive, got {id}"),
        ));
    }

    Ok(id)
}

#[debug_handler]
pub async fn usage() -> Response {
    (StatusCode::OK, USAGE).into_response()
}

#[utoipa::path(
    get,
    path = "/api/note",
    responses(
        (status = 200, description = "Latest notes, newest first", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_recent_notes(State(service): State<Arc<NoteService>>) -> Result<Response, ApiError> {
    let notes = service
        .get_recent_notes()
        .await
        .map_err(|e| ApiError::from_service("Failed to get all notes", e))?;

    Ok((StatusCode::OK, Json(notes)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/note/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Notes with the given ID, possibly empty", body = Vec<NoteResponse>),
        (status = 400, description = "ID is not a positive integer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_note(
    State(service): State<Arc<NoteService>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(raw_id) = raw_id.map_err(|e| path_rejected(&e))?;
    let id = parse_note_id(&raw_id)?;

    let notes = service
        .get_note(id)
        .await
        .map_err(|e| ApiError::from_service(format!("Failed to get note with id of {id}"), e))?;

    Ok((StatusCode::OK, Json(notes)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/note",
    params(CreateNoteParams),
    responses(
        (status = 200, description = "Note created successfully", body = MessageResponse),
        (status = 400, description = "Author or content missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    params: Result<Query<CreateNoteParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| query_rejected(&e))?;

    service
        .create_note(params)
        .await
        .map_err(|e| ApiError::from_service("failed to add a new note", e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Note Created"))).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/note",
    params(DeleteNoteParams),
    responses(
        (status = 200, description = "Note deleted, or no note had that ID", body = MessageResponse),
        (status = 400, description = "ID missing or not a positive integer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    params: Result<Query<DeleteNoteParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| query_rejected(&e))?;
    let raw_id = params.id.ok_or_else(|| {
        ApiError::invalid_request("Failed to convert parameter", "missing id query parameter")
    })?;
    let id = parse_note_id(&raw_id)?;

    service
        .delete_note(id)
        .await
        .map_err(|e| ApiError::from_service(format!("Failed to delete note with id of {id}"), e))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new(format!(
            "Note of ID {id} has been deleted"
        ))),
    )
        .into_response())
}
