//! Complaint API Endpoints
//! Mission: Ownership-checked CRUD plus append-only comments

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::complaints::models::{AddCommentRequest, ComplaintView};
use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;
use crate::uploads::read_submission;
use crate::users::models::{merge_field, nonempty};

/// Create a complaint - POST /api/complaints
/// Accepts JSON or multipart with an optional `image` file field.
pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    req: Request,
) -> ApiResult<(StatusCode, Json<ComplaintView>)> {
    let submission = read_submission(req, &state.uploads, "image").await?;

    let (Some(subject), Some(description)) =
        (submission.text("subject"), submission.text("description"))
    else {
        return Err(ApiError::invalid("Subject and description are required"));
    };

    let complaint = state
        .complaints
        .create(&user.id, subject, description, submission.file)?;

    Ok((StatusCode::CREATED, Json(complaint.created_view())))
}

/// List all complaints - GET /api/complaints
pub async fn get_complaints(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ComplaintView>>> {
    Ok(Json(state.complaints.list()?))
}

/// Get a single complaint - GET /api/complaints/:id
pub async fn get_complaint_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ComplaintView>> {
    let id = parse_id(&id)?;
    let view = state
        .complaints
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Complaint not found"))?;
    Ok(Json(view))
}

/// Update a complaint - PUT /api/complaints/:id
/// Only the creator may update; provided non-empty fields overwrite.
pub async fn update_complaint(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    req: Request,
) -> ApiResult<Json<ComplaintView>> {
    let id = parse_id(&id)?;
    let submission = read_submission(req, &state.uploads, "image").await?;

    let mut complaint = state
        .complaints
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Complaint not found"))?;

    if complaint.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to update this complaint"));
    }

    merge_field(&mut complaint.subject, submission.text("subject"));
    merge_field(&mut complaint.description, submission.text("description"));
    if let Some(image) = submission.file {
        complaint.image = Some(image);
    }

    state.complaints.save(&mut complaint)?;

    let view = state
        .complaints
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Complaint not found"))?;
    Ok(Json(view))
}

/// Delete a complaint - DELETE /api/complaints/:id
pub async fn delete_complaint(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;

    let complaint = state
        .complaints
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Complaint not found"))?;

    if complaint.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to delete this complaint"));
    }

    state.complaints.delete(&id)?;

    Ok(Json(json!({ "message": "Complaint removed" })))
}

/// Add a comment - POST /api/complaints/:id/comments
/// Any authenticated user may comment; comments are never removed.
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let id = parse_id(&id)?;

    let Some(text) = nonempty(payload.text) else {
        return Err(ApiError::invalid("Comment text is required"));
    };

    state
        .complaints
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Complaint not found"))?;

    state.complaints.add_comment(&id, &user.id, &user.name, &text)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Comment added" })),
    ))
}

/// Unknown ids and unparseable ids both read as "no such complaint".
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Complaint not found"))
}
