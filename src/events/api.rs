//! Event API Endpoints

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::events::models::{parse_event_date, EventView, UpdateEventRequest};
use crate::routes::AppState;
use crate::uploads::read_submission;
use crate::users::models::{merge_field, merge_opt_field, nonempty};

/// Create an event - POST /api/events
/// Accepts JSON or multipart with an optional `poster` file field.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    req: Request,
) -> ApiResult<(StatusCode, Json<EventView>)> {
    let submission = read_submission(req, &state.uploads, "poster").await?;

    let (Some(title), Some(date), Some(venue)) = (
        submission.text("title"),
        submission.text("date"),
        submission.text("venue"),
    ) else {
        return Err(ApiError::invalid("Title, date, and venue are required"));
    };

    let Some(date) = parse_event_date(&date) else {
        return Err(ApiError::invalid("Invalid date format"));
    };

    let event = state.events.create(
        &user.id,
        title,
        submission.text("description"),
        submission.file,
        date,
        venue,
    )?;

    Ok((StatusCode::CREATED, Json(event.created_view())))
}

/// List all events - GET /api/events
/// Ordered by event date descending.
pub async fn get_events(State(state): State<AppState>) -> ApiResult<Json<Vec<EventView>>> {
    Ok(Json(state.events.list()?))
}

/// Get a single event - GET /api/events/:id
pub async fn get_event_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventView>> {
    let id = parse_id(&id)?;
    let view = state
        .events
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(Json(view))
}

/// Update an event - PUT /api/events/:id
/// JSON-only; there is no poster file replacement on update.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> ApiResult<Json<EventView>> {
    let id = parse_id(&id)?;

    let mut event = state
        .events
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if event.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to update this event"));
    }

    merge_field(&mut event.title, payload.title);
    merge_opt_field(&mut event.description, payload.description);
    merge_opt_field(&mut event.poster, payload.poster);
    merge_field(&mut event.venue, payload.venue);

    if let Some(date) = nonempty(payload.date) {
        let Some(date) = parse_event_date(&date) else {
            return Err(ApiError::invalid("Invalid date format"));
        };
        event.date = date;
    }

    state.events.save(&mut event)?;

    let view = state
        .events
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(Json(view))
}

/// Delete an event - DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;

    let event = state
        .events
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if event.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to delete this event"));
    }

    state.events.delete(&id)?;

    Ok(Json(json!({ "message": "Event removed" })))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Event not found"))
}
