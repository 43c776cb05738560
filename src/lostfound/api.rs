//! Lost/Found API Endpoints

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::lostfound::models::LostFoundItemView;
use crate::routes::AppState;
use crate::uploads::read_submission;
use crate::users::models::merge_field;

/// Report a lost/found item - POST /api/lostfound
/// Accepts JSON or multipart with an optional `image` file field.
pub async fn create_lost_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    req: Request,
) -> ApiResult<(StatusCode, Json<LostFoundItemView>)> {
    let submission = read_submission(req, &state.uploads, "image").await?;

    let (Some(item_name), Some(description)) =
        (submission.text("itemName"), submission.text("description"))
    else {
        return Err(ApiError::invalid("itemName and description are required"));
    };

    let item = state
        .lostfound
        .create(&user.id, item_name, description, submission.file)?;

    Ok((StatusCode::CREATED, Json(item.created_view())))
}

/// List all items - GET /api/lostfound
pub async fn get_lost_items(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<LostFoundItemView>>> {
    Ok(Json(state.lostfound.list()?))
}

/// Get a single item - GET /api/lostfound/:id
pub async fn get_lost_item_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LostFoundItemView>> {
    let id = parse_id(&id)?;
    let view = state
        .lostfound
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(view))
}

/// Update an item - PUT /api/lostfound/:id
pub async fn update_lost_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    req: Request,
) -> ApiResult<Json<LostFoundItemView>> {
    let id = parse_id(&id)?;
    let submission = read_submission(req, &state.uploads, "image").await?;

    let mut item = state
        .lostfound
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    if item.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to update this item"));
    }

    merge_field(&mut item.item_name, submission.text("itemName"));
    merge_field(&mut item.description, submission.text("description"));
    if let Some(image) = submission.file {
        item.image = Some(image);
    }

    state.lostfound.save(&mut item)?;

    let view = state
        .lostfound
        .get_view(&id)?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(view))
}

/// Delete an item - DELETE /api/lostfound/:id
pub async fn delete_lost_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;

    let item = state
        .lostfound
        .find(&id)?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    if item.user_id != user.id {
        return Err(ApiError::forbidden("Not authorized to delete this item"));
    }

    state.lostfound.delete(&id)?;

    Ok(Json(json!({ "message": "Item removed" })))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Item not found"))
}
