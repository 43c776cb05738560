//! Authentication Middleware
//! Mission: Resolve a verified identity before any protected handler runs

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::users::models::Role;

/// The acting identity attached to request extensions by `protect`.
/// Deliberately excludes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// Guard for every protected route.
///
/// Missing or non-bearer credentials are rejected 403 before any token work;
/// a present-but-invalid token, or a token whose subject no longer exists,
/// is rejected 401. The distinction is part of the public contract.
pub async fn protect(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let Some(token) = bearer else {
        return Err(ApiError::MissingToken);
    };

    let claims = state.jwt.verify(&token).map_err(|err| {
        tracing::debug!("Token verification failed: {:#}", err);
        ApiError::NotAuthorized("Not authorized: token verification failed".to_string())
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        ApiError::NotAuthorized("Not authorized: token verification failed".to_string())
    })?;

    let user = state
        .users
        .find_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotAuthorized("Not authorized: user not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        role: user.role,
    });

    Ok(next.run(req).await)
}
