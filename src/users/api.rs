//! User API Endpoints
//! Mission: Registration, login, and profile self-service

use anyhow::Context;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;
use crate::users::models::{
    merge_field, merge_opt_field, nonempty, AuthResponse, LoginRequest, ProfileView,
    RegisterRequest, Role, RoleDetails, UpdateProfileRequest,
};
use crate::users::store::{hash_password, NewUser};

/// Register a new user - POST /api/users/register
///
/// Only the email is required; everything else gets a default, including a
/// temporary password the user is expected to change.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Some(email) = nonempty(payload.email) else {
        return Err(ApiError::invalid("Email is required."));
    };

    if state.users.find_by_email(&email)?.is_some() {
        return Err(ApiError::invalid("User with this email already exists"));
    }

    let role = payload.role.unwrap_or(Role::Student);
    let details = RoleDetails::rebuild(
        role,
        payload.student_details,
        payload.staff_details,
        payload.non_teaching_staff_details,
        None,
    );

    let user = state.users.create(NewUser {
        name: nonempty(payload.name).unwrap_or_else(|| "New User".to_string()),
        email: Some(email),
        phone: nonempty(payload.phone),
        password: payload
            .password
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "tempPassword123".to_string()),
        role,
        details,
    })?;

    let token = state.jwt.issue(&user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.profile(),
            token,
        }),
    ))
}

/// Login - POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = nonempty(payload.email);
    let password = payload.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::invalid("Email and password are required"));
    };

    info!("🔐 Login attempt: {}", email);

    let Some(user) = state.users.find_by_email(&email)? else {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::NotAuthorized("Invalid email or password".to_string()));
    };

    let valid =
        bcrypt::verify(&password, &user.password_hash).context("Failed to verify password")?;
    if !valid {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::NotAuthorized("Invalid email or password".to_string()));
    }

    let token = state.jwt.issue(&user.id)?;

    info!("✅ Login successful: {} ({})", email, user.role.as_str());

    Ok(Json(AuthResponse {
        user: user.profile(),
        token,
    }))
}

/// Confirm the presented token still authenticates - GET /api/users/verify-token
pub async fn verify_token() -> Json<serde_json::Value> {
    Json(json!({ "valid": true }))
}

/// Get own profile - GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileView>> {
    let user = state
        .users
        .find_by_id(&current.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.profile()))
}

/// Update own profile - PUT /api/users/profile
///
/// Provided non-empty fields overwrite; the role-detail variant is rebuilt
/// for the (possibly unchanged) role. A successful update re-authenticates
/// the caller with a fresh token.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut user = state
        .users
        .find_by_id(&current.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    merge_field(&mut user.name, payload.name);
    merge_opt_field(&mut user.email, payload.email);
    merge_opt_field(&mut user.phone, payload.phone);
    merge_opt_field(&mut user.additional_details, payload.additional_details);

    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        user.password_hash = hash_password(&password)?;
    }

    let role = payload.role.unwrap_or(user.role);
    user.details = RoleDetails::rebuild(
        role,
        payload.student_details,
        payload.staff_details,
        payload.non_teaching_staff_details,
        Some(&user.details),
    );
    user.role = role;

    state.users.save(&mut user)?;

    let token = state.jwt.issue(&user.id)?;

    Ok(Json(AuthResponse {
        user: user.profile(),
        token,
    }))
}
