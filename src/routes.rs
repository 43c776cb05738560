//! Router Assembly
//! Mission: Wire public and protected routes around the auth guard

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::auth::{protect, JwtHandler};
use crate::complaints::{api as complaints_api, ComplaintStore};
use crate::events::{api as events_api, EventStore};
use crate::lostfound::{api as lostfound_api, LostFoundStore};
use crate::middleware::request_logging;
use crate::uploads::UploadStore;
use crate::users::{api as users_api, UserStore};

/// Shared application state. Stores are cheap clones over one connection.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub complaints: ComplaintStore,
    pub lostfound: LostFoundStore,
    pub events: EventStore,
    pub jwt: Arc<JwtHandler>,
    pub uploads: UploadStore,
}

/// Create the API router.
///
/// Every route under the protected router passes through `protect` before
/// its handler runs; register and login stay public.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/users/register", post(users_api::register))
        .route("/api/users/login", post(users_api::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/users/verify-token", get(users_api::verify_token))
        .route(
            "/api/users/profile",
            get(users_api::get_profile).put(users_api::update_profile),
        )
        .route(
            "/api/complaints",
            get(complaints_api::get_complaints).post(complaints_api::create_complaint),
        )
        .route(
            "/api/complaints/:id",
            get(complaints_api::get_complaint_by_id)
                .put(complaints_api::update_complaint)
                .delete(complaints_api::delete_complaint),
        )
        .route("/api/complaints/:id/comments", post(complaints_api::add_comment))
        .route(
            "/api/lostfound",
            get(lostfound_api::get_lost_items).post(lostfound_api::create_lost_item),
        )
        .route(
            "/api/lostfound/:id",
            get(lostfound_api::get_lost_item_by_id)
                .put(lostfound_api::update_lost_item)
                .delete(lostfound_api::delete_lost_item),
        )
        .route(
            "/api/events",
            get(events_api::get_events).post(events_api::create_event),
        )
        .route(
            "/api/events/:id",
            get(events_api::get_event_by_id)
                .put(events_api::update_event)
                .delete(events_api::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), protect))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

// ===== Public Handlers =====

async fn root() -> &'static str {
    "🚀 Student Support API is running..."
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
