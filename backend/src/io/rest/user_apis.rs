//! # REST API for User Management
//!
//! Endpoints for registering, retrieving and deleting users.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{NewUser, OkResponse};
use tracing::info;

use super::errors::ApiError;
use super::mappers::UserMapper;
use super::validation::validate_new_user;
use super::{UserIdQuery, UserNameQuery};
use crate::domain::commands::user::GetUserQuery;
use crate::domain::commands::Lookup;
use crate::AppState;

/// Register a new user
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> impl IntoResponse {
    info!("POST /register - request: {:?}", request);

    if let Err(e) = validate_new_user(&request) {
        return e.into_response();
    }

    match state.user_service.create_user(&request.name).await {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn get_user(state: AppState, user_id: Option<i64>, name: Option<String>) -> axum::response::Response {
    // Fetching a user also brings its payment schedule up to date
    let query = GetUserQuery {
        user_id,
        name,
        refresh_schedule: true,
    };

    match state.user_service.get_user(query).await {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get a user by id
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /user/by-id - query: {:?}", query);
    get_user(state, Some(query.user_id), None).await
}

/// Get a user by name
pub async fn get_user_by_name(
    State(state): State<AppState>,
    Query(query): Query<UserNameQuery>,
) -> impl IntoResponse {
    info!("GET /user/by-name - query: {:?}", query);
    get_user(state, None, Some(query.name)).await
}

async fn delete_user(state: AppState, lookup: Lookup) -> axum::response::Response {
    match state.user_service.delete_user(lookup).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse::default())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Delete a user by id, together with its subscriptions
pub async fn delete_user_by_id(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("DELETE /delete-user/by-id - query: {:?}", query);
    delete_user(state, Lookup::ById(query.user_id)).await
}

/// Delete a user by name, together with its subscriptions
pub async fn delete_user_by_name(
    State(state): State<AppState>,
    Query(query): Query<UserNameQuery>,
) -> impl IntoResponse {
    info!("DELETE /delete-user/by-name - query: {:?}", query);
    delete_user(state, Lookup::ByName(query.name)).await
}
