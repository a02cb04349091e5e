//! # REST API for Subscriptions
//!
//! Every endpoint is scoped to the user named by `?user_id=`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{Category, NewSubscription, OkResponse};
use tracing::info;

use super::errors::ApiError;
use super::mappers::SubscriptionMapper;
use super::validation::validate_new_subscription;
use super::UserIdQuery;
use crate::domain::commands::Lookup;
use crate::AppState;

/// Create a subscription for the user
pub async fn create_subscription(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    Json(request): Json<NewSubscription>,
) -> impl IntoResponse {
    info!("POST /subs?user_id={} - request: {:?}", query.user_id, request);

    if let Err(e) = validate_new_subscription(&request, state.today()) {
        return e.into_response();
    }

    let command = SubscriptionMapper::to_command(request);
    match state.subscription_service.create_subscription(query.user_id, command).await {
        Ok(sub) => (StatusCode::CREATED, Json(SubscriptionMapper::to_dto(sub))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List all subscriptions of the user
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs?user_id={}", query.user_id);

    match state.subscription_service.list_subscriptions(query.user_id).await {
        Ok(subs) => (StatusCode::OK, Json(SubscriptionMapper::to_dto_list(subs))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List the user's subscriptions of one category
pub async fn get_subscriptions_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/by-category/{}?user_id={}", category, query.user_id);

    let category = match category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => return ApiError::Validation(e.to_string()).into_response(),
    };

    match state
        .subscription_service
        .subscriptions_by_category(query.user_id, category)
        .await
    {
        Ok(subs) => (StatusCode::OK, Json(SubscriptionMapper::to_dto_list(subs))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn get_subscription(state: AppState, user_id: i64, lookup: Lookup) -> Response {
    match state.subscription_service.get_subscription(user_id, lookup).await {
        Ok(sub) => (StatusCode::OK, Json(SubscriptionMapper::to_dto(sub))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get one subscription by id
pub async fn get_subscription_by_id(
    State(state): State<AppState>,
    Path(sub_id): Path<i64>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/by-id/{}?user_id={}", sub_id, query.user_id);
    get_subscription(state, query.user_id, Lookup::ById(sub_id)).await
}

/// Get one subscription by name
pub async fn get_subscription_by_name(
    State(state): State<AppState>,
    Path(sub_name): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/by-name/{}?user_id={}", sub_name, query.user_id);
    get_subscription(state, query.user_id, Lookup::ByName(sub_name)).await
}

/// The subscription that is due next
pub async fn get_next_payment(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/next-payment?user_id={}", query.user_id);

    match state.subscription_service.next_payment(query.user_id).await {
        Ok(sub) => (StatusCode::OK, Json(SubscriptionMapper::to_dto(sub))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Total cost of the user's subscriptions for one month
pub async fn get_monthly_amount(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/monthly-amount?user_id={}", query.user_id);

    match state.subscription_service.monthly_amount(query.user_id).await {
        Ok(amount) => (StatusCode::OK, Json(SubscriptionMapper::to_amount_dto(amount))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Total cost of the user's subscriptions for twelve months
pub async fn get_annual_amount(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("GET /subs/annual-amount?user_id={}", query.user_id);

    match state.subscription_service.annual_amount(query.user_id).await {
        Ok(amount) => (StatusCode::OK, Json(SubscriptionMapper::to_amount_dto(amount))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn delete_subscription(state: AppState, user_id: i64, lookup: Lookup) -> Response {
    match state.subscription_service.delete_subscription(user_id, lookup).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse::default())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Delete one subscription by id
pub async fn delete_subscription_by_id(
    State(state): State<AppState>,
    Path(sub_id): Path<i64>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("DELETE /subs/by-id/{}?user_id={}", sub_id, query.user_id);
    delete_subscription(state, query.user_id, Lookup::ById(sub_id)).await
}

/// Delete one subscription by name
pub async fn delete_subscription_by_name(
    State(state): State<AppState>,
    Path(sub_name): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("DELETE /subs/by-name/{}?user_id={}", sub_name, query.user_id);
    delete_subscription(state, query.user_id, Lookup::ByName(sub_name)).await
}

/// Delete every subscription of the user
pub async fn delete_all_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> impl IntoResponse {
    info!("DELETE /subs?user_id={}", query.user_id);

    match state.subscription_service.delete_all_subscriptions(query.user_id).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse::default())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
