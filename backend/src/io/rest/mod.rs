//! # REST API Interface Layer
//!
//! HTTP endpoints for users and subscriptions.
//!
//! - **user_apis**: registration, lookup and deletion of users
//! - **subscription_apis**: subscription CRUD and payment queries, all scoped by `?user_id=`
//! - **validation**: request checks that answer 422 before the domain is called
//! - **errors**: `ApiError` and its mapping to status codes
//! - **mappers**: conversions between `shared` DTOs and domain types

pub mod errors;
pub mod mappers;
pub mod subscription_apis;
pub mod user_apis;
pub mod validation;

use serde::Deserialize;

/// `?user_id=` query parameter
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

/// `?name=` query parameter
#[derive(Debug, Deserialize)]
pub struct UserNameQuery {
    pub name: String,
}
