//! # Subscription Tracker Backend
//!
//! HTTP service that keeps track of users' recurring subscriptions, rolls
//! overdue payment dates forward, and reports upcoming payments and spend.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum handlers, validation, DTO mapping)
//!     ↓
//! Domain Layer (services, rollover engine)
//!     ↓
//! Storage Layer (SQLite via sqlx)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::clock::{system_clock, Clock};
use crate::domain::{SubscriptionService, UserService};
use crate::io::rest::{subscription_apis, user_apis};
use crate::storage::DbConnection;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub subscription_service: SubscriptionService,
    clock: Clock,
}

impl AppState {
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self {
            user_service: UserService::new(db.clone(), clock.clone()),
            subscription_service: SubscriptionService::new(db, clock.clone()),
            clock,
        }
    }

    /// The date the services currently consider "today"
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

/// Open the database and wire up the services
pub async fn initialize_backend(database_url: &str) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::init(database_url).await?;

    info!("Setting up application state");
    Ok(AppState::new(db, system_clock()))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/register", post(user_apis::register_user))
        .route("/user/by-id", get(user_apis::get_user_by_id))
        .route("/user/by-name", get(user_apis::get_user_by_name))
        .route("/delete-user/by-id", delete(user_apis::delete_user_by_id))
        .route("/delete-user/by-name", delete(user_apis::delete_user_by_name));

    let subscription_routes = Router::new()
        .route(
            "/subs",
            post(subscription_apis::create_subscription)
                .get(subscription_apis::list_subscriptions)
                .delete(subscription_apis::delete_all_subscriptions),
        )
        .route("/subs/next-payment", get(subscription_apis::get_next_payment))
        .route("/subs/monthly-amount", get(subscription_apis::get_monthly_amount))
        .route("/subs/annual-amount", get(subscription_apis::get_annual_amount))
        .route(
            "/subs/by-category/:category",
            get(subscription_apis::get_subscriptions_by_category),
        )
        .route(
            "/subs/by-id/:sub_id",
            get(subscription_apis::get_subscription_by_id)
                .delete(subscription_apis::delete_subscription_by_id),
        )
        .route(
            "/subs/by-name/:sub_name",
            get(subscription_apis::get_subscription_by_name)
                .delete(subscription_apis::delete_subscription_by_name),
        );

    Router::new()
        .merge(user_routes)
        .merge(subscription_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
