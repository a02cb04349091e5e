//! # Domain Module
//!
//! Business rules for users and their recurring subscriptions.
//!
//! Services own the connection pool and the transaction boundary: every public
//! operation opens one transaction, hands it to the storage traits and to the
//! rollover engine, and commits or rolls back as a unit.
//!
//! ## Module Organization
//!
//! - **user_service**: registration, lookup (with optional schedule refresh), cascading delete
//! - **subscription_service**: subscription CRUD, nearest payment, spend totals, category filter
//! - **rollover**: month arithmetic and the bulk / single-step payment-date passes
//! - **clock**: injectable source of "today"
//! - **commands**: internal command and query types
//! - **errors**: `ServiceError`, the failure type of every service call
//! - **models**: domain entities
//!
//! ## Business Rules
//!
//! - User names are globally unique; subscription names are unique per user
//! - A subscription always belongs to exactly one user
//! - Deleting a user deletes its subscriptions first
//! - Listing and querying roll overdue payment dates forward to today
//! - Looking up a single subscription advances it by one month at most

pub mod clock;
pub mod commands;
pub mod errors;
pub mod models;
pub mod rollover;
pub mod subscription_service;
pub mod user_service;

pub use clock::{fixed_clock, system_clock, Clock};
pub use commands::Lookup;
pub use errors::{ServiceError, ServiceResult};
pub use subscription_service::SubscriptionService;
pub use user_service::UserService;
