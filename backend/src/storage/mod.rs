//! # Storage Module
//!
//! Persistence for users and subscriptions.
//!
//! - **connection**: SQLite pool, schema setup and transaction helpers
//! - **traits**: the storage interface the domain layer is written against
//! - **sqlite**: implementations of those traits for `SqliteConnection`
//!
//! Services open one transaction per operation and hand it to the domain
//! functions; nothing in this module keeps a global session.

pub mod connection;
pub mod sqlite;
pub mod traits;

pub use connection::DbConnection;
pub use traits::{StorageResult, SubscriptionStorage, UserStorage};
