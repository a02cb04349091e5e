//! # SQLite Storage Module
//!
//! `UserStorage` and `SubscriptionStorage` implemented for
//! `sqlx::SqliteConnection`. Pool connections and transactions both deref to
//! it, so the same code runs inside and outside a transaction.

pub mod subscription_repository;
pub mod user_repository;
