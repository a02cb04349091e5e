//! # Storage Traits
//!
//! The persistence handle the domain layer works against. Both traits are
//! implemented for `sqlx::SqliteConnection`, so a transaction opened by a
//! service is passed straight into the engine as `&mut *tx` and every read and
//! write of one operation shares that transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::Category;

use crate::domain::commands::subscription::CreateSubscriptionCommand;
use crate::domain::models::{DomainSubscription, DomainUser};

pub type StorageResult<T> = Result<T, sqlx::Error>;

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send {
    /// Retrieve a user by ID
    async fn find_user_by_id(&mut self, user_id: i64) -> StorageResult<Option<DomainUser>>;

    /// Retrieve a user by its unique name
    async fn find_user_by_name(&mut self, name: &str) -> StorageResult<Option<DomainUser>>;

    /// Store a new user and return it with its assigned ID
    async fn insert_user(&mut self, name: &str) -> StorageResult<DomainUser>;

    /// Delete a user row only; subscriptions must be removed first
    /// Returns true if the user was found and deleted
    async fn delete_user(&mut self, user_id: i64) -> StorageResult<bool>;
}

/// Trait defining the interface for subscription storage operations
///
/// Every lookup is scoped to the owning user.
#[async_trait]
pub trait SubscriptionStorage: Send {
    async fn find_subscription_by_id(
        &mut self,
        user_id: i64,
        subscription_id: i64,
    ) -> StorageResult<Option<DomainSubscription>>;

    async fn find_subscription_by_name(
        &mut self,
        user_id: i64,
        name: &str,
    ) -> StorageResult<Option<DomainSubscription>>;

    /// All subscriptions of a user ordered by ID
    async fn list_subscriptions(&mut self, user_id: i64) -> StorageResult<Vec<DomainSubscription>>;

    /// Subscriptions of a user in one category, ordered by ID
    async fn list_subscriptions_by_category(
        &mut self,
        user_id: i64,
        category: Category,
    ) -> StorageResult<Vec<DomainSubscription>>;

    /// The subscription with the earliest payment date on or after `from`
    /// Ties are broken by the lowest ID
    async fn find_earliest_payment_from(
        &mut self,
        user_id: i64,
        from: NaiveDate,
    ) -> StorageResult<Option<DomainSubscription>>;

    /// Store a new subscription for `user_id` and return it with its assigned ID
    async fn insert_subscription(
        &mut self,
        user_id: i64,
        command: &CreateSubscriptionCommand,
    ) -> StorageResult<DomainSubscription>;

    async fn update_next_payment_date(
        &mut self,
        subscription_id: i64,
        next_payment_date: NaiveDate,
    ) -> StorageResult<()>;

    /// Returns true if the subscription was found and deleted
    async fn delete_subscription(&mut self, subscription_id: i64) -> StorageResult<bool>;

    /// Returns the number of subscriptions deleted
    async fn delete_all_subscriptions(&mut self, user_id: i64) -> StorageResult<u64>;
}
