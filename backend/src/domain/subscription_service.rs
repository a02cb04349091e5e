use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::constants::{MIN_MONTH_COUNT, MONTHS_PER_YEAR};
use shared::Category;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::subscription::{AmountResult, CreateSubscriptionCommand};
use crate::domain::commands::Lookup;
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::DomainSubscription;
use crate::domain::rollover;
use crate::domain::user_service::{require_user, unique_violation_as};
use crate::storage::{DbConnection, SubscriptionStorage, UserStorage};

/// Resolve a subscription of `user_id` or fail with `SubscriptionNotFound`
async fn require_subscription<S>(store: &mut S, user_id: i64, lookup: &Lookup) -> ServiceResult<DomainSubscription>
where
    S: SubscriptionStorage + ?Sized,
{
    let subscription = match lookup {
        Lookup::ById(id) => store.find_subscription_by_id(user_id, *id).await?,
        Lookup::ByName(name) => store.find_subscription_by_name(user_id, name).await?,
    };

    subscription.ok_or_else(|| {
        warn!("Subscription not found for user {}: {}", user_id, lookup);
        ServiceError::SubscriptionNotFound
    })
}

/// Service for subscription CRUD, rollover and spend queries.
///
/// Each public method runs in one transaction which is committed on success and
/// rolled back on any error.
#[derive(Clone)]
pub struct SubscriptionService {
    db: DbConnection,
    clock: Clock,
}

impl SubscriptionService {
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self { db, clock }
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Create a subscription for `user_id`.
    ///
    /// The name check runs before the owner check, so a colliding name reports
    /// `SubNameNotUnique` even when the user does not exist.
    pub async fn create_subscription(
        &self,
        user_id: i64,
        command: CreateSubscriptionCommand,
    ) -> ServiceResult<DomainSubscription> {
        info!("Creating subscription for user {}: {:?}", user_id, command);

        let mut tx = self.db.begin().await?;
        let result = Self::create_subscription_in(&mut *tx, user_id, &command).await;
        let subscription = DbConnection::finish(tx, result).await?;

        info!("Created subscription: {} with ID: {}", subscription.name, subscription.id);
        Ok(subscription)
    }

    async fn create_subscription_in<S>(
        store: &mut S,
        user_id: i64,
        command: &CreateSubscriptionCommand,
    ) -> ServiceResult<DomainSubscription>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        if store.find_subscription_by_name(user_id, &command.name).await?.is_some() {
            return Err(ServiceError::SubNameNotUnique);
        }
        require_user(store, &Lookup::ById(user_id)).await?;

        store
            .insert_subscription(user_id, command)
            .await
            .map_err(|e| unique_violation_as(e, ServiceError::SubNameNotUnique))
    }

    /// All subscriptions of a user after rolling overdue dates forward
    pub async fn list_subscriptions(&self, user_id: i64) -> ServiceResult<Vec<DomainSubscription>> {
        info!("Listing subscriptions for user {}", user_id);

        let today = self.today();
        let mut tx = self.db.begin().await?;
        let result = Self::list_subscriptions_in(&mut *tx, user_id, today).await;
        DbConnection::finish(tx, result).await
    }

    async fn list_subscriptions_in<S>(
        store: &mut S,
        user_id: i64,
        today: NaiveDate,
    ) -> ServiceResult<Vec<DomainSubscription>>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        rollover::refresh_schedule(store, user_id, today).await?;
        Ok(store.list_subscriptions(user_id).await?)
    }

    /// Look up one subscription and advance its date by at most one month.
    ///
    /// Unlike the list and query paths this does not run the bulk pass, so a
    /// subscription overdue by several months stays overdue after one lookup.
    pub async fn get_subscription(&self, user_id: i64, lookup: Lookup) -> ServiceResult<DomainSubscription> {
        info!("Getting subscription for user {}: {}", user_id, lookup);

        let today = self.today();
        let mut tx = self.db.begin().await?;
        let result = Self::get_subscription_in(&mut *tx, user_id, &lookup, today).await;
        DbConnection::finish(tx, result).await
    }

    async fn get_subscription_in<S>(
        store: &mut S,
        user_id: i64,
        lookup: &Lookup,
        today: NaiveDate,
    ) -> ServiceResult<DomainSubscription>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        let subscription = require_subscription(store, user_id, lookup).await?;
        Ok(rollover::step_subscription(store, subscription, today).await?)
    }

    /// The subscription with the nearest payment date that is today or later
    pub async fn next_payment(&self, user_id: i64) -> ServiceResult<DomainSubscription> {
        info!("Getting next payment for user {}", user_id);

        let today = self.today();
        let mut tx = self.db.begin().await?;
        let result = Self::next_payment_in(&mut *tx, user_id, today).await;
        DbConnection::finish(tx, result).await
    }

    async fn next_payment_in<S>(store: &mut S, user_id: i64, today: NaiveDate) -> ServiceResult<DomainSubscription>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        rollover::refresh_schedule(store, user_id, today).await?;
        store
            .find_earliest_payment_from(user_id, today)
            .await?
            .ok_or(ServiceError::UserHasNoSubscriptions)
    }

    /// Sum of all subscription costs of a user. Dates are not rolled here.
    pub async fn monthly_amount(&self, user_id: i64) -> ServiceResult<AmountResult> {
        info!("Counting monthly amount for user {}", user_id);

        let mut tx = self.db.begin().await?;
        let result = Self::monthly_amount_in(&mut *tx, user_id).await;
        DbConnection::finish(tx, result).await
    }

    async fn monthly_amount_in<S>(store: &mut S, user_id: i64) -> ServiceResult<AmountResult>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        let subscriptions = store.list_subscriptions(user_id).await?;
        if subscriptions.is_empty() {
            return Err(ServiceError::UserHasNoSubscriptions);
        }

        let amount = subscriptions
            .iter()
            .try_fold(Decimal::ZERO, |total, s| total.checked_add(s.cost))
            .ok_or(ServiceError::AmountOverflow)?;
        Ok(AmountResult { month_count: MIN_MONTH_COUNT, amount })
    }

    /// Monthly amount times twelve, with the same failures
    pub async fn annual_amount(&self, user_id: i64) -> ServiceResult<AmountResult> {
        let monthly = self.monthly_amount(user_id).await?;
        let amount = monthly
            .amount
            .checked_mul(Decimal::from(MONTHS_PER_YEAR))
            .ok_or(ServiceError::AmountOverflow)?;
        Ok(AmountResult {
            month_count: MONTHS_PER_YEAR,
            amount,
        })
    }

    /// Subscriptions of one category after rolling overdue dates forward.
    /// An empty result is not an error.
    pub async fn subscriptions_by_category(
        &self,
        user_id: i64,
        category: Category,
    ) -> ServiceResult<Vec<DomainSubscription>> {
        info!("Listing {} subscriptions for user {}", category, user_id);

        let today = self.today();
        let mut tx = self.db.begin().await?;
        let result = Self::subscriptions_by_category_in(&mut *tx, user_id, category, today).await;
        DbConnection::finish(tx, result).await
    }

    async fn subscriptions_by_category_in<S>(
        store: &mut S,
        user_id: i64,
        category: Category,
        today: NaiveDate,
    ) -> ServiceResult<Vec<DomainSubscription>>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        rollover::refresh_schedule(store, user_id, today).await?;
        Ok(store.list_subscriptions_by_category(user_id, category).await?)
    }

    /// Delete one subscription of a user
    pub async fn delete_subscription(&self, user_id: i64, lookup: Lookup) -> ServiceResult<()> {
        info!("Deleting subscription for user {}: {}", user_id, lookup);

        let mut tx = self.db.begin().await?;
        let result = Self::delete_subscription_in(&mut *tx, user_id, &lookup).await;
        let deleted = DbConnection::finish(tx, result).await?;

        info!("Deleted subscription: {} with ID: {}", deleted.name, deleted.id);
        Ok(())
    }

    async fn delete_subscription_in<S>(
        store: &mut S,
        user_id: i64,
        lookup: &Lookup,
    ) -> ServiceResult<DomainSubscription>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        let subscription = require_subscription(store, user_id, lookup).await?;
        store.delete_subscription(subscription.id).await?;
        Ok(subscription)
    }

    /// Delete every subscription of a user; succeeds when there are none
    pub async fn delete_all_subscriptions(&self, user_id: i64) -> ServiceResult<()> {
        info!("Deleting all subscriptions for user {}", user_id);

        let mut tx = self.db.begin().await?;
        let result = Self::delete_all_subscriptions_in(&mut *tx, user_id).await;
        let removed = DbConnection::finish(tx, result).await?;

        info!("Deleted {} subscription(s) for user {}", removed, user_id);
        Ok(())
    }

    async fn delete_all_subscriptions_in<S>(store: &mut S, user_id: i64) -> ServiceResult<u64>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        require_user(store, &Lookup::ById(user_id)).await?;
        Ok(store.delete_all_subscriptions(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::fixed_clock;
    use crate::domain::user_service::UserService;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    async fn setup_test() -> (DbConnection, UserService, SubscriptionService) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let clock = fixed_clock(today());
        let users = UserService::new(db.clone(), clock.clone());
        let subs = SubscriptionService::new(db.clone(), clock);
        (db, users, subs)
    }

    fn command(name: &str, cost: Decimal, next: NaiveDate, category: Category) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            name: name.to_string(),
            cost,
            next_payment_date: next,
            category,
        }
    }

    async fn stored_date(db: &DbConnection, user_id: i64, name: &str) -> NaiveDate {
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        conn.find_subscription_by_name(user_id, name)
            .await
            .expect("Query failed")
            .expect("Subscription should exist")
            .next_payment_date
    }

    #[tokio::test]
    async fn test_create_and_list_subscriptions() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("alice").await.expect("Failed to create user");

        let created = subs
            .create_subscription(user.id, command("Netflix", dec!(15.49), date(2025, 7, 1), Category::Streaming))
            .await
            .expect("Failed to create subscription");
        assert_eq!(created.user_id, user.id);
        assert_eq!(created.cost, dec!(15.49));
        assert_eq!(created.category, Category::Streaming);

        let listed = subs.list_subscriptions(user.id).await.expect("Failed to list");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_per_user() {
        let (_db, users, subs) = setup_test().await;
        let alice = users.create_user("alice").await.expect("Failed to create user");
        let bob = users.create_user("bob").await.expect("Failed to create user");

        subs.create_subscription(alice.id, command("Spotify", dec!(9.99), date(2025, 7, 1), Category::Music))
            .await
            .expect("Failed to create subscription");

        let err = subs
            .create_subscription(alice.id, command("Spotify", dec!(1), date(2025, 8, 1), Category::Other))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SubNameNotUnique));

        // The same name under another user is fine
        subs.create_subscription(bob.id, command("Spotify", dec!(9.99), date(2025, 7, 1), Category::Music))
            .await
            .expect("Name should be unique per user only");
    }

    #[tokio::test]
    async fn test_create_for_missing_user() {
        let (_db, _users, subs) = setup_test().await;

        let err = subs
            .create_subscription(404, command("Gym", dec!(30), date(2025, 7, 1), Category::Fitness))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn test_operations_on_missing_user() {
        let (_db, _users, subs) = setup_test().await;

        assert!(matches!(subs.list_subscriptions(9).await, Err(ServiceError::UserNotFound)));
        assert!(matches!(subs.next_payment(9).await, Err(ServiceError::UserNotFound)));
        assert!(matches!(subs.monthly_amount(9).await, Err(ServiceError::UserNotFound)));
        assert!(matches!(subs.annual_amount(9).await, Err(ServiceError::UserNotFound)));
        assert!(matches!(
            subs.subscriptions_by_category(9, Category::Music).await,
            Err(ServiceError::UserNotFound)
        ));
        assert!(matches!(
            subs.get_subscription(9, Lookup::ById(1)).await,
            Err(ServiceError::UserNotFound)
        ));
        assert!(matches!(subs.delete_all_subscriptions(9).await, Err(ServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_list_rolls_overdue_dates() {
        let (db, users, subs) = setup_test().await;
        let user = users.create_user("carol").await.expect("Failed to create user");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        conn.insert_subscription(user.id, &command("Old", dec!(3), date(2025, 2, 10), Category::Other))
            .await
            .expect("Insert failed");
        drop(conn);

        let listed = subs.list_subscriptions(user.id).await.expect("Failed to list");
        assert_eq!(listed[0].next_payment_date, date(2025, 7, 10));
        assert_eq!(stored_date(&db, user.id, "Old").await, date(2025, 7, 10));
    }

    #[tokio::test]
    async fn test_amounts() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("dave").await.expect("Failed to create user");
        for (name, cost) in [("a", dec!(9.99)), ("b", dec!(15.00)), ("c", dec!(4.50))] {
            subs.create_subscription(user.id, command(name, cost, date(2025, 7, 1), Category::Other))
                .await
                .expect("Failed to create subscription");
        }

        let monthly = subs.monthly_amount(user.id).await.expect("Monthly failed");
        assert_eq!(monthly, AmountResult { month_count: 1, amount: dec!(29.49) });

        let annual = subs.annual_amount(user.id).await.expect("Annual failed");
        assert_eq!(annual, AmountResult { month_count: 12, amount: dec!(353.88) });
    }

    #[tokio::test]
    async fn test_amounts_without_subscriptions() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("erin").await.expect("Failed to create user");

        assert!(matches!(
            subs.monthly_amount(user.id).await,
            Err(ServiceError::UserHasNoSubscriptions)
        ));
        assert!(matches!(
            subs.annual_amount(user.id).await,
            Err(ServiceError::UserHasNoSubscriptions)
        ));
    }

    #[tokio::test]
    async fn test_amounts_that_do_not_fit_a_decimal() {
        let (db, users, subs) = setup_test().await;
        let annual_only = users.create_user("olga").await.expect("Failed to create user");
        let both = users.create_user("pete").await.expect("Failed to create user");

        // Stored directly, as the request validator would refuse these costs
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        conn.insert_subscription(
            annual_only.id,
            &command("Huge", dec!(10000000000000000000000000000), date(2025, 7, 1), Category::Other),
        )
        .await
        .expect("Insert failed");
        for name in ["left", "right"] {
            conn.insert_subscription(
                both.id,
                &command(name, dec!(50000000000000000000000000000), date(2025, 7, 1), Category::Other),
            )
            .await
            .expect("Insert failed");
        }
        drop(conn);

        let monthly = subs.monthly_amount(annual_only.id).await.expect("Monthly should fit");
        assert_eq!(monthly.amount, dec!(10000000000000000000000000000));
        assert!(matches!(
            subs.annual_amount(annual_only.id).await,
            Err(ServiceError::AmountOverflow)
        ));

        assert!(matches!(subs.monthly_amount(both.id).await, Err(ServiceError::AmountOverflow)));
        assert!(matches!(subs.annual_amount(both.id).await, Err(ServiceError::AmountOverflow)));
    }

    #[tokio::test]
    async fn test_name_collision_reported_before_missing_user() {
        let (db, _users, subs) = setup_test().await;

        // Leave a subscription behind for an owner that does not exist
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(db.pool())
            .await
            .expect("Failed to disable foreign keys");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        conn.insert_subscription(999, &command("Orphan", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Insert failed");
        drop(conn);

        let err = subs
            .create_subscription(999, command("Orphan", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SubNameNotUnique));

        let err = subs
            .create_subscription(999, command("Fresh", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn test_next_payment_picks_nearest_after_rollover() {
        let (db, users, subs) = setup_test().await;
        let user = users.create_user("frank").await.expect("Failed to create user");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        for (name, offset) in [("overdue", -5), ("soon", 3), ("later", 10)] {
            let next = today() + Duration::days(offset);
            conn.insert_subscription(user.id, &command(name, dec!(1), next, Category::Other))
                .await
                .expect("Insert failed");
        }
        drop(conn);

        let next = subs.next_payment(user.id).await.expect("Next payment failed");
        assert_eq!(next.name, "soon");
        assert_eq!(next.next_payment_date, date(2025, 6, 18));

        // Jun 10 rolled to Jul 10
        assert_eq!(stored_date(&db, user.id, "overdue").await, date(2025, 7, 10));
    }

    #[tokio::test]
    async fn test_next_payment_ties_break_on_lowest_id() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("gina").await.expect("Failed to create user");
        let first = subs
            .create_subscription(user.id, command("first", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Failed to create subscription");
        subs.create_subscription(user.id, command("second", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Failed to create subscription");

        let next = subs.next_payment(user.id).await.expect("Next payment failed");
        assert_eq!(next.id, first.id);
    }

    #[tokio::test]
    async fn test_next_payment_without_subscriptions() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("hank").await.expect("Failed to create user");

        let err = subs.next_payment(user.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserHasNoSubscriptions));
    }

    #[tokio::test]
    async fn test_subscriptions_by_category() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("iris").await.expect("Failed to create user");
        subs.create_subscription(user.id, command("Spotify", dec!(9.99), date(2025, 7, 1), Category::Music))
            .await
            .expect("Failed to create subscription");
        subs.create_subscription(user.id, command("Netflix", dec!(15), date(2025, 7, 2), Category::Streaming))
            .await
            .expect("Failed to create subscription");

        let music = subs
            .subscriptions_by_category(user.id, Category::Music)
            .await
            .expect("Category query failed");
        assert_eq!(music.len(), 1);
        assert_eq!(music[0].name, "Spotify");

        let gaming = subs
            .subscriptions_by_category(user.id, Category::Gaming)
            .await
            .expect("Empty category should not fail");
        assert!(gaming.is_empty());
    }

    #[tokio::test]
    async fn test_get_subscription_steps_single_month() {
        let (db, users, subs) = setup_test().await;
        let user = users.create_user("jack").await.expect("Failed to create user");
        let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
        let inserted = conn
            .insert_subscription(user.id, &command("Stale", dec!(2), date(2025, 2, 10), Category::Other))
            .await
            .expect("Insert failed");
        drop(conn);

        let first = subs
            .get_subscription(user.id, Lookup::ById(inserted.id))
            .await
            .expect("Lookup failed");
        assert_eq!(first.next_payment_date, date(2025, 3, 10));

        let second = subs
            .get_subscription(user.id, Lookup::ByName("Stale".to_string()))
            .await
            .expect("Lookup failed");
        assert_eq!(second.next_payment_date, date(2025, 4, 10));
        assert!(second.is_overdue(today()));
    }

    #[tokio::test]
    async fn test_get_subscription_of_other_user() {
        let (_db, users, subs) = setup_test().await;
        let owner = users.create_user("kate").await.expect("Failed to create user");
        let other = users.create_user("liam").await.expect("Failed to create user");
        let sub = subs
            .create_subscription(owner.id, command("Private", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Failed to create subscription");

        let err = subs.get_subscription(other.id, Lookup::ById(sub.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::SubscriptionNotFound));

        let err = subs
            .delete_subscription(other.id, Lookup::ByName("Private".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SubscriptionNotFound));
    }

    #[tokio::test]
    async fn test_delete_subscription() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("mia").await.expect("Failed to create user");
        let a = subs
            .create_subscription(user.id, command("a", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Failed to create subscription");
        subs.create_subscription(user.id, command("b", dec!(1), date(2025, 7, 1), Category::Other))
            .await
            .expect("Failed to create subscription");

        subs.delete_subscription(user.id, Lookup::ById(a.id)).await.expect("Delete by id failed");
        subs.delete_subscription(user.id, Lookup::ByName("b".to_string()))
            .await
            .expect("Delete by name failed");

        assert!(subs.list_subscriptions(user.id).await.expect("Failed to list").is_empty());
        let err = subs.delete_subscription(user.id, Lookup::ById(a.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::SubscriptionNotFound));
    }

    #[tokio::test]
    async fn test_delete_all_subscriptions() {
        let (_db, users, subs) = setup_test().await;
        let user = users.create_user("noah").await.expect("Failed to create user");

        // Nothing to delete is still a success
        subs.delete_all_subscriptions(user.id).await.expect("Delete all failed");

        for name in ["x", "y", "z"] {
            subs.create_subscription(user.id, command(name, dec!(1), date(2025, 7, 1), Category::Other))
                .await
                .expect("Failed to create subscription");
        }
        subs.delete_all_subscriptions(user.id).await.expect("Delete all failed");
        assert!(subs.list_subscriptions(user.id).await.expect("Failed to list").is_empty());
    }
}
