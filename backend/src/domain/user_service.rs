use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::user::GetUserQuery;
use crate::domain::commands::Lookup;
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::DomainUser;
use crate::domain::rollover;
use crate::storage::{DbConnection, SubscriptionStorage, UserStorage};

/// Resolve `lookup` to a user or fail with `UserNotFound`
pub(crate) async fn require_user<S>(store: &mut S, lookup: &Lookup) -> ServiceResult<DomainUser>
where
    S: UserStorage + ?Sized,
{
    let user = match lookup {
        Lookup::ById(id) => store.find_user_by_id(*id).await?,
        Lookup::ByName(name) => store.find_user_by_name(name).await?,
    };

    user.ok_or_else(|| {
        warn!("User not found: {}", lookup);
        ServiceError::UserNotFound
    })
}

/// Map a UNIQUE constraint violation to `conflict`, everything else to `Storage`
pub(crate) fn unique_violation_as(err: sqlx::Error, conflict: ServiceError) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => conflict,
        _ => ServiceError::Storage(err),
    }
}

/// Service for registering, fetching and deleting users
#[derive(Clone)]
pub struct UserService {
    db: DbConnection,
    clock: Clock,
}

impl UserService {
    pub fn new(db: DbConnection, clock: Clock) -> Self {
        Self { db, clock }
    }

    /// Register a new user
    pub async fn create_user(&self, name: &str) -> ServiceResult<DomainUser> {
        info!("Creating user: name={}", name);

        let mut tx = self.db.begin().await?;
        let result = Self::create_user_in(&mut *tx, name).await;
        let user = DbConnection::finish(tx, result).await?;

        info!("Created user: {} with ID: {}", user.name, user.id);
        Ok(user)
    }

    async fn create_user_in<S>(store: &mut S, name: &str) -> ServiceResult<DomainUser>
    where
        S: UserStorage + ?Sized,
    {
        if store.find_user_by_name(name).await?.is_some() {
            return Err(ServiceError::UsernameNotUnique);
        }

        store
            .insert_user(name)
            .await
            .map_err(|e| unique_violation_as(e, ServiceError::UsernameNotUnique))
    }

    /// Fetch a user by id or name, optionally rolling its overdue subscriptions
    /// forward first. Fails with `MissingIdentifier` when neither is given.
    pub async fn get_user(&self, query: GetUserQuery) -> ServiceResult<DomainUser> {
        let lookup = Lookup::from_parts(query.user_id, query.name)?;
        info!("Getting user: {} (refresh_schedule={})", lookup, query.refresh_schedule);

        let today = (self.clock)();
        let mut tx = self.db.begin().await?;
        let result = Self::get_user_in(&mut *tx, &lookup, query.refresh_schedule, today).await;
        DbConnection::finish(tx, result).await
    }

    async fn get_user_in<S>(
        store: &mut S,
        lookup: &Lookup,
        refresh_schedule: bool,
        today: chrono::NaiveDate,
    ) -> ServiceResult<DomainUser>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        let user = require_user(store, lookup).await?;
        if refresh_schedule {
            rollover::refresh_schedule(store, user.id, today).await?;
        }
        Ok(user)
    }

    /// Delete a user together with all of its subscriptions
    pub async fn delete_user(&self, lookup: Lookup) -> ServiceResult<()> {
        info!("Deleting user: {}", lookup);

        let mut tx = self.db.begin().await?;
        let result = Self::delete_user_in(&mut *tx, &lookup).await;
        let (user, removed) = DbConnection::finish(tx, result).await?;

        info!(
            "Deleted user: {} with ID: {} and {} subscription(s)",
            user.name, user.id, removed
        );
        Ok(())
    }

    async fn delete_user_in<S>(store: &mut S, lookup: &Lookup) -> ServiceResult<(DomainUser, u64)>
    where
        S: UserStorage + SubscriptionStorage + ?Sized,
    {
        let user = require_user(store, lookup).await?;

        // Children first, then the parent row
        let removed = store.delete_all_subscriptions(user.id).await?;
        store.delete_user(user.id).await?;

        Ok((user, removed))
    }
}
