use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if it doesn't exist
    pub async fn new(url: &str) -> Result<Self> {
        Self::connect(url, SqlitePoolOptions::new()).await
    }

    /// Initialize the database at the configured URL
    pub async fn init(url: &str) -> Result<Self> {
        info!("Opening database at {}", url);
        Self::new(url).await
    }

    /// Initialize a private in-memory database for tests
    ///
    /// The pool is pinned to one connection that never expires, otherwise the
    /// in-memory database would vanish with the connection that created it.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let options = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect("sqlite::memory:", options).await
    }

    async fn connect(url: &str, pool_options: SqlitePoolOptions) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = pool_options.connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(31) NOT NULL UNIQUE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // cost is a canonical decimal string; category is the enum's wire name
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(63) NOT NULL,
                cost TEXT NOT NULL,
                next_payment_date TEXT NOT NULL,
                category VARCHAR(16) NOT NULL DEFAULT 'OTHER',
                user_id INTEGER NOT NULL,
                UNIQUE (name, user_id),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_subscriptions_user_next_payment
            ON subscriptions(user_id, next_payment_date);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction; every service operation runs inside exactly one
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Commit `tx` if `result` is Ok, otherwise roll it back and return the original error.
    ///
    /// A failed commit surfaces as the error of the whole operation.
    pub async fn finish<T, E>(tx: Transaction<'static, Sqlite>, result: Result<T, E>) -> Result<T, E>
    where
        E: From<sqlx::Error>,
    {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    error!("Rollback failed: {}", rollback_error);
                }
                Err(e)
            }
        }
    }
}
