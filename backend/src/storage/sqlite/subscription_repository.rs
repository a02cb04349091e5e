use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::Category;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;

use crate::domain::commands::subscription::CreateSubscriptionCommand;
use crate::domain::models::DomainSubscription;
use crate::storage::traits::{StorageResult, SubscriptionStorage};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, name, cost, next_payment_date, category";

fn subscription_from_row(row: &SqliteRow) -> StorageResult<DomainSubscription> {
    let cost: String = row.try_get("cost")?;
    let cost = Decimal::from_str(&cost).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let category: String = row.try_get("category")?;
    let category = category
        .parse::<Category>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(DomainSubscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        cost,
        next_payment_date: row.try_get("next_payment_date")?,
        category,
    })
}

fn subscriptions_from_rows(rows: &[SqliteRow]) -> StorageResult<Vec<DomainSubscription>> {
    rows.iter().map(subscription_from_row).collect()
}

#[async_trait]
impl SubscriptionStorage for SqliteConnection {
    async fn find_subscription_by_id(
        &mut self,
        user_id: i64,
        subscription_id: i64,
    ) -> StorageResult<Option<DomainSubscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? AND id = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(subscription_id)
        .fetch_optional(&mut *self)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn find_subscription_by_name(
        &mut self,
        user_id: i64,
        name: &str,
    ) -> StorageResult<Option<DomainSubscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? AND name = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *self)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn list_subscriptions(&mut self, user_id: i64) -> StorageResult<Vec<DomainSubscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? ORDER BY id ASC",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *self)
        .await?;

        subscriptions_from_rows(&rows)
    }

    async fn list_subscriptions_by_category(
        &mut self,
        user_id: i64,
        category: Category,
    ) -> StorageResult<Vec<DomainSubscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? AND category = ? ORDER BY id ASC",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(category.as_str())
        .fetch_all(&mut *self)
        .await?;

        subscriptions_from_rows(&rows)
    }

    async fn find_earliest_payment_from(
        &mut self,
        user_id: i64,
        from: NaiveDate,
    ) -> StorageResult<Option<DomainSubscription>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM subscriptions
            WHERE user_id = ? AND next_payment_date >= ?
            ORDER BY next_payment_date ASC, id ASC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(from)
        .fetch_optional(&mut *self)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn insert_subscription(
        &mut self,
        user_id: i64,
        command: &CreateSubscriptionCommand,
    ) -> StorageResult<DomainSubscription> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (name, cost, next_payment_date, category, user_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&command.name)
        .bind(command.cost.to_string())
        .bind(command.next_payment_date)
        .bind(command.category.as_str())
        .bind(user_id)
        .execute(&mut *self)
        .await?;

        Ok(DomainSubscription {
            id: result.last_insert_rowid(),
            user_id,
            name: command.name.clone(),
            cost: command.cost,
            next_payment_date: command.next_payment_date,
            category: command.category,
        })
    }

    async fn update_next_payment_date(
        &mut self,
        subscription_id: i64,
        next_payment_date: NaiveDate,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET next_payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(next_payment_date)
        .bind(subscription_id)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn delete_subscription(&mut self, subscription_id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(subscription_id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_subscriptions(&mut self, user_id: i64) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected())
    }
}
