use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::DomainUser;
use crate::storage::traits::{StorageResult, UserStorage};

fn user_from_row(row: &SqliteRow) -> StorageResult<DomainUser> {
    Ok(DomainUser {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl UserStorage for SqliteConnection {
    async fn find_user_by_id(&mut self, user_id: i64) -> StorageResult<Option<DomainUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, name
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_name(&mut self, name: &str) -> StorageResult<Option<DomainUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, name
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&mut self, name: &str) -> StorageResult<DomainUser> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name)
            VALUES (?)
            "#,
        )
        .bind(name)
        .execute(&mut *self)
        .await?;

        Ok(DomainUser {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn delete_user(&mut self, user_id: i64) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = ?
            "#,
        )
        .bind(user_id)
        .execute(&mut *self)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
