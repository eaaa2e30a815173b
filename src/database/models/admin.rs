use std::collections::HashSet;

use crate::utils::datetime::now_iso;

/// Globally added admins, stored alongside the configured super admins.
pub struct Admin;

impl Admin {
    /// Returns `false` when the user already was an admin.
    pub async fn add(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT OR IGNORE INTO admins (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(now_iso())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admins WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, i64>("SELECT user_id FROM admins WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn list_ids(pool: &sqlx::SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM admins ORDER BY user_id ASC")
            .fetch_all(pool)
            .await
    }
}

/// Per-title management grants.
pub struct TitleAdmin;

impl TitleAdmin {
    /// Returns `false` when the grant already existed.
    pub async fn grant(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO title_admins (title_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(title_id)
        .bind(user_id)
        .bind(now_iso())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM title_admins WHERE title_id = ? AND user_id = ?")
            .bind(title_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_granted(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM title_admins WHERE title_id = ? AND user_id = ?",
        )
        .bind(title_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    pub async fn user_ids_for_title(
        pool: &sqlx::SqlitePool,
        title_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM title_admins WHERE title_id = ? ORDER BY user_id ASC",
        )
        .bind(title_id)
        .fetch_all(pool)
        .await
    }

    pub async fn title_ids_for_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<HashSet<i64>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT title_id FROM title_admins WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(ids.into_iter().collect())
    }
}
