use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_iso;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub actor_id: i64,
    pub action: String,
    pub details: String,
    pub created_at: String,
}

impl AuditLog {
    pub async fn record(
        pool: &sqlx::SqlitePool,
        actor_id: i64,
        action: &str,
        details: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO audit_logs (actor_id, action, details, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(actor_id)
        .bind(action)
        .bind(details)
        .bind(now_iso())
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Newest entries first.
    pub async fn recent(pool: &sqlx::SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            "SELECT id, actor_id, action, details, created_at FROM audit_logs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserUsage {
    pub user_id: i64,
    pub usage_count: i64,
}

pub struct UsageLog;

impl UsageLog {
    pub async fn record(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        command: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO usage_logs (user_id, command, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(command)
            .bind(now_iso())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Heaviest users of `command` with `start <= created_at < end`.
    pub async fn top_users_between(
        pool: &sqlx::SqlitePool,
        command: &str,
        start_iso: &str,
        end_iso: &str,
        limit: i64,
    ) -> Result<Vec<UserUsage>, sqlx::Error> {
        sqlx::query_as::<_, UserUsage>(
            r#"
            SELECT user_id, COUNT(*) AS usage_count
            FROM usage_logs
            WHERE command = ? AND created_at >= ? AND created_at < ?
            GROUP BY user_id
            ORDER BY usage_count DESC, user_id ASC
            LIMIT ?
            "#,
        )
        .bind(command)
        .bind(start_iso)
        .bind(end_iso)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TitleViews {
    pub title_name: String,
    pub view_count: i64,
}

pub struct MangaView;

impl MangaView {
    pub async fn record(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO manga_views (title_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(title_id)
            .bind(user_id)
            .bind(now_iso())
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn top_titles(
        pool: &sqlx::SqlitePool,
        limit: i64,
    ) -> Result<Vec<TitleViews>, sqlx::Error> {
        sqlx::query_as::<_, TitleViews>(
            r#"
            SELECT t.name AS title_name, COUNT(v.id) AS view_count
            FROM manga_views v
            JOIN titles t ON t.id = v.title_id
            GROUP BY t.id, t.name
            ORDER BY view_count DESC, t.name ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
