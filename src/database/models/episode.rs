use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_iso;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub id: i64,
    pub title_id: i64,
    pub name: String,
    pub url: String,
    pub created_by: i64,
    pub created_at: String,
}

/// An episode joined with its title, used by link scans.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EpisodeLink {
    pub episode_id: i64,
    pub title_name: String,
    pub episode_name: String,
    pub url: String,
}

/// One usage of a URL that appears on more than one episode.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DuplicateLinkUsage {
    pub url: String,
    pub title_name: String,
    pub episode_name: String,
    pub duplicate_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TitleUpdateCount {
    pub title_name: String,
    pub added_episodes: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TitleLastUpdate {
    pub title_name: String,
    pub last_update_at: Option<String>,
    pub total_links: i64,
}

const EPISODE_COLUMNS: &str = "id, title_id, name, url, created_by, created_at";

impl Episode {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        name: &str,
        url: &str,
        created_by: i64,
    ) -> Result<i64, sqlx::Error> {
        let now = now_iso();
        let result = sqlx::query(
            r#"
            INSERT INTO episodes (title_id, name, url, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title_id)
        .bind(name)
        .bind(url)
        .bind(created_by)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts already-validated `(name, url)` pairs in one transaction.
    pub async fn create_many(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        entries: &[(String, String)],
        created_by: i64,
    ) -> Result<usize, sqlx::Error> {
        let now = now_iso();
        let mut tx = pool.begin().await?;
        for (name, url) in entries {
            sqlx::query(
                r#"
                INSERT INTO episodes (title_id, name, url, created_by, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(title_id)
            .bind(name)
            .bind(url)
            .bind(created_by)
            .bind(now.as_str())
            .execute(&mut tx)
            .await?;
        }
        tx.commit().await?;
        Ok(entries.len())
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        episode_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Episode>(&format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = ?"
        ))
        .bind(episode_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_title(
        pool: &sqlx::SqlitePool,
        title_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Episode>(&format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes WHERE title_id = ? ORDER BY id ASC"
        ))
        .bind(title_id)
        .fetch_all(pool)
        .await
    }

    pub async fn prev_id(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        episode_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM episodes WHERE title_id = ? AND id < ? ORDER BY id DESC LIMIT 1",
        )
        .bind(title_id)
        .bind(episode_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn next_id(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        episode_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM episodes WHERE title_id = ? AND id > ? ORDER BY id ASC LIMIT 1",
        )
        .bind(title_id)
        .bind(episode_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &sqlx::SqlitePool,
        episode_id: i64,
        name: &str,
        url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE episodes SET name = ?, url = ? WHERE id = ?")
            .bind(name)
            .bind(url)
            .bind(episode_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &sqlx::SqlitePool, episode_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM episodes WHERE id = ?")
            .bind(episode_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM episodes")
            .fetch_one(pool)
            .await
    }

    /// Most recently added links first.
    pub async fn recent_links(
        pool: &sqlx::SqlitePool,
        limit: i64,
    ) -> Result<Vec<EpisodeLink>, sqlx::Error> {
        sqlx::query_as::<_, EpisodeLink>(
            r#"
            SELECT e.id AS episode_id, t.name AS title_name, e.name AS episode_name, e.url AS url
            FROM episodes e
            JOIN titles t ON t.id = e.title_id
            ORDER BY e.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn duplicate_links(
        pool: &sqlx::SqlitePool,
    ) -> Result<Vec<DuplicateLinkUsage>, sqlx::Error> {
        sqlx::query_as::<_, DuplicateLinkUsage>(
            r#"
            SELECT e.url AS url, t.name AS title_name, e.name AS episode_name, d.cnt AS duplicate_count
            FROM episodes e
            JOIN titles t ON t.id = e.title_id
            JOIN (
                SELECT url, COUNT(*) AS cnt FROM episodes GROUP BY url HAVING COUNT(*) > 1
            ) d ON d.url = e.url
            ORDER BY d.cnt DESC, e.url ASC, t.name ASC, e.id ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Episodes added per title since `since_iso` (UTC), busiest title first.
    pub async fn update_counts_since(
        pool: &sqlx::SqlitePool,
        since_iso: &str,
    ) -> Result<Vec<TitleUpdateCount>, sqlx::Error> {
        sqlx::query_as::<_, TitleUpdateCount>(
            r#"
            SELECT t.name AS title_name, COUNT(e.id) AS added_episodes
            FROM episodes e
            JOIN titles t ON t.id = e.title_id
            WHERE e.created_at >= ?
            GROUP BY t.id, t.name
            ORDER BY added_episodes DESC, t.name ASC
            "#,
        )
        .bind(since_iso)
        .fetch_all(pool)
        .await
    }

    pub async fn last_update_for_title(
        pool: &sqlx::SqlitePool,
        title_id: i64,
    ) -> Result<Option<TitleLastUpdate>, sqlx::Error> {
        sqlx::query_as::<_, TitleLastUpdate>(
            r#"
            SELECT t.name AS title_name, MAX(e.created_at) AS last_update_at, COUNT(e.id) AS total_links
            FROM titles t
            LEFT JOIN episodes e ON e.title_id = t.id
            WHERE t.id = ?
            GROUP BY t.id, t.name
            "#,
        )
        .bind(title_id)
        .fetch_optional(pool)
        .await
    }
}
