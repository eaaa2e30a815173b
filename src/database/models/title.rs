use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_iso;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub created_by: i64,
    pub created_at: String,
}

/// Outcome of renaming a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    NotFound,
    NameTaken,
}

impl Title {
    /// Inserts a new title. Returns `None` when the name is already taken and no row was created.
    pub async fn create(
        pool: &sqlx::SqlitePool,
        name: &str,
        created_by: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let now = now_iso();
        let result = sqlx::query(
            "INSERT OR IGNORE INTO titles (name, created_by, created_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(created_by)
        .bind(now)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(result.last_insert_rowid()))
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        title_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Title>(
            "SELECT id, name, created_by, created_at FROM titles WHERE id = ?",
        )
        .bind(title_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(
        pool: &sqlx::SqlitePool,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Title>(
            "SELECT id, name, created_by, created_at FROM titles WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Title>(
            "SELECT id, name, created_by, created_at FROM titles ORDER BY name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Case-insensitive substring search, in name order.
    ///
    /// SQLite's `LIKE` only folds ASCII, so matching happens here instead.
    pub async fn search(pool: &sqlx::SqlitePool, keyword: &str) -> Result<Vec<Self>, sqlx::Error> {
        let titles = Self::list_all(pool).await?;
        Ok(filter_by_keyword(titles, keyword))
    }

    pub async fn rename(
        pool: &sqlx::SqlitePool,
        title_id: i64,
        new_name: &str,
    ) -> Result<RenameOutcome, sqlx::Error> {
        if let Some(existing) = Self::find_by_name(pool, new_name).await? {
            if existing.id != title_id {
                return Ok(RenameOutcome::NameTaken);
            }
        }

        let result = sqlx::query("UPDATE titles SET name = ? WHERE id = ?")
            .bind(new_name)
            .bind(title_id)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            Ok(RenameOutcome::Renamed)
        } else {
            Ok(RenameOutcome::NotFound)
        }
    }

    /// Deletes the title; episodes, grants and view rows go with it.
    pub async fn delete(pool: &sqlx::SqlitePool, title_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = ?")
            .bind(title_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM titles")
            .fetch_one(pool)
            .await
    }
}

/// Keeps titles whose name contains `keyword`, ignoring case.
pub fn filter_by_keyword(titles: Vec<Title>, keyword: &str) -> Vec<Title> {
    let needle = keyword.trim().to_lowercase();
    titles
        .into_iter()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .collect()
}

/// Result of resolving a free-text title argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    Found(Title),
    NotFound,
    Ambiguous(Vec<Title>),
}

/// Picks an exact (case-insensitive) match first, then a unique substring match.
pub fn pick_title(matches: Vec<Title>, raw: &str) -> TitleMatch {
    let wanted = raw.trim().to_lowercase();
    if matches.is_empty() {
        return TitleMatch::NotFound;
    }
    if let Some(exact) = matches.iter().find(|t| t.name.to_lowercase() == wanted) {
        return TitleMatch::Found(exact.clone());
    }
    if matches.len() == 1 {
        return matches
            .into_iter()
            .next()
            .map_or(TitleMatch::NotFound, TitleMatch::Found);
    }
    TitleMatch::Ambiguous(matches)
}
