use sqlx::SqlitePool;

use crate::database::models::{Admin, Title, TitleAdmin};
use crate::services::permissions::{PermissionGate, Role};

/// Resolves permission questions by loading the facts the gate needs.
#[derive(Clone)]
pub struct AccessControl {
    gate: PermissionGate,
    pool: SqlitePool,
}

impl AccessControl {
    pub fn new(gate: PermissionGate, pool: SqlitePool) -> Self {
        Self { gate, pool }
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn is_super_admin(&self, user_id: i64) -> bool {
        self.gate.is_super_admin(user_id)
    }

    pub async fn role(&self, user_id: i64) -> Result<Role, sqlx::Error> {
        if self.gate.is_super_admin(user_id) {
            return Ok(Role::SuperAdmin);
        }
        let added = Admin::exists(&self.pool, user_id).await?;
        Ok(self.gate.role(user_id, added))
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.role(user_id).await? != Role::User)
    }

    pub async fn can_manage_title(&self, user_id: i64, title: &Title) -> Result<bool, sqlx::Error> {
        if self.gate.is_super_admin(user_id) || title.created_by == user_id {
            return Ok(true);
        }
        let granted = TitleAdmin::is_granted(&self.pool, title.id, user_id).await?;
        let grantees: &[i64] = if granted { &[user_id] } else { &[] };
        Ok(self.gate.can_manage_title(user_id, title.created_by, grantees))
    }

    pub async fn can_manage_title_id(&self, user_id: i64, title_id: i64) -> Result<bool, sqlx::Error> {
        match Title::find_by_id(&self.pool, title_id).await? {
            Some(title) => self.can_manage_title(user_id, &title).await,
            None => Ok(false),
        }
    }

    /// Filters `titles` down to those `user_id` may manage, with one grant lookup.
    pub async fn manageable(&self, user_id: i64, titles: Vec<Title>) -> Result<Vec<Title>, sqlx::Error> {
        if self.gate.is_super_admin(user_id) {
            return Ok(titles);
        }
        let granted = TitleAdmin::title_ids_for_user(&self.pool, user_id).await?;
        Ok(titles
            .into_iter()
            .filter(|t| {
                let grantees: &[i64] = if granted.contains(&t.id) { &[user_id] } else { &[] };
                self.gate.can_manage_title(user_id, t.created_by, grantees)
            })
            .collect())
    }
}
