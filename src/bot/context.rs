use std::sync::Arc;

use sqlx::SqlitePool;
use teloxide::prelude::*;

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::AuditLog;
use crate::services::access::AccessControl;
use crate::services::auto_delete::AutoDeleteService;
use crate::services::link_probe::LinkProber;
use crate::utils::feedback::Reply;
use crate::utils::logging::log_database_error;

/// Everything a handler needs besides the update itself.
#[derive(Clone)]
pub struct AppContext {
    pub db: DatabaseManager,
    pub access: AccessControl,
    pub prober: LinkProber,
    pub cleaner: AutoDeleteService,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn reply(&self, bot: &Bot, chat_id: ChatId, auto_delete: bool) -> Reply {
        Reply::new(bot.clone(), chat_id, self.cleaner.clone(), auto_delete)
    }

    pub fn utc_offset(&self) -> i32 {
        self.config.report_utc_offset_hours
    }

    /// Appends to the audit log. A failed write is logged, never surfaced.
    pub async fn audit(&self, actor_id: i64, action: &str, details: String) {
        if let Err(e) = AuditLog::record(self.pool(), actor_id, action, &details).await {
            log_database_error("INSERT", "audit_logs", &e.to_string(), Some(action));
        }
    }
}
