use chrono::Utc;

use crate::bot::commands::admin::{full_name, lookup_chat, NOT_ADMIN};
use crate::bot::context::AppContext;
use crate::bot::{HandlerError, HandlerResult};
use crate::database::models::{AuditLog, DuplicateLinkUsage, Episode, MangaView, UsageLog};
use crate::utils::datetime::{current_month, month_window};
use crate::utils::feedback::Reply;
use crate::utils::logging::log_validation_error;
use crate::utils::text::RULE;
use crate::utils::validation::{display_episode_name, parse_limit, validate_month};

const AUDIT_DEFAULT: i64 = 20;
const AUDIT_MAX: i64 = 200;
const TOP_MANGA_DEFAULT: i64 = 10;
const TOP_MANGA_MAX: i64 = 50;
const DAILY_TOP_USERS: i64 = 10;
const TRACKED_COMMAND: &str = "mangalink";

/// All episodes sharing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub url: String,
    pub count: i64,
    /// `(title name, episode name)` per use.
    pub usages: Vec<(String, String)>,
}

/// Folds query rows into per-URL groups, keeping the row order.
pub fn group_duplicates(rows: Vec<DuplicateLinkUsage>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for row in rows {
        let usage = (row.title_name, row.episode_name);
        match groups.iter_mut().find(|g| g.url == row.url) {
            Some(group) => {
                group.count = row.duplicate_count;
                group.usages.push(usage);
            }
            None => groups.push(DuplicateGroup {
                url: row.url,
                count: row.duplicate_count,
                usages: vec![usage],
            }),
        }
    }
    groups
}

pub fn duplicate_report(groups: &[DuplicateGroup]) -> String {
    let mut lines = vec![
        "🔎 Duplicate Link Report".to_string(),
        RULE.to_string(),
        format!("Duplicate links found: {}", groups.len()),
        String::new(),
    ];
    for (idx, group) in groups.iter().enumerate() {
        lines.push(format!("{}. 🔗 {}", idx + 1, group.url));
        lines.push(format!("   Used: {} time(s)", group.count));
        for (title, episode) in &group.usages {
            lines.push(format!("   - {title} | {}", display_episode_name(episode)));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

async fn ensure_admin(ctx: &AppContext, reply: &Reply, user_id: i64) -> Result<bool, HandlerError> {
    if ctx.access.is_admin(user_id).await? {
        return Ok(true);
    }
    reply.text(NOT_ADMIN).await?;
    Ok(false)
}

/// Parses an optional `[n]` argument, replying with the problem on failure.
async fn limit_arg(
    reply: &Reply,
    command: &str,
    args: &str,
    default: i64,
    max: i64,
    user_id: i64,
) -> Result<Option<i64>, HandlerError> {
    if args.split_whitespace().count() > 1 {
        reply.text(format!("Usage: /{command} [n]")).await?;
        return Ok(None);
    }
    match parse_limit(args, default, max) {
        Ok(limit) => Ok(Some(limit)),
        Err(e) => {
            log_validation_error(command, args, &e.to_string(), user_id);
            reply.text(e.to_string()).await?;
            Ok(None)
        }
    }
}

pub async fn handle_find_duplicate_link(ctx: &AppContext, reply: &Reply, user_id: i64) -> HandlerResult {
    if !ensure_admin(ctx, reply, user_id).await? {
        return Ok(());
    }
    let rows = Episode::duplicate_links(ctx.pool()).await?;
    if rows.is_empty() {
        reply.text("No duplicate links found.").await?;
        return Ok(());
    }
    let groups = group_duplicates(rows);
    reply.long_text(&duplicate_report(&groups)).await?;
    Ok(())
}

pub async fn handle_audit_log(ctx: &AppContext, reply: &Reply, user_id: i64, args: &str) -> HandlerResult {
    if !ensure_admin(ctx, reply, user_id).await? {
        return Ok(());
    }
    let Some(limit) = limit_arg(reply, "auditlog", args, AUDIT_DEFAULT, AUDIT_MAX, user_id).await? else {
        return Ok(());
    };

    let logs = AuditLog::recent(ctx.pool(), limit).await?;
    if logs.is_empty() {
        reply.text("No audit logs yet.").await?;
        return Ok(());
    }

    let mut lines = vec![
        "🧾 Audit Log".to_string(),
        RULE.to_string(),
        format!("Showing latest {} item(s)", logs.len()),
        String::new(),
    ];
    for item in &logs {
        lines.push(format!("[{}] {} by {}", item.created_at, item.action, item.actor_id));
        lines.push(format!("  {}", item.details));
    }
    reply.long_text(&lines.join("\n")).await?;
    Ok(())
}

pub async fn handle_top_manga(ctx: &AppContext, reply: &Reply, user_id: i64, args: &str) -> HandlerResult {
    if !ensure_admin(ctx, reply, user_id).await? {
        return Ok(());
    }
    let Some(limit) = limit_arg(reply, "topmanga", args, TOP_MANGA_DEFAULT, TOP_MANGA_MAX, user_id).await? else {
        return Ok(());
    };

    let rows = MangaView::top_titles(ctx.pool(), limit).await?;
    if rows.is_empty() {
        reply.text("No manga view data yet.").await?;
        return Ok(());
    }

    let mut lines = vec![
        "📈 Top Manga".to_string(),
        RULE.to_string(),
        format!("Showing top {} manga by opens", rows.len()),
        String::new(),
    ];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(format!("{}. {} - {} open(s)", idx + 1, row.title_name, row.view_count));
    }
    reply.long_text(&lines.join("\n")).await?;
    Ok(())
}

pub async fn handle_daily(ctx: &AppContext, reply: &Reply, user_id: i64, args: &str) -> HandlerResult {
    if !ensure_admin(ctx, reply, user_id).await? {
        return Ok(());
    }
    let mut parts = args.split_whitespace();
    let month = match (parts.next(), parts.next()) {
        (None, _) => current_month(Utc::now(), ctx.utc_offset()),
        (Some(candidate), None) => {
            if let Err(e) = validate_month(candidate) {
                log_validation_error("daily", candidate, &e.to_string(), user_id);
                reply.text(e.to_string()).await?;
                return Ok(());
            }
            candidate.to_string()
        }
        (Some(_), Some(_)) => {
            reply.text("Usage: /daily [YYYY-MM]").await?;
            return Ok(());
        }
    };
    let Some((start, end)) = month_window(&month, ctx.utc_offset()) else {
        reply.text("Month format must be YYYY-MM.").await?;
        return Ok(());
    };

    let rows = UsageLog::top_users_between(ctx.pool(), TRACKED_COMMAND, &start, &end, DAILY_TOP_USERS).await?;
    if rows.is_empty() {
        reply.text(format!("No /{TRACKED_COMMAND} usage data for {month}.")).await?;
        return Ok(());
    }

    let mut lines = vec![
        "📊 Monthly Top Users".to_string(),
        RULE.to_string(),
        format!("Month: {month}"),
        String::new(),
    ];
    for (idx, row) in rows.iter().enumerate() {
        let chat = lookup_chat(reply.bot(), row.user_id).await;
        let name = chat.as_ref().and_then(full_name);
        let username = chat.as_ref().and_then(|c| c.username()).map(|u| format!("@{u}"));
        let display = match (name, username) {
            (Some(name), Some(username)) => format!("{name} ({username})"),
            (Some(name), None) => name,
            (None, Some(username)) => username,
            (None, None) => format!("User {}", row.user_id),
        };
        lines.push(format!("{}. {display} - {} command(s)", idx + 1, row.usage_count));
    }
    reply.long_text(&lines.join("\n")).await?;
    Ok(())
}
