use teloxide::prelude::*;
use teloxide::types::{Chat, Recipient};

use crate::bot::commands::resolve_title;
use crate::bot::context::AppContext;
use crate::bot::keyboards::{self, TITLE_PAGE_SIZE};
use crate::bot::HandlerResult;
use crate::database::models::{Admin, Episode, Title, TitleAdmin};
use crate::utils::feedback::Reply;
use crate::utils::logging::{log_command_success, log_permission_denied, log_validation_error};
use crate::utils::validation::{parse_grant_args, parse_user_id, parse_user_ref, UserRef};

pub const NOT_ADMIN: &str = "You are not an admin.";

const ADD_GRANT_USAGE: &str = "Usage: /addmangaadmin <manga title> | <user_id or @username>\n\
                               Example: /addmangaadmin One Piece | 123456789";
const REMOVE_GRANT_USAGE: &str = "Usage: /removemangaadmin <manga title> | <user_id or @username>\n\
                                  Example: /removemangaadmin One Piece | 123456789";

/// Joins first and last name of a private chat, or falls back to a group title.
pub fn full_name(chat: &Chat) -> Option<String> {
    let parts: Vec<&str> = [chat.first_name(), chat.last_name()]
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();
    if parts.is_empty() {
        return chat.title().map(str::to_string);
    }
    Some(parts.join(" ").trim().to_string())
}

/// Looks a user up by id. Users who never talked to the bot are not visible.
pub async fn lookup_chat(bot: &Bot, user_id: i64) -> Option<Chat> {
    match bot.get_chat(ChatId(user_id)).await {
        Ok(chat) => Some(chat),
        Err(e) => {
            tracing::debug!("Could not look up user {}: {}", user_id, e);
            None
        }
    }
}

async fn resolve_user(bot: &Bot, raw: &str) -> Option<i64> {
    match parse_user_ref(raw)? {
        UserRef::Id(id) => Some(id),
        UserRef::Username(name) => match bot.get_chat(Recipient::ChannelUsername(name.clone())).await {
            Ok(chat) => Some(chat.id.0),
            Err(e) => {
                tracing::debug!("Could not resolve {}: {}", name, e);
                None
            }
        },
    }
}

pub async fn handle_admin_panel(ctx: &AppContext, reply: &Reply, user_id: i64) -> HandlerResult {
    if !ctx.access.gate().has_super_admins() {
        reply.text("Admin list is empty. Set ADMIN_IDS in .env").await?;
        return Ok(());
    }
    if !ctx.access.is_admin(user_id).await? {
        log_permission_denied("mangaadmin", user_id, None);
        reply.text(NOT_ADMIN).await?;
        return Ok(());
    }
    reply.markup(admin_panel_text(ctx).await?, keyboards::admin_panel()).await?;
    Ok(())
}

pub async fn admin_panel_text(ctx: &AppContext) -> Result<String, sqlx::Error> {
    let titles = Title::count(ctx.pool()).await?;
    let episodes = Episode::count(ctx.pool()).await?;
    Ok(format!("Admin panel\nManga: {titles} | Episodes: {episodes}"))
}

pub async fn handle_search_by_admin(
    ctx: &AppContext,
    reply: &Reply,
    user_id: i64,
    query: &str,
) -> HandlerResult {
    if !ctx.access.is_admin(user_id).await? {
        reply.text(NOT_ADMIN).await?;
        return Ok(());
    }
    let query = query.trim();
    if query.is_empty() {
        reply.text("Usage: /searchbyadmin <keyword>").await?;
        return Ok(());
    }
    if Title::count(ctx.pool()).await? == 0 {
        reply.text("No manga yet.").await?;
        return Ok(());
    }

    let found = Title::search(ctx.pool(), query).await?;
    let matched = ctx.access.manageable(user_id, found).await?;
    if matched.is_empty() {
        reply.text(format!("No manageable manga found for: {query}")).await?;
        return Ok(());
    }

    let shown = &matched[..matched.len().min(TITLE_PAGE_SIZE)];
    let mut text = format!("Manageable results for '{query}' ({} found):", matched.len());
    if matched.len() > TITLE_PAGE_SIZE {
        text.push_str(&format!(
            "\nShowing first {TITLE_PAGE_SIZE}. Refine your keyword for fewer results."
        ));
    }
    reply.markup(text, keyboards::admin_title_results(shown)).await?;
    Ok(())
}

pub async fn handle_add_admin(ctx: &AppContext, reply: &Reply, actor_id: i64, args: &str) -> HandlerResult {
    if !ctx.access.gate().can_manage_admins(actor_id) {
        log_permission_denied("addadmin", actor_id, None);
        reply.text("Only main admins can add admins.").await?;
        return Ok(());
    }
    let Some(raw) = args.split_whitespace().next() else {
        reply.text("Usage: /addadmin <user_id>").await?;
        return Ok(());
    };
    let user_id = match parse_user_id(raw) {
        Ok(id) => id,
        Err(e) => {
            log_validation_error("addadmin", raw, &e.to_string(), actor_id);
            reply.text(e.to_string()).await?;
            return Ok(());
        }
    };
    if ctx.access.is_super_admin(user_id) {
        reply.text("That user is already a main admin.").await?;
        return Ok(());
    }

    if Admin::add(ctx.pool(), user_id).await? {
        ctx.audit(actor_id, "add_admin", format!("user_id={user_id}")).await;
        log_command_success("addadmin", actor_id, Some(&user_id.to_string()));
        reply.text(format!("Admin added: {user_id}")).await?;
    } else {
        reply.text("Admin already exists.").await?;
    }
    Ok(())
}

pub async fn handle_remove_admin(ctx: &AppContext, reply: &Reply, actor_id: i64, args: &str) -> HandlerResult {
    if !ctx.access.gate().can_manage_admins(actor_id) {
        log_permission_denied("removeadmin", actor_id, None);
        reply.text("Only main admins can remove admins.").await?;
        return Ok(());
    }
    let Some(raw) = args.split_whitespace().next() else {
        reply.text("Usage: /removeadmin <user_id>").await?;
        return Ok(());
    };
    let user_id = match parse_user_id(raw) {
        Ok(id) => id,
        Err(e) => {
            log_validation_error("removeadmin", raw, &e.to_string(), actor_id);
            reply.text(e.to_string()).await?;
            return Ok(());
        }
    };
    if ctx.access.is_super_admin(user_id) {
        reply.text("You cannot remove a main admin from .env.").await?;
        return Ok(());
    }

    if Admin::remove(ctx.pool(), user_id).await? {
        ctx.audit(actor_id, "remove_admin", format!("user_id={user_id}")).await;
        reply.text(format!("Admin removed: {user_id}")).await?;
    } else {
        reply.text("Admin not found.").await?;
    }
    Ok(())
}

pub async fn handle_add_manga_admin(ctx: &AppContext, reply: &Reply, actor_id: i64, args: &str) -> HandlerResult {
    if !ctx.access.gate().can_manage_admins(actor_id) {
        log_permission_denied("addmangaadmin", actor_id, None);
        reply.text("Only main admins can add manga admins.").await?;
        return Ok(());
    }
    let Some((title_name, user_arg)) = parse_grant_args(args) else {
        reply.text(ADD_GRANT_USAGE).await?;
        return Ok(());
    };
    let Some(title) = resolve_title(ctx, reply, &title_name).await? else {
        return Ok(());
    };
    let Some(user_id) = resolve_user(reply.bot(), &user_arg).await else {
        reply.text("Invalid user. Use numeric user ID or @username.").await?;
        return Ok(());
    };
    if ctx.access.is_super_admin(user_id) {
        reply.text("That user is a main admin and already has full access.").await?;
        return Ok(());
    }
    if !Admin::exists(ctx.pool(), user_id).await? {
        reply.text("That user is not an added admin. Use /addadmin first.").await?;
        return Ok(());
    }

    if TitleAdmin::grant(ctx.pool(), title.id, user_id).await? {
        ctx.audit(
            actor_id,
            "add_manga_admin",
            format!("title_id={}, user_id={user_id}", title.id),
        )
        .await;
        reply
            .text(format!("Added manga admin {user_id} for '{}'.", title.name))
            .await?;
    } else {
        reply
            .text(format!("User {user_id} already manages '{}'.", title.name))
            .await?;
    }
    Ok(())
}

pub async fn handle_remove_manga_admin(
    ctx: &AppContext,
    reply: &Reply,
    actor_id: i64,
    args: &str,
) -> HandlerResult {
    if !ctx.access.gate().can_manage_admins(actor_id) {
        log_permission_denied("removemangaadmin", actor_id, None);
        reply.text("Only main admins can remove manga admins.").await?;
        return Ok(());
    }
    let Some((title_name, user_arg)) = parse_grant_args(args) else {
        reply.text(REMOVE_GRANT_USAGE).await?;
        return Ok(());
    };
    let Some(title) = resolve_title(ctx, reply, &title_name).await? else {
        return Ok(());
    };
    let Some(user_id) = resolve_user(reply.bot(), &user_arg).await else {
        reply.text("Invalid user. Use numeric user ID or @username.").await?;
        return Ok(());
    };

    if TitleAdmin::revoke(ctx.pool(), title.id, user_id).await? {
        ctx.audit(
            actor_id,
            "remove_manga_admin",
            format!("title_id={}, user_id={user_id}", title.id),
        )
        .await;
        reply
            .text(format!("Removed manga admin {user_id} from '{}'.", title.name))
            .await?;
    } else {
        reply
            .text(format!("User {user_id} was not assigned to '{}'.", title.name))
            .await?;
    }
    Ok(())
}

pub async fn handle_list_admin(ctx: &AppContext, reply: &Reply, actor_id: i64) -> HandlerResult {
    if !ctx.access.gate().can_manage_admins(actor_id) {
        reply.text("Only main admins can list admins.").await?;
        return Ok(());
    }

    let mut lines = vec!["Main admins:".to_string()];
    for uid in ctx.access.gate().super_admin_ids() {
        lines.push(admin_line(reply.bot(), uid).await);
    }
    lines.push(String::new());
    lines.push("Added admins:".to_string());
    for uid in Admin::list_ids(ctx.pool()).await? {
        lines.push(admin_line(reply.bot(), uid).await);
    }
    reply.text(lines.join("\n").trim().to_string()).await?;
    Ok(())
}

async fn admin_line(bot: &Bot, user_id: i64) -> String {
    let name = lookup_chat(bot, user_id)
        .await
        .as_ref()
        .and_then(full_name)
        .unwrap_or_else(|| user_id.to_string());
    format!("{name} - {user_id}")
}
