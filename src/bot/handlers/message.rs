use teloxide::prelude::*;

use crate::bot::commands::{admin, browse, links, reports, sender_id, Command};
use crate::bot::context::AppContext;
use crate::bot::handlers::admin_text;
use crate::bot::session::{Session, SessionDialogue};
use crate::bot::HandlerResult;
use crate::database::models::UsageLog;
use crate::utils::logging::{log_command_error, log_command_start, log_database_error};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: SessionDialogue,
    ctx: AppContext,
) -> HandlerResult {
    let user_id = sender_id(&msg).unwrap_or(0);
    let username = msg
        .from()
        .and_then(|u| u.username.clone())
        .unwrap_or_else(|| "unknown".to_string());
    log_command_start(cmd.name(), &username, user_id, msg.chat.id.0, None);

    if cmd.is_tracked() && user_id != 0 {
        if let Err(e) = UsageLog::record(ctx.pool(), user_id, cmd.name()).await {
            log_database_error("INSERT", "usage_logs", &e.to_string(), Some(cmd.name()));
        }
    }

    let current = dialogue.get().await?.unwrap_or_default();
    let session = if cmd.resets_pending() {
        Session::idle(cmd.is_admin_flow())
    } else {
        Session {
            pending: current.pending,
            auto_delete: true,
        }
    };
    dialogue.update(session.clone()).await?;

    let reply = ctx.reply(&bot, msg.chat.id, session.auto_delete);
    if cmd.forces_expiry() {
        reply.expire_forced(msg.id).await;
    } else {
        reply.expire(msg.id).await;
    }

    let result: HandlerResult = match &cmd {
        Command::Start => reply.text(browse::start_text()).await.map(|_| ()).map_err(Into::into),
        Command::Help => reply.text(browse::help_text()).await.map(|_| ()).map_err(Into::into),
        Command::Cancel => reply.text_forced("Cancelled.").await.map(|_| ()).map_err(Into::into),
        Command::MangaLink => browse::handle_manga_link(&ctx, &reply).await,
        Command::ListManga => browse::handle_list_manga(&ctx, &reply).await,
        Command::Search(query) => browse::handle_search(&ctx, &reply, query).await,
        Command::MangaUpdated(args) => browse::handle_manga_updated(&ctx, &reply, user_id, args).await,
        Command::LastUpdate(raw) => browse::handle_last_update(&ctx, &reply, raw).await,
        Command::ListEp(args) => browse::handle_list_ep(&reply, args).await,
        Command::GetUserId => browse::handle_get_user_id(&reply, &msg).await,
        Command::DonateAdmin => browse::handle_donate(&ctx, &reply).await,
        Command::MangaAdmin => admin::handle_admin_panel(&ctx, &reply, user_id).await,
        Command::SearchByAdmin(query) => admin::handle_search_by_admin(&ctx, &reply, user_id, query).await,
        Command::FindDuplicateLink => reports::handle_find_duplicate_link(&ctx, &reply, user_id).await,
        Command::CheckTitleLinks(raw) => links::handle_check_title_links(&ctx, &reply, user_id, raw).await,
        Command::BadLinks(args) | Command::DeadLinks(args) => {
            links::handle_bad_links(&ctx, &reply, user_id, args).await
        }
        Command::TopManga(args) => reports::handle_top_manga(&ctx, &reply, user_id, args).await,
        Command::Daily(args) => reports::handle_daily(&ctx, &reply, user_id, args).await,
        Command::AuditLog(args) => reports::handle_audit_log(&ctx, &reply, user_id, args).await,
        Command::AddAdmin(args) => admin::handle_add_admin(&ctx, &reply, user_id, args).await,
        Command::RemoveAdmin(args) => admin::handle_remove_admin(&ctx, &reply, user_id, args).await,
        Command::AddMangaAdmin(args) => admin::handle_add_manga_admin(&ctx, &reply, user_id, args).await,
        Command::RemoveMangaAdmin(args) => {
            admin::handle_remove_manga_admin(&ctx, &reply, user_id, args).await
        }
        Command::ListAdmin => admin::handle_list_admin(&ctx, &reply, user_id).await,
        Command::Done => admin_text::finish_bulk_add(&ctx, &reply, &dialogue, user_id).await,
    };

    if let Err(e) = &result {
        log_command_error(cmd.name(), user_id, msg.chat.id.0, &e.to_string());
    }
    result
}
