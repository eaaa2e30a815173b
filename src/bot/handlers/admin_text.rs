//! Free-text input for pending admin actions, and `/done` for bulk adds.

use teloxide::prelude::*;

use crate::bot::callback_data::AdminAction;
use crate::bot::commands::admin::NOT_ADMIN;
use crate::bot::commands::sender_id;
use crate::bot::context::AppContext;
use crate::bot::keyboards;
use crate::bot::session::{Pending, Session, SessionDialogue};
use crate::bot::HandlerResult;
use crate::database::models::{Episode, RenameOutcome, Title};
use crate::utils::bulk::parse_bulk_links;
use crate::utils::feedback::Reply;
use crate::utils::logging::{log_command_success, log_validation_error};
use crate::utils::validation::{is_valid_url, normalize_episode_name, normalize_url, validate_title_name};

const INVALID_URL: &str = "Invalid URL. Please send the link again (http/https):";

pub async fn admin_text_handler(
    bot: Bot,
    msg: Message,
    dialogue: SessionDialogue,
    ctx: AppContext,
) -> HandlerResult {
    let raw = msg.text().unwrap_or_default();
    if raw.starts_with('/') {
        return Ok(());
    }
    let session = dialogue.get().await?.unwrap_or_default();
    if session.pending.is_idle() {
        return Ok(());
    }
    let Some(user_id) = sender_id(&msg) else {
        return Ok(());
    };
    if !ctx.access.is_admin(user_id).await? {
        return Ok(());
    }

    let reply = ctx.reply(&bot, msg.chat.id, true);
    reply.expire(msg.id).await;

    let text = raw.trim();
    if text.is_empty() {
        reply.text("Please send text.").await?;
        return Ok(());
    }

    tracing::debug!("Admin {} input for {}", user_id, session.pending.name());
    match session.pending.clone() {
        Pending::Idle => Ok(()),
        Pending::AddTitle => add_title(&ctx, &reply, &dialogue, user_id, text).await,
        Pending::AddEpisodeName { title_id } => {
            let name = normalize_episode_name(text);
            dialogue
                .update(Session::waiting(Pending::AddEpisodeUrl { title_id, name }))
                .await?;
            reply.text("Send episode link (http/https):").await?;
            Ok(())
        }
        Pending::AddEpisodeUrl { title_id, name } => {
            add_episode(&ctx, &reply, &dialogue, user_id, title_id, &name, text).await
        }
        Pending::EditTitle { title_id } => rename_title(&ctx, &reply, &dialogue, user_id, title_id, text).await,
        Pending::EditEpisodeName { episode_id } => {
            edit_episode(&ctx, &reply, &dialogue, user_id, episode_id, EpisodeField::Name, text).await
        }
        Pending::EditEpisodeUrl { episode_id } => {
            edit_episode(&ctx, &reply, &dialogue, user_id, episode_id, EpisodeField::Url, text).await
        }
        Pending::BulkAdd { .. } => {
            let mut session = session;
            session.append_bulk(text);
            dialogue.update(session).await?;
            reply.text("Added to bulk input. Send more or /done to finish.").await?;
            Ok(())
        }
    }
}

async fn add_title(
    ctx: &AppContext,
    reply: &Reply,
    dialogue: &SessionDialogue,
    user_id: i64,
    name: &str,
) -> HandlerResult {
    if let Err(e) = validate_title_name(name) {
        log_validation_error("add_title", name, &e.to_string(), user_id);
        reply.text(e.to_string()).await?;
        return Ok(());
    }

    if let Some(existing) = Title::find_by_name(ctx.pool(), name).await? {
        dialogue.update(Session::idle(true)).await?;
        reply
            .markup(
                "Manga already exists. Use existing manga?",
                keyboards::existing_title(existing.id),
            )
            .await?;
        return Ok(());
    }

    dialogue.update(Session::idle(true)).await?;
    match Title::create(ctx.pool(), name, user_id).await? {
        None => {
            reply.text("Manga already exists.").await?;
        }
        Some(title_id) => {
            ctx.audit(user_id, "add_title", format!("title_id={title_id}, name={name}"))
                .await;
            log_command_success("add_title", user_id, Some(name));
            reply
                .markup(
                    format!("{name} - Choose an action:"),
                    keyboards::title_actions(title_id, false),
                )
                .await?;
        }
    }
    Ok(())
}

async fn add_episode(
    ctx: &AppContext,
    reply: &Reply,
    dialogue: &SessionDialogue,
    user_id: i64,
    title_id: i64,
    name: &str,
    raw_url: &str,
) -> HandlerResult {
    let url = normalize_url(raw_url);
    if !is_valid_url(&url) {
        log_validation_error("add_episode", raw_url, "not an http/https link", user_id);
        reply.text(INVALID_URL).await?;
        return Ok(());
    }
    if !ctx.access.can_manage_title_id(user_id, title_id).await? {
        dialogue.update(Session::idle(true)).await?;
        reply.text("You cannot add episodes to this manga.").await?;
        return Ok(());
    }

    let episode_id = Episode::create(ctx.pool(), title_id, name, &url, user_id).await?;
    ctx.audit(
        user_id,
        "add_episode",
        format!("title_id={title_id}, episode_name={name}"),
    )
    .await;
    log_command_success("add_episode", user_id, Some(&episode_id.to_string()));

    dialogue
        .update(Session::waiting(Pending::AddEpisodeName { title_id }))
        .await?;
    reply.text("Episode added. Send next episode name or /cancel.").await?;
    Ok(())
}

async fn rename_title(
    ctx: &AppContext,
    reply: &Reply,
    dialogue: &SessionDialogue,
    user_id: i64,
    title_id: i64,
    new_name: &str,
) -> HandlerResult {
    if let Err(e) = validate_title_name(new_name) {
        reply.text(e.to_string()).await?;
        return Ok(());
    }
    dialogue.update(Session::idle(true)).await?;
    if !ctx.access.can_manage_title_id(user_id, title_id).await? {
        reply.text("You cannot edit this manga.").await?;
        return Ok(());
    }

    match Title::rename(ctx.pool(), title_id, new_name).await? {
        RenameOutcome::Renamed => {
            ctx.audit(user_id, "edit_title", format!("title_id={title_id}, new_name={new_name}"))
                .await;
            reply
                .markup("Manga updated.", keyboards::single_button("Back", AdminAction::Manage))
                .await?;
        }
        RenameOutcome::NameTaken => {
            reply.text("Manga already exists.").await?;
        }
        RenameOutcome::NotFound => {
            reply.text("Manga not found.").await?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpisodeField {
    Name,
    Url,
}

async fn edit_episode(
    ctx: &AppContext,
    reply: &Reply,
    dialogue: &SessionDialogue,
    user_id: i64,
    episode_id: i64,
    field: EpisodeField,
    text: &str,
) -> HandlerResult {
    let url = normalize_url(text);
    if field == EpisodeField::Url && !is_valid_url(&url) {
        log_validation_error("edit_episode_url", text, "not an http/https link", user_id);
        reply.text(INVALID_URL).await?;
        return Ok(());
    }

    dialogue.update(Session::idle(true)).await?;
    let Some(episode) = Episode::find_by_id(ctx.pool(), episode_id).await? else {
        reply.text("Episode not found.").await?;
        return Ok(());
    };
    if !ctx.access.can_manage_title_id(user_id, episode.title_id).await? {
        reply.text("You cannot edit this episode.").await?;
        return Ok(());
    }

    let (name, url, action, details, done) = match field {
        EpisodeField::Name => {
            let name = normalize_episode_name(text);
            let details = format!("episode_id={episode_id}, new_name={name}");
            (name, episode.url, "edit_episode_name", details, "Episode name updated.")
        }
        EpisodeField::Url => (
            episode.name,
            url,
            "edit_episode_url",
            format!("episode_id={episode_id}"),
            "Episode link updated.",
        ),
    };

    if Episode::update(ctx.pool(), episode_id, &name, &url).await? {
        ctx.audit(user_id, action, details).await;
        reply
            .markup(done, keyboards::single_button("Back", AdminAction::Episode(episode_id)))
            .await?;
    } else {
        reply.text("Episode not found.").await?;
    }
    Ok(())
}

/// Parses the accumulated bulk buffer once and stores every valid pair.
pub async fn finish_bulk_add(
    ctx: &AppContext,
    reply: &Reply,
    dialogue: &SessionDialogue,
    user_id: i64,
) -> HandlerResult {
    let session = dialogue.get().await?.unwrap_or_default();
    let Pending::BulkAdd { title_id, buffer } = session.pending else {
        reply.text_forced("Nothing to finish.").await?;
        return Ok(());
    };
    if !ctx.access.is_admin(user_id).await? {
        dialogue.update(Session::idle(true)).await?;
        reply.text_forced(NOT_ADMIN).await?;
        return Ok(());
    }
    if buffer.trim().is_empty() {
        dialogue.update(Session::idle(true)).await?;
        reply.text_forced("No bulk data received.").await?;
        return Ok(());
    }

    let parsed = match parse_bulk_links(&buffer) {
        Ok(parsed) => parsed,
        Err(e) => {
            log_validation_error("done", "bulk buffer", &e.to_string(), user_id);
            reply.text(e.to_string()).await?;
            return Ok(());
        }
    };

    dialogue.update(Session::idle(true)).await?;
    if Title::find_by_id(ctx.pool(), title_id).await?.is_none() {
        reply.text("Manga not found.").await?;
        return Ok(());
    }
    if !ctx.access.can_manage_title_id(user_id, title_id).await? {
        reply.text("You cannot add episodes to this manga.").await?;
        return Ok(());
    }

    let added = Episode::create_many(ctx.pool(), title_id, &parsed.entries, user_id).await?;
    if added > 0 {
        ctx.audit(
            user_id,
            "bulk_add_episodes",
            format!("title_id={title_id}, added={added}, skipped={}", parsed.skipped),
        )
        .await;
    }
    reply
        .markup(
            format!("Bulk add complete. Added {added}, skipped {}.", parsed.skipped),
            keyboards::bulk_result(title_id),
        )
        .await?;
    Ok(())
}
