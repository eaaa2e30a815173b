//! Inline button presses for browsing users and managing admins.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId};

use crate::bot::callback_data::{AdminAction, CallbackData, UserAction};
use crate::bot::commands::admin::{admin_panel_text, NOT_ADMIN};
use crate::bot::commands::browse::{LABEL_ALL_EPS, LABEL_TITLES};
use crate::bot::context::AppContext;
use crate::bot::errors::{classify_request_error, ErrorClass};
use crate::bot::keyboards::{self, EPISODE_PAGE_SIZE, TITLE_PAGE_SIZE};
use crate::bot::session::{Pending, Session, SessionDialogue};
use crate::bot::{HandlerError, HandlerResult};
use crate::database::models::{Episode, MangaView, Title};
use crate::utils::feedback::Reply;
use crate::utils::logging::{log_database_error, log_permission_denied};
use crate::utils::pagination::paginate;
use crate::utils::text::MESSAGE_CHUNK_LIMIT;
use crate::utils::validation::display_episode_name;

const TITLE_NOT_FOUND: &str = "Manga not found.";
const EPISODE_NOT_FOUND: &str = "Episode not found.";

/// The bot message a button belongs to. Every screen change edits it in place.
struct Screen<'a> {
    reply: &'a Reply,
    message_id: MessageId,
}

impl Screen<'_> {
    async fn show(&self, text: impl Into<String>, keyboard: Option<InlineKeyboardMarkup>) -> HandlerResult {
        self.reply.edit(self.message_id, text, keyboard).await?;
        Ok(())
    }
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: SessionDialogue,
    ctx: AppContext,
) -> HandlerResult {
    let parsed = q.data.as_deref().map(str::parse::<CallbackData>);
    let admin_button = matches!(&parsed, Some(Ok(data)) if data.is_admin());
    dialogue.update(Session::idle(admin_button)).await?;

    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        if classify_request_error(&e) == ErrorClass::Fatal {
            return Err(e.into());
        }
        tracing::debug!("Dropping callback {} that can no longer be answered: {}", q.id, e);
        return Ok(());
    }

    let user_id = q.from.id.0 as i64;
    let data = match parsed {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            tracing::warn!("Ignoring callback from user {}: {}", user_id, e);
            return Ok(());
        }
        None => return Ok(()),
    };
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };

    tracing::info!(
        "Callback '{}' from user {} in chat {}",
        data,
        user_id,
        message.chat.id.0
    );

    let reply = ctx.reply(&bot, message.chat.id, data.is_admin());
    let screen = Screen {
        reply: &reply,
        message_id: message.id,
    };

    match data {
        CallbackData::User(action) => user_action(&ctx, &screen, user_id, action).await,
        CallbackData::Admin(action) => {
            if !ctx.access.is_admin(user_id).await? {
                log_permission_denied("admin callback", user_id, None);
                return screen.show(NOT_ADMIN, None).await;
            }
            admin_action(&ctx, &screen, &dialogue, user_id, action).await
        }
    }
}

async fn user_action(ctx: &AppContext, screen: &Screen<'_>, user_id: i64, action: UserAction) -> HandlerResult {
    match action {
        UserAction::Title(title_id) => {
            if let Err(e) = MangaView::record(ctx.pool(), title_id, user_id).await {
                log_database_error("INSERT", "manga_views", &e.to_string(), Some(&title_id.to_string()));
            }
            user_episodes(ctx, screen, title_id, 0).await
        }
        UserAction::Episodes { title_id, page } => user_episodes(ctx, screen, title_id, page).await,
        UserAction::Titles(page) => user_titles(ctx, screen, page).await,
        UserAction::Back => user_titles(ctx, screen, 0).await,
    }
}

async fn user_titles(ctx: &AppContext, screen: &Screen<'_>, page: usize) -> HandlerResult {
    let titles = Title::list_all(ctx.pool()).await?;
    if titles.is_empty() {
        return screen.show("No manga yet.", None).await;
    }
    let page = paginate(&titles, page, TITLE_PAGE_SIZE);
    screen.show(LABEL_TITLES, Some(keyboards::user_titles(&page))).await
}

async fn user_episodes(ctx: &AppContext, screen: &Screen<'_>, title_id: i64, page: usize) -> HandlerResult {
    let Some(title) = Title::find_by_id(ctx.pool(), title_id).await? else {
        return screen.show(TITLE_NOT_FOUND, None).await;
    };
    let episodes = Episode::list_by_title(ctx.pool(), title_id).await?;
    if episodes.is_empty() {
        return screen
            .show(
                format!("{} - No episodes yet.", title.name),
                Some(keyboards::single_button("Back", UserAction::Back)),
            )
            .await;
    }
    let page = paginate(&episodes, page, EPISODE_PAGE_SIZE);
    screen
        .show(
            format!("{} {LABEL_ALL_EPS}", title.name),
            Some(keyboards::user_episodes(title_id, &page)),
        )
        .await
}

/// Loads a title the admin may manage, or shows why not and returns `None`.
async fn managed_title(
    ctx: &AppContext,
    screen: &Screen<'_>,
    user_id: i64,
    title_id: i64,
    refusal: &str,
    refusal_keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Option<Title>, HandlerError> {
    let Some(title) = Title::find_by_id(ctx.pool(), title_id).await? else {
        screen.show(TITLE_NOT_FOUND, None).await?;
        return Ok(None);
    };
    if !ctx.access.can_manage_title(user_id, &title).await? {
        log_permission_denied("manage title", user_id, Some(title_id));
        screen.show(refusal, refusal_keyboard).await?;
        return Ok(None);
    }
    Ok(Some(title))
}

async fn managed_episode(
    ctx: &AppContext,
    screen: &Screen<'_>,
    user_id: i64,
    episode_id: i64,
    refusal: &str,
) -> Result<Option<Episode>, HandlerError> {
    let Some(episode) = Episode::find_by_id(ctx.pool(), episode_id).await? else {
        screen.show(EPISODE_NOT_FOUND, None).await?;
        return Ok(None);
    };
    if !ctx.access.can_manage_title_id(user_id, episode.title_id).await? {
        log_permission_denied("manage episode", user_id, Some(episode.title_id));
        screen.show(refusal, None).await?;
        return Ok(None);
    }
    Ok(Some(episode))
}

async fn admin_action(
    ctx: &AppContext,
    screen: &Screen<'_>,
    dialogue: &SessionDialogue,
    user_id: i64,
    action: AdminAction,
) -> HandlerResult {
    match action {
        AdminAction::AddTitle => {
            dialogue.update(Session::waiting(Pending::AddTitle)).await?;
            screen.show("Send the manga name:", None).await
        }
        AdminAction::Manage => admin_titles(ctx, screen, 0).await,
        AdminAction::Titles(page) => admin_titles(ctx, screen, page).await,
        AdminAction::Back => {
            screen
                .show(admin_panel_text(ctx).await?, Some(keyboards::admin_panel()))
                .await
        }
        AdminAction::Title(title_id) | AdminAction::UseTitle(title_id) => {
            let back = keyboards::single_button("Back", AdminAction::Manage);
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot manage this manga.", Some(back)).await?
            else {
                return Ok(());
            };
            screen
                .show(
                    format!("{} - Choose an action:", title.name),
                    Some(keyboards::title_actions(title.id, true)),
                )
                .await
        }
        AdminAction::AddEpisode(title_id) => {
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot add episodes to this manga.", None).await?
            else {
                return Ok(());
            };
            dialogue
                .update(Session::waiting(Pending::AddEpisodeName { title_id }))
                .await?;
            screen.show(format!("{} - Send episode name:", title.name), None).await
        }
        AdminAction::BulkAdd(title_id) => {
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot add episodes to this manga.", None).await?
            else {
                return Ok(());
            };
            dialogue
                .update(Session::waiting(Pending::BulkAdd {
                    title_id,
                    buffer: String::new(),
                }))
                .await?;
            screen
                .show(
                    format!(
                        "{}\nPlease input the link:\nExample:\n\u{1797}\u{17B6}\u{1782}\u{17E1}\nhttps://m.facebook.com/...\n\u{1797}\u{17B6}\u{1782}\u{17E2}\nhttps://m.facebook.com/...",
                        title.name
                    ),
                    None,
                )
                .await
        }
        AdminAction::CopyEpisodes(title_id) => copy_episodes(ctx, screen, user_id, title_id).await,
        AdminAction::Episodes { title_id, page } => admin_episodes(ctx, screen, user_id, title_id, page).await,
        AdminAction::Episode(episode_id) => {
            let Some(episode) =
                managed_episode(ctx, screen, user_id, episode_id, "You cannot manage this episode.").await?
            else {
                return Ok(());
            };
            let prev = Episode::prev_id(ctx.pool(), episode.title_id, episode_id).await?;
            let next = Episode::next_id(ctx.pool(), episode.title_id, episode_id).await?;
            screen
                .show(
                    format!("{}\nChoose an action:", display_episode_name(&episode.name)),
                    Some(keyboards::episode_actions(episode_id, episode.title_id, prev, next)),
                )
                .await
        }
        AdminAction::EditTitle(title_id) => {
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot edit this manga.", None).await?
            else {
                return Ok(());
            };
            dialogue.update(Session::waiting(Pending::EditTitle { title_id })).await?;
            screen
                .show(
                    format!("{} - Send the new manga name:", title.name),
                    Some(keyboards::single_button("Cancel", AdminAction::Title(title_id))),
                )
                .await
        }
        AdminAction::EditEpisodeName(episode_id) | AdminAction::EditEpisodeUrl(episode_id) => {
            let Some(episode) =
                managed_episode(ctx, screen, user_id, episode_id, "You cannot edit this episode.").await?
            else {
                return Ok(());
            };
            let (pending, prompt) = if matches!(action, AdminAction::EditEpisodeName(_)) {
                (Pending::EditEpisodeName { episode_id }, "Send the new episode name:")
            } else {
                (Pending::EditEpisodeUrl { episode_id }, "Send the new episode link (http/https):")
            };
            dialogue.update(Session::waiting(pending)).await?;
            screen
                .show(
                    format!("{}\n{prompt}", display_episode_name(&episode.name)),
                    Some(keyboards::single_button("Cancel", AdminAction::Episode(episode_id))),
                )
                .await
        }
        AdminAction::DeleteTitle(title_id) => {
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot delete this manga.", None).await?
            else {
                return Ok(());
            };
            screen
                .show(
                    format!("Delete manga '{}' and all episodes?", title.name),
                    Some(keyboards::confirm_delete_title(title_id)),
                )
                .await
        }
        AdminAction::ConfirmDeleteTitle(title_id) => {
            let Some(title) =
                managed_title(ctx, screen, user_id, title_id, "You cannot delete this manga.", None).await?
            else {
                return Ok(());
            };
            if !Title::delete(ctx.pool(), title_id).await? {
                return screen.show(TITLE_NOT_FOUND, None).await;
            }
            ctx.audit(
                user_id,
                "delete_title",
                format!("title_id={title_id}, name={}", title.name),
            )
            .await;
            screen
                .show(
                    "Manga deleted.",
                    Some(keyboards::single_button("Back", AdminAction::Manage)),
                )
                .await
        }
        AdminAction::DeleteEpisode(episode_id) => {
            let Some(episode) =
                managed_episode(ctx, screen, user_id, episode_id, "You cannot delete this episode.").await?
            else {
                return Ok(());
            };
            screen
                .show(
                    format!("Delete episode '{}'?", display_episode_name(&episode.name)),
                    Some(keyboards::confirm_delete_episode(episode_id)),
                )
                .await
        }
        AdminAction::ConfirmDeleteEpisode(episode_id) => {
            let Some(episode) =
                managed_episode(ctx, screen, user_id, episode_id, "You cannot delete this episode.").await?
            else {
                return Ok(());
            };
            if !Episode::delete(ctx.pool(), episode_id).await? {
                return screen.show(EPISODE_NOT_FOUND, None).await;
            }
            let title_id = episode.title_id;
            ctx.audit(
                user_id,
                "delete_episode",
                format!("episode_id={episode_id}, title_id={title_id}"),
            )
            .await;
            screen
                .show(
                    "Episode deleted.",
                    Some(keyboards::single_button(
                        "Back to episodes",
                        AdminAction::Episodes { title_id, page: 0 },
                    )),
                )
                .await
        }
    }
}

async fn admin_titles(ctx: &AppContext, screen: &Screen<'_>, page: usize) -> HandlerResult {
    let titles = Title::list_all(ctx.pool()).await?;
    if titles.is_empty() {
        return screen.show("No manga yet.", None).await;
    }
    let page = paginate(&titles, page, TITLE_PAGE_SIZE);
    screen.show("Select a manga:", Some(keyboards::admin_titles(&page))).await
}

async fn admin_episodes(
    ctx: &AppContext,
    screen: &Screen<'_>,
    user_id: i64,
    title_id: i64,
    page: usize,
) -> HandlerResult {
    let Some(title) =
        managed_title(ctx, screen, user_id, title_id, "You cannot access episodes from this manga.", None).await?
    else {
        return Ok(());
    };
    let episodes = Episode::list_by_title(ctx.pool(), title_id).await?;
    if episodes.is_empty() {
        return screen
            .show(
                format!("{} - No episodes yet.", title.name),
                Some(keyboards::single_button("Back", AdminAction::Title(title_id))),
            )
            .await;
    }
    let page = paginate(&episodes, page, EPISODE_PAGE_SIZE);
    screen
        .show(
            format!("{} - Select an episode:", title.name),
            Some(keyboards::admin_episodes(title_id, &page)),
        )
        .await
}

/// Sends every episode of a title as copyable text, or as a file when it is too long.
async fn copy_episodes(ctx: &AppContext, screen: &Screen<'_>, user_id: i64, title_id: i64) -> HandlerResult {
    let Some(title) =
        managed_title(ctx, screen, user_id, title_id, "You cannot access episodes from this manga.", None).await?
    else {
        return Ok(());
    };
    let episodes = Episode::list_by_title(ctx.pool(), title_id).await?;
    if episodes.is_empty() {
        return screen
            .show(
                format!("{} - No episodes yet.", title.name),
                Some(keyboards::single_button("Back", AdminAction::Title(title_id))),
            )
            .await;
    }

    let listing = episode_listing(&title.name, &episodes);
    if listing.chars().count() <= MESSAGE_CHUNK_LIMIT {
        screen.reply.text(listing).await?;
    } else {
        screen
            .reply
            .document(format!("{}_episodes.txt", title.name), listing.into_bytes(), "All episodes")
            .await?;
    }
    Ok(())
}

/// `#Link` header (kept out of hashtag parsing), the title, then name/link line pairs.
pub fn episode_listing(title_name: &str, episodes: &[Episode]) -> String {
    let pairs: Vec<String> = episodes
        .iter()
        .map(|ep| {
            let name = display_episode_name(&ep.name).replace('\n', " ");
            let url = ep.url.trim().replace('\n', "");
            format!("{}\n{url}", name.trim())
        })
        .collect();
    format!(
        "#\u{200B}Link\u{179A}\u{17BF}\u{1784}\u{17D6}\n{title_name}\n{}",
        pairs.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: i64, name: &str, url: &str) -> Episode {
        Episode {
            id,
            title_id: 1,
            name: name.to_string(),
            url: url.to_string(),
            created_by: 1,
            created_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn test_episode_listing_layout() {
        let episodes = vec![
            episode(1, "ep 1", " https://x.test/1 "),
            episode(2, "ep\n2", "https://x.test/2"),
        ];
        let listing = episode_listing("Berserk", &episodes);
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines[0].starts_with("#\u{200B}Link"));
        assert_eq!(lines[1], "Berserk");
        assert_eq!(&lines[2..], ["ep 1", "https://x.test/1", "ep 2", "https://x.test/2"]);
    }

    #[test]
    fn test_episode_listing_repairs_broken_prefix() {
        let listing = episode_listing("T", &[episode(1, "???5", "https://x.test/5")]);
        assert!(listing.contains(&format!("{}5", crate::utils::validation::EP_PREFIX)));
    }
}
