use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::callback_data::{AdminAction, CallbackData, UserAction};
use crate::database::models::{Episode, Title};
use crate::utils::pagination::Page;
use crate::utils::validation::display_episode_name;

pub const TITLE_PAGE_SIZE: usize = 20;
pub const EPISODE_PAGE_SIZE: usize = 30;
pub const EPISODES_PER_ROW: usize = 3;

fn button(text: impl Into<String>, data: impl Into<CallbackData>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data.into().to_string())
}

fn nav_row(
    has_prev: bool,
    has_next: bool,
    prev: impl Into<CallbackData>,
    next: impl Into<CallbackData>,
) -> Option<Vec<InlineKeyboardButton>> {
    let mut row = Vec::new();
    if has_prev {
        row.push(button("Prev", prev));
    }
    if has_next {
        row.push(button("Next", next));
    }
    (!row.is_empty()).then_some(row)
}

pub fn single_button(text: &str, data: impl Into<CallbackData>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(text, data)]])
}

/// One title per row, for browsing.
pub fn user_titles(page: &Page<'_, Title>) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page
        .items
        .iter()
        .map(|t| vec![button(t.name.clone(), UserAction::Title(t.id))])
        .collect();
    if let Some(nav) = nav_row(
        page.has_prev(),
        page.has_next(),
        UserAction::Titles(page.page.saturating_sub(1)),
        UserAction::Titles(page.page + 1),
    ) {
        rows.push(nav);
    }
    InlineKeyboardMarkup::new(rows)
}

/// Search hits, without paging.
pub fn user_title_results(titles: &[Title]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        titles
            .iter()
            .map(|t| vec![button(t.name.clone(), UserAction::Title(t.id))]),
    )
}

/// Episode link buttons, three to a row. Links Telegram would reject are left out.
pub fn user_episodes(title_id: i64, page: &Page<'_, Episode>) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = page
        .items
        .iter()
        .filter_map(|ep| match Url::parse(ep.url.trim()) {
            Ok(url) => Some(InlineKeyboardButton::url(display_episode_name(&ep.name), url)),
            Err(e) => {
                tracing::warn!("Skipping episode {} with unusable link '{}': {}", ep.id, ep.url, e);
                None
            }
        })
        .collect();

    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .chunks(EPISODES_PER_ROW)
        .map(|chunk| chunk.to_vec())
        .collect();
    if let Some(nav) = nav_row(
        page.has_prev(),
        page.has_next(),
        UserAction::Episodes { title_id, page: page.page.saturating_sub(1) },
        UserAction::Episodes { title_id, page: page.page + 1 },
    ) {
        rows.push(nav);
    }
    rows.push(vec![button("Back", UserAction::Back)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_panel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Add manga", AdminAction::AddTitle)],
        vec![button("Manage manga", AdminAction::Manage)],
    ])
}

pub fn admin_titles(page: &Page<'_, Title>) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page
        .items
        .iter()
        .map(|t| vec![button(t.name.clone(), AdminAction::Title(t.id))])
        .collect();
    if let Some(nav) = nav_row(
        page.has_prev(),
        page.has_next(),
        AdminAction::Titles(page.page.saturating_sub(1)),
        AdminAction::Titles(page.page + 1),
    ) {
        rows.push(nav);
    }
    rows.push(vec![button("Back", AdminAction::Back)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_title_results(titles: &[Title]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = titles
        .iter()
        .map(|t| vec![button(t.name.clone(), AdminAction::Title(t.id))])
        .collect();
    rows.push(vec![button("Back to admin panel", AdminAction::Back)]);
    InlineKeyboardMarkup::new(rows)
}

/// Actions on one title. A freshly created title has nothing to list or copy yet.
pub fn title_actions(title_id: i64, with_listing: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![button("Add episode", AdminAction::AddEpisode(title_id))],
        vec![button("Bulk add episodes", AdminAction::BulkAdd(title_id))],
    ];
    if with_listing {
        rows.push(vec![button("List episodes", AdminAction::Episodes { title_id, page: 0 })]);
        rows.push(vec![button("Copy all episodes", AdminAction::CopyEpisodes(title_id))]);
    }
    rows.push(vec![button("Edit manga", AdminAction::EditTitle(title_id))]);
    rows.push(vec![button("Delete manga", AdminAction::DeleteTitle(title_id))]);
    rows.push(vec![button("Back", AdminAction::Manage)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn existing_title(title_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Use existing", AdminAction::UseTitle(title_id))],
        vec![button("Cancel", AdminAction::Manage)],
    ])
}

pub fn admin_episodes(title_id: i64, page: &Page<'_, Episode>) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = page
        .items
        .iter()
        .map(|ep| button(display_episode_name(&ep.name), AdminAction::Episode(ep.id)))
        .collect();
    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .chunks(EPISODES_PER_ROW)
        .map(|chunk| chunk.to_vec())
        .collect();
    if let Some(nav) = nav_row(
        page.has_prev(),
        page.has_next(),
        AdminAction::Episodes { title_id, page: page.page.saturating_sub(1) },
        AdminAction::Episodes { title_id, page: page.page + 1 },
    ) {
        rows.push(nav);
    }
    rows.push(vec![button("Back", AdminAction::Title(title_id))]);
    InlineKeyboardMarkup::new(rows)
}

/// Actions on one episode, with a prev/next row on top when neighbours exist.
pub fn episode_actions(
    episode_id: i64,
    title_id: i64,
    prev_id: Option<i64>,
    next_id: Option<i64>,
) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    let mut nav = Vec::new();
    if let Some(prev) = prev_id {
        nav.push(button("Prev", AdminAction::Episode(prev)));
    }
    if let Some(next) = next_id {
        nav.push(button("Next", AdminAction::Episode(next)));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }
    rows.push(vec![button("Edit name", AdminAction::EditEpisodeName(episode_id))]);
    rows.push(vec![button("Edit link", AdminAction::EditEpisodeUrl(episode_id))]);
    rows.push(vec![button("Delete episode", AdminAction::DeleteEpisode(episode_id))]);
    rows.push(vec![button("Back", AdminAction::Episodes { title_id, page: 0 })]);
    InlineKeyboardMarkup::new(rows)
}

pub fn confirm_delete_title(title_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Yes, delete", AdminAction::ConfirmDeleteTitle(title_id))],
        vec![button("Cancel", AdminAction::Title(title_id))],
    ])
}

pub fn confirm_delete_episode(episode_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Yes, delete", AdminAction::ConfirmDeleteEpisode(episode_id))],
        vec![button("Cancel", AdminAction::Episode(episode_id))],
    ])
}

pub fn bulk_result(title_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("List episodes", AdminAction::Episodes { title_id, page: 0 })],
        vec![button("Back", AdminAction::Manage)],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::paginate;
    use teloxide::types::InlineKeyboardButtonKind;

    fn episode(id: i64) -> Episode {
        Episode {
            id,
            title_id: 1,
            name: format!("ep{id}"),
            url: format!("https://x.test/{id}"),
            created_by: 1,
            created_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    fn callback_of(button: &InlineKeyboardButton) -> Option<&str> {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_episode_grid_rows_of_three() {
        let episodes: Vec<Episode> = (1..=7).map(episode).collect();
        let page = paginate(&episodes, 0, EPISODE_PAGE_SIZE);
        let markup = admin_episodes(1, &page);
        let widths: Vec<usize> = markup.inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![3, 3, 1, 1]);
        assert_eq!(callback_of(&markup.inline_keyboard[0][0]), Some("admin:ep:1"));
        assert_eq!(callback_of(&markup.inline_keyboard[3][0]), Some("admin:title:1"));
    }

    #[test]
    fn test_user_episode_grid_navigation() {
        let episodes: Vec<Episode> = (1..=31).map(episode).collect();
        let page = paginate(&episodes, 1, EPISODE_PAGE_SIZE);
        let markup = user_episodes(9, &page);
        let nav = &markup.inline_keyboard[markup.inline_keyboard.len() - 2];
        assert_eq!(nav.len(), 1);
        assert_eq!(callback_of(&nav[0]), Some("user:eps:9:0"));
        assert!(matches!(markup.inline_keyboard[0][0].kind, InlineKeyboardButtonKind::Url(_)));
    }

    #[test]
    fn test_episode_actions_nav_row_first() {
        let markup = episode_actions(5, 2, Some(4), None);
        assert_eq!(callback_of(&markup.inline_keyboard[0][0]), Some("admin:ep:4"));
        assert_eq!(markup.inline_keyboard[0].len(), 1);
        let back = markup.inline_keyboard.last().map(|row| &row[0]);
        assert_eq!(back.and_then(callback_of), Some("admin:eps:2:0"));
    }
}
