pub mod admin;
pub mod browse;
pub mod links;
pub mod reports;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::context::AppContext;
use crate::bot::HandlerError;
use crate::database::models::{pick_title, Title, TitleMatch};
use crate::utils::feedback::Reply;

/// Longest list of candidate names shown for an ambiguous title argument.
const AMBIGUOUS_PREVIEW: usize = 10;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Manga Link Bot commands:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "show all commands")]
    Help,
    #[command(description = "cancel current admin input")]
    Cancel,
    #[command(description = "browse manga")]
    MangaLink,
    #[command(description = "list all manga")]
    ListManga,
    #[command(description = "search manga title")]
    Search(String),
    #[command(description = "manga/link updates by day range")]
    MangaUpdated(String),
    #[command(description = "show latest update of one manga")]
    LastUpdate(String),
    #[command(description = "generate episode labels, e.g. 1-10")]
    ListEp(String),
    #[command(description = "get your ID or the replied user's ID")]
    GetUserId,
    #[command(description = "donation QR")]
    DonateAdmin,
    #[command(description = "admin panel")]
    MangaAdmin,
    #[command(description = "search manageable manga")]
    SearchByAdmin(String),
    #[command(description = "find same links used in episodes")]
    FindDuplicateLink,
    #[command(description = "check links for one manga")]
    CheckTitleLinks(String),
    #[command(description = "check non-working links")]
    BadLinks(String),
    #[command(description = "check non-working links")]
    DeadLinks(String),
    #[command(description = "top manga by open count")]
    TopManga(String),
    #[command(description = "top users by command usage per month")]
    Daily(String),
    #[command(description = "show recent admin activity logs")]
    AuditLog(String),
    #[command(description = "add admin (main admins only)")]
    AddAdmin(String),
    #[command(description = "remove admin (main admins only)")]
    RemoveAdmin(String),
    #[command(description = "grant one manga to an admin")]
    AddMangaAdmin(String),
    #[command(description = "revoke one manga from an admin")]
    RemoveMangaAdmin(String),
    #[command(description = "list admins (main admins only)")]
    ListAdmin,
    #[command(description = "finish bulk add input")]
    Done,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Cancel => "cancel",
            Command::MangaLink => "mangalink",
            Command::ListManga => "listmanga",
            Command::Search(_) => "search",
            Command::MangaUpdated(_) => "mangaupdated",
            Command::LastUpdate(_) => "lastupdate",
            Command::ListEp(_) => "listep",
            Command::GetUserId => "getuserid",
            Command::DonateAdmin => "donateadmin",
            Command::MangaAdmin => "mangaadmin",
            Command::SearchByAdmin(_) => "searchbyadmin",
            Command::FindDuplicateLink => "findduplicatelink",
            Command::CheckTitleLinks(_) => "checktitlelinks",
            Command::BadLinks(_) => "badlinks",
            Command::DeadLinks(_) => "deadlinks",
            Command::TopManga(_) => "topmanga",
            Command::Daily(_) => "daily",
            Command::AuditLog(_) => "auditlog",
            Command::AddAdmin(_) => "addadmin",
            Command::RemoveAdmin(_) => "removeadmin",
            Command::AddMangaAdmin(_) => "addmangaadmin",
            Command::RemoveMangaAdmin(_) => "removemangaadmin",
            Command::ListAdmin => "listadmin",
            Command::Done => "done",
        }
    }

    /// Admin commands turn auto-delete on for the chat.
    pub fn is_admin_flow(&self) -> bool {
        matches!(
            self,
            Command::MangaAdmin
                | Command::SearchByAdmin(_)
                | Command::FindDuplicateLink
                | Command::CheckTitleLinks(_)
                | Command::BadLinks(_)
                | Command::DeadLinks(_)
                | Command::TopManga(_)
                | Command::Daily(_)
                | Command::AuditLog(_)
                | Command::AddAdmin(_)
                | Command::RemoveAdmin(_)
                | Command::AddMangaAdmin(_)
                | Command::RemoveMangaAdmin(_)
                | Command::ListAdmin
                | Command::Done
        )
    }

    /// Every command except `/done` drops whatever input was pending.
    pub fn resets_pending(&self) -> bool {
        !matches!(self, Command::Done)
    }

    /// `/cancel` and `/done` replies expire even outside admin flows.
    pub fn forces_expiry(&self) -> bool {
        matches!(self, Command::Cancel | Command::Done)
    }

    /// Only `/mangalink` is counted for the monthly usage report.
    pub fn is_tracked(&self) -> bool {
        matches!(self, Command::MangaLink)
    }
}

pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from().map(|user| user.id.0 as i64)
}

pub fn ambiguous_titles_message(raw: &str, titles: &[Title]) -> String {
    let names: Vec<String> = titles
        .iter()
        .take(AMBIGUOUS_PREVIEW)
        .map(|t| format!("- {}", t.name))
        .collect();
    let suffix = if titles.len() > AMBIGUOUS_PREVIEW { "\n..." } else { "" };
    format!(
        "Multiple manga matched '{raw}'. Please use full title:\n{}{suffix}",
        names.join("\n")
    )
}

/// Resolves a free-text title argument, replying on a miss or an ambiguous match.
pub async fn resolve_title(
    ctx: &AppContext,
    reply: &Reply,
    raw: &str,
) -> Result<Option<Title>, HandlerError> {
    let matches = Title::search(ctx.pool(), raw).await?;
    match pick_title(matches, raw) {
        TitleMatch::Found(title) => Ok(Some(title)),
        TitleMatch::NotFound => {
            reply.text(format!("Manga not found: {raw}")).await?;
            Ok(None)
        }
        TitleMatch::Ambiguous(titles) => {
            reply.text(ambiguous_titles_message(raw, &titles)).await?;
            Ok(None)
        }
    }
}
