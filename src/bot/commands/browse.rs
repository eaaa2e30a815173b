use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::commands::{resolve_title, sender_id};
use crate::bot::context::AppContext;
use crate::bot::keyboards::{self, TITLE_PAGE_SIZE};
use crate::bot::HandlerResult;
use crate::database::models::{Episode, Title};
use crate::utils::datetime::{days_ago, format_local, parse_iso, update_window};
use crate::utils::feedback::Reply;
use crate::utils::logging::log_validation_error;
use crate::utils::pagination::paginate;
use crate::utils::text::{to_khmer_digits, RULE};
use crate::utils::validation::{parse_days_back, parse_episode_range, EP_PREFIX, MAX_EPISODE_SPAN};

/// "Titles:" heading of the browse menu.
pub const LABEL_TITLES: &str = "\u{1794}\u{1789}\u{17D2}\u{1785}\u{17B8}\u{179A}\u{17BF}\u{1784}\u{17D6}";
/// "All episodes" suffix of an episode grid heading.
pub const LABEL_ALL_EPS: &str =
    "\u{1797}\u{17B6}\u{1782}\u{1791}\u{17B6}\u{17C6}\u{1784}\u{17A2}\u{179F}\u{17CB}";

const DONATE_CAPTION: &str = "Donate via QR code\nDeveloped by @Mean_Un";

pub fn start_text() -> String {
    format!(
        "📚 𝗪𝗲𝗹𝗰𝗼𝗺𝗲 𝘁𝗼 𝗟𝗶𝗻𝗸 𝗕𝗼𝘁\n\
         {RULE}\n\
         Store manga, episodes, and links in one place.\n\n\
         🚀 Quick Start\n\
         • /mangalink - browse manga and open links\n\
         • /listmanga - view all manga titles\n\
         • /search <keyword> - find manga fast\n\
         • /mangaupdated [n] - see recent updates\n\
         • /lastupdate <manga title> - latest update time\n\n\
         🧰 Useful Tools\n\
         • /listep 1-10 - generate episode labels\n\
         • /getuserid - get your ID or replied user's ID\n\n\
         🔐 Admin: /mangaadmin\n\
         💖 Support: /donateadmin\n\
         👨‍💻 Developed by @Mean_Un"
    )
}

pub fn help_text() -> String {
    format!(
        "📖 𝗛𝗲𝗹𝗽 𝗠𝗲𝗻𝘂\n\
         {RULE}\n\
         👤 User Commands\n\
         • /start - welcome message\n\
         • /mangalink - browse manga\n\
         • /listmanga - list all manga\n\
         • /search <keyword> - search manga title\n\
         • /mangaupdated [n] - manga/link updates by day range\n\
         • /lastupdate <manga title> - show latest update of one manga\n\
         • /listep 1-10 - generate episode labels\n\
         • /getuserid - get user ID\n\n\
         🛠️ Admin Commands\n\
         • /mangaadmin - admin panel\n\
         • /searchbyadmin <keyword> - search manageable manga\n\
         • /findduplicatelink - find same links used in episodes\n\
         • /checktitlelinks <manga title> - check links for one manga\n\
         • /topmanga [n] - top manga by open count\n\
         • /badlinks [n|all] - check non-working links\n\
         • /daily [YYYY-MM] - top users by command usage per month\n\
         • /auditlog [n] - show recent admin activity logs\n\
         • /addadmin <user_id> - add admin (main admins only)\n\
         • /removeadmin <user_id> - remove admin (main admins only)\n\
         • /addmangaadmin <title> | <user_id/@username>\n\
         • /removemangaadmin <title> | <user_id/@username>\n\
         • /listadmin - list admins (main admins only)\n\
         • /cancel - cancel current admin input\n\
         • /done - finish bulk add input\n\n\
         📌 Admin Rules\n\
         • Main admins can manage all data\n\
         • Added admins manage only assigned/created manga\n\
         • Added admins cannot add/remove other admins\n\n\
         💖 Support\n\
         • /donateadmin - donation QR\n\n\
         👨‍💻 Developed by @Mean_Un"
    )
}

pub async fn handle_manga_link(ctx: &AppContext, reply: &Reply) -> HandlerResult {
    let titles = Title::list_all(ctx.pool()).await?;
    if titles.is_empty() {
        reply.text("No manga yet.").await?;
        return Ok(());
    }
    let page = paginate(&titles, 0, TITLE_PAGE_SIZE);
    reply.markup(LABEL_TITLES, keyboards::user_titles(&page)).await?;
    Ok(())
}

pub async fn handle_list_manga(ctx: &AppContext, reply: &Reply) -> HandlerResult {
    let titles = Title::list_all(ctx.pool()).await?;
    if titles.is_empty() {
        reply.text("No manga yet.").await?;
        return Ok(());
    }
    let mut lines = vec!["📚 Manga List".to_string(), RULE.to_string()];
    lines.extend(
        titles
            .iter()
            .enumerate()
            .map(|(idx, t)| format!("{}. {}", idx + 1, t.name)),
    );
    reply.long_text(&lines.join("\n")).await?;
    Ok(())
}

pub async fn handle_search(ctx: &AppContext, reply: &Reply, query: &str) -> HandlerResult {
    let query = query.trim();
    if query.is_empty() {
        reply.text("Usage: /search <keyword>").await?;
        return Ok(());
    }
    if Title::count(ctx.pool()).await? == 0 {
        reply.text("No manga yet.").await?;
        return Ok(());
    }

    let matched = Title::search(ctx.pool(), query).await?;
    if matched.is_empty() {
        reply.text(format!("No manga found for: {query}")).await?;
        return Ok(());
    }

    let shown = &matched[..matched.len().min(TITLE_PAGE_SIZE)];
    let mut text = format!("Search results for '{query}' ({} found):", matched.len());
    if matched.len() > TITLE_PAGE_SIZE {
        text.push_str(&format!(
            "\nShowing first {TITLE_PAGE_SIZE}. Refine your keyword for fewer results."
        ));
    }
    reply.markup(text, keyboards::user_title_results(shown)).await?;
    Ok(())
}

pub async fn handle_manga_updated(ctx: &AppContext, reply: &Reply, user_id: i64, args: &str) -> HandlerResult {
    if args.split_whitespace().count() > 1 {
        reply.text("Usage: /mangaupdated [n]\nExample: /mangaupdated 1").await?;
        return Ok(());
    }
    let days_back = match parse_days_back(args) {
        Ok(days) => days,
        Err(e) => {
            log_validation_error("mangaupdated", args, &e.to_string(), user_id);
            reply.text(e.to_string()).await?;
            return Ok(());
        }
    };

    let Some(window) = update_window(Utc::now(), days_back, ctx.utc_offset()) else {
        reply.text("n is too large.").await?;
        return Ok(());
    };
    let rows = Episode::update_counts_since(ctx.pool(), &window.start_iso).await?;

    let header = if days_back == 0 {
        format!(
            "📊 𝗠𝗮𝗻𝗴𝗮 𝗨𝗽𝗱𝗮𝘁𝗲 𝗥𝗲𝗽𝗼𝗿𝘁\n{RULE}\n🗓️ Date: {}\n📆 Today",
            window.today
        )
    } else {
        format!(
            "📊 𝗠𝗮𝗻𝗴𝗮 𝗨𝗽𝗱𝗮𝘁𝗲 𝗥𝗲𝗽𝗼𝗿𝘁\n{RULE}\n🗓️ Range: {} to {}\n📆 {} day(s)",
            window.start_date,
            window.today,
            days_back + 1
        )
    };

    if rows.is_empty() {
        reply
            .text(format!(
                "{header}\n📚 Manga updated: 0\n🔗 Links updated: 0\n{RULE}\nNo updates in this period."
            ))
            .await?;
        return Ok(());
    }

    let total: i64 = rows.iter().map(|r| r.added_episodes).sum();
    let mut lines = vec![
        header,
        format!("📚 Manga updated: {}", rows.len()),
        format!("🔗 Links updated: {total}"),
        RULE.to_string(),
    ];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, row.title_name));
        lines.push(format!("   🔗 Added {} Links", row.added_episodes));
    }
    reply.long_text(&lines.join("\n")).await?;
    Ok(())
}

pub async fn handle_last_update(ctx: &AppContext, reply: &Reply, raw: &str) -> HandlerResult {
    let raw = raw.trim();
    if raw.is_empty() {
        reply.text("Usage: /lastupdate <manga title>").await?;
        return Ok(());
    }
    let Some(title) = resolve_title(ctx, reply, raw).await? else {
        return Ok(());
    };

    let stat = Episode::last_update_for_title(ctx.pool(), title.id).await?;
    let last = stat
        .as_ref()
        .and_then(|s| s.last_update_at.as_deref())
        .and_then(parse_iso);

    let (Some(stat), Some(last)) = (stat.as_ref(), last) else {
        reply
            .text(format!(
                "🕒 𝗠𝗮𝗻𝗴𝗮 𝗟𝗮𝘀𝘁 𝗨𝗽𝗱𝗮𝘁𝗲\n{RULE}\n📚 Title: {}\n🕐 Last update: No links yet\n🔗 Total links: 0",
                title.name
            ))
            .await?;
        return Ok(());
    };

    let offset = ctx.utc_offset();
    reply
        .text(format!(
            "🕒 𝗠𝗮𝗻𝗴𝗮 𝗟𝗮𝘀𝘁 𝗨𝗽𝗱𝗮𝘁𝗲\n{RULE}\n📚 Title: {}\n🕐 Last update: {}\n📆 Count day ago: {} day(s)\n🔗 Total links: {}",
            stat.title_name,
            format_local(&last, offset),
            days_ago(&last, Utc::now(), offset),
            stat.total_links
        ))
        .await?;
    Ok(())
}

/// Renders `ភាគ០១`-style labels for an inclusive range, separated by blank lines.
pub fn episode_labels(start: u32, end: u32) -> String {
    (start..=end)
        .map(|n| format!("{EP_PREFIX}{}", to_khmer_digits(n, 2)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn handle_list_ep(reply: &Reply, args: &str) -> HandlerResult {
    match parse_episode_range(args) {
        Some((start, end)) => reply.long_text(&episode_labels(start, end)).await?,
        None => {
            reply
                .text(format!("Usage: /listep 1-10\nAt most {MAX_EPISODE_SPAN} episodes at a time."))
                .await?;
        }
    }
    Ok(())
}

/// Replies with the id of the replied-to user, or of the sender.
pub async fn handle_get_user_id(reply: &Reply, msg: &Message) -> HandlerResult {
    let target = msg
        .reply_to_message()
        .and_then(|replied| replied.from())
        .map(|user| user.id.0 as i64)
        .or_else(|| sender_id(msg));
    match target {
        Some(id) => reply.text(format!("User ID: {id}")).await?,
        None => reply.text("User not found.").await?,
    };
    Ok(())
}

pub async fn handle_donate(ctx: &AppContext, reply: &Reply) -> HandlerResult {
    let path = ctx.config.donate_image_path.as_path();
    if reply.photo(path, DONATE_CAPTION).await?.is_none() {
        tracing::warn!("Donation image missing at {}", path.display());
        reply
            .text(format!("Donation QR image not found: {}", path.display()))
            .await?;
    }
    Ok(())
}
