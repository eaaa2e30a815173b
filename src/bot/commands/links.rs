use crate::bot::commands::admin::NOT_ADMIN;
use crate::bot::commands::resolve_title;
use crate::bot::context::AppContext;
use crate::bot::HandlerResult;
use crate::database::models::{Episode, EpisodeLink};
use crate::services::link_probe::ProbeReport;
use crate::utils::feedback::Reply;
use crate::utils::logging::{log_command_success, log_validation_error};
use crate::utils::text::RULE;
use crate::utils::validation::display_episode_name;

pub const SCAN_DEFAULT: i64 = 50;
pub const SCAN_MAX: i64 = 1000;

/// Which stored links a `/badlinks` run checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// The `n` most recently added links.
    Recent(i64),
    All,
}

impl ScanScope {
    pub fn label(&self) -> &'static str {
        match self {
            ScanScope::Recent(_) => "recent",
            ScanScope::All => "all",
        }
    }

    /// Number of rows to load, given the catalog size.
    pub fn limit(&self, total_episodes: i64) -> i64 {
        match self {
            ScanScope::Recent(n) => (*n).min(SCAN_MAX),
            ScanScope::All => total_episodes.min(SCAN_MAX),
        }
    }
}

pub fn parse_scan_scope(args: &str) -> Result<ScanScope, &'static str> {
    let mut parts = args.split_whitespace();
    let (arg, extra) = (parts.next(), parts.next());
    match (arg, extra) {
        (None, _) => Ok(ScanScope::Recent(SCAN_DEFAULT)),
        (Some(_), Some(_)) => Err("Usage: /badlinks [n|all]"),
        (Some(arg), None) if arg.eq_ignore_ascii_case("all") => Ok(ScanScope::All),
        (Some(arg), None) => {
            let n: i64 = arg.parse().map_err(|_| "n must be a number or 'all'.")?;
            if n <= 0 {
                return Err("n must be greater than 0.");
            }
            Ok(ScanScope::Recent(n))
        }
    }
}

fn report_header(lines: &mut Vec<String>, checked: String, broken: usize) {
    lines.push(checked);
    lines.push(format!("Broken/timeout: {broken}"));
    lines.push(String::new());
}

pub fn dead_link_report(scope: ScanScope, checked: usize, dead: &[ProbeReport<EpisodeLink>]) -> String {
    let mut lines = vec!["🔗 Dead Link Check".to_string(), RULE.to_string()];
    report_header(
        &mut lines,
        format!("Checked: {checked} {} link(s)", scope.label()),
        dead.len(),
    );
    if dead.is_empty() {
        return format!("{}\nNo dead links found.", lines.join("\n").trim());
    }
    for (idx, report) in dead.iter().enumerate() {
        let link = &report.item;
        lines.push(format!(
            "{}. {} | {}",
            idx + 1,
            link.title_name,
            display_episode_name(&link.episode_name)
        ));
        lines.push(format!("   Reason: {}", report.outcome.reason));
        lines.push(format!("   URL: {}", link.url));
    }
    lines.join("\n")
}

pub fn title_link_report(title_name: &str, checked: usize, dead: &[ProbeReport<Episode>]) -> String {
    let mut lines = vec![
        "🔗 Title Link Check".to_string(),
        RULE.to_string(),
        format!("Title: {title_name}"),
    ];
    report_header(&mut lines, format!("Checked: {checked} link(s)"), dead.len());
    if dead.is_empty() {
        return format!("{}\nNo dead links found.", lines.join("\n").trim());
    }
    for (idx, report) in dead.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, display_episode_name(&report.item.name)));
        lines.push(format!("   Reason: {}", report.outcome.reason));
        lines.push(format!("   URL: {}", report.item.url));
    }
    lines.join("\n")
}

pub async fn handle_bad_links(ctx: &AppContext, reply: &Reply, user_id: i64, args: &str) -> HandlerResult {
    if !ctx.access.is_admin(user_id).await? {
        reply.text(NOT_ADMIN).await?;
        return Ok(());
    }
    let scope = match parse_scan_scope(args) {
        Ok(scope) => scope,
        Err(message) => {
            log_validation_error("badlinks", args, message, user_id);
            reply.text(message).await?;
            return Ok(());
        }
    };

    let total = Episode::count(ctx.pool()).await?;
    let rows = Episode::recent_links(ctx.pool(), scope.limit(total)).await?;
    if rows.is_empty() {
        reply.text("No episodes found.").await?;
        return Ok(());
    }

    let checked = rows.len();
    let reports = ctx.prober.check_all(rows, |link| link.url.as_str()).await;
    let dead: Vec<ProbeReport<EpisodeLink>> = reports.into_iter().filter(|r| !r.outcome.alive).collect();
    log_command_success(
        "badlinks",
        user_id,
        Some(&format!("checked={checked}, dead={}", dead.len())),
    );
    reply.long_text(&dead_link_report(scope, checked, &dead)).await?;
    Ok(())
}

pub async fn handle_check_title_links(ctx: &AppContext, reply: &Reply, user_id: i64, raw: &str) -> HandlerResult {
    if !ctx.access.is_admin(user_id).await? {
        reply.text(NOT_ADMIN).await?;
        return Ok(());
    }
    let raw = raw.trim();
    if raw.is_empty() {
        reply.text("Usage: /checktitlelinks <manga title>").await?;
        return Ok(());
    }
    let Some(title) = resolve_title(ctx, reply, raw).await? else {
        return Ok(());
    };
    if !ctx.access.can_manage_title(user_id, &title).await? {
        reply.text("You cannot check links for this manga.").await?;
        return Ok(());
    }

    let episodes = Episode::list_by_title(ctx.pool(), title.id).await?;
    if episodes.is_empty() {
        reply.text(format!("{} - No episodes yet.", title.name)).await?;
        return Ok(());
    }

    let checked = episodes.len();
    let reports = ctx.prober.check_all(episodes, |ep| ep.url.as_str()).await;
    let dead: Vec<ProbeReport<Episode>> = reports.into_iter().filter(|r| !r.outcome.alive).collect();
    reply.long_text(&title_link_report(&title.name, checked, &dead)).await?;
    Ok(())
}
