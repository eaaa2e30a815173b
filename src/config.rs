use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "linkbot.db";
const DEFAULT_DONATE_IMAGE_PATH: &str = "donate_qr.png";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub super_admin_ids: HashSet<i64>,
    pub db_path: String,
    pub http_port: u16,
    pub auto_delete_after: Duration,
    pub probe_concurrency: usize,
    pub probe_timeout: Duration,
    pub report_utc_offset_hours: i32,
    pub donate_image_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("BOT_TOKEN")
            .or_else(|_| env::var("TELEGRAM_BOT_TOKEN"))
            .map_err(|_| anyhow!("BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("BOT_TOKEN must be set"));
        }

        let super_admin_ids = parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default());

        let db_path = env::var("DB_PATH")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let http_port = parse_var("HTTP_PORT", 3000u16)?;
        let auto_delete_secs = parse_var("AUTO_DELETE_SECONDS", 300u64)?;
        let probe_concurrency = parse_var("PROBE_CONCURRENCY", 10usize)?;
        if probe_concurrency == 0 {
            return Err(anyhow!("PROBE_CONCURRENCY must be greater than 0"));
        }
        let probe_timeout_secs = parse_var("PROBE_TIMEOUT_SECONDS", 12u64)?;
        let report_utc_offset_hours = parse_var("REPORT_UTC_OFFSET_HOURS", 7i32)?;
        if !(-23..=23).contains(&report_utc_offset_hours) {
            return Err(anyhow!("Invalid REPORT_UTC_OFFSET_HOURS"));
        }

        let donate_image_path = env::var("DONATE_IMAGE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DONATE_IMAGE_PATH.to_string());

        Ok(Config {
            bot_token: token.trim().to_string(),
            super_admin_ids,
            db_path,
            http_port,
            auto_delete_after: Duration::from_secs(auto_delete_secs),
            probe_concurrency,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            report_utc_offset_hours,
            donate_image_path: PathBuf::from(donate_image_path),
        })
    }

    /// Connection string for the SQLite file named by `DB_PATH`.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.db_path)
    }
}

/// Parses a comma-separated id list, silently dropping items that are not integers.
pub fn parse_admin_ids(raw: &str) -> HashSet<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| item.parse().ok())
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {}", name)),
        _ => Ok(default),
    }
}
