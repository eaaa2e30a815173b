use manga_link_bot::config::Config;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

// Config tests share process-wide environment variables.
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "BOT_TOKEN",
    "TELEGRAM_BOT_TOKEN",
    "ADMIN_IDS",
    "DB_PATH",
    "HTTP_PORT",
    "AUTO_DELETE_SECONDS",
    "PROBE_CONCURRENCY",
    "PROBE_TIMEOUT_SECONDS",
    "REPORT_UTC_OFFSET_HOURS",
    "DONATE_IMAGE_PATH",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("BOT_TOKEN", " test_token_123 ");
    env::set_var("ADMIN_IDS", "11, 22,oops");
    env::set_var("DB_PATH", "data/links.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("AUTO_DELETE_SECONDS", "60");
    env::set_var("PROBE_CONCURRENCY", "4");
    env::set_var("PROBE_TIMEOUT_SECONDS", "5");
    env::set_var("REPORT_UTC_OFFSET_HOURS", "-3");
    env::set_var("DONATE_IMAGE_PATH", "qr.png");

    let config = Config::from_env().unwrap();

    assert_eq!(config.bot_token, "test_token_123");
    assert_eq!(config.super_admin_ids.len(), 2);
    assert!(config.super_admin_ids.contains(&22));
    assert_eq!(config.db_path, "data/links.db");
    assert_eq!(config.database_url(), "sqlite:data/links.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.auto_delete_after, Duration::from_secs(60));
    assert_eq!(config.probe_concurrency, 4);
    assert_eq!(config.probe_timeout, Duration::from_secs(5));
    assert_eq!(config.report_utc_offset_hours, -3);
    assert_eq!(config.donate_image_path.to_str(), Some("qr.png"));

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.bot_token, "required_token");
    assert!(config.super_admin_ids.is_empty());
    assert_eq!(config.db_path, "linkbot.db");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.auto_delete_after, Duration::from_secs(300));
    assert_eq!(config.probe_concurrency, 10);
    assert_eq!(config.probe_timeout, Duration::from_secs(12));
    assert_eq!(config.report_utc_offset_hours, 7);

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("BOT_TOKEN must be set"));

    env::set_var("BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_invalid_numbers() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("BOT_TOKEN", "test_token");

    env::set_var("HTTP_PORT", "invalid_port");
    let error = Config::from_env().unwrap_err().to_string();
    assert!(error.contains("Invalid HTTP_PORT"));
    env::remove_var("HTTP_PORT");

    env::set_var("PROBE_CONCURRENCY", "0");
    assert!(Config::from_env().is_err());
    env::remove_var("PROBE_CONCURRENCY");

    env::set_var("REPORT_UTC_OFFSET_HOURS", "30");
    let error = Config::from_env().unwrap_err().to_string();
    assert!(error.contains("REPORT_UTC_OFFSET_HOURS"));

    clear_env();
}
