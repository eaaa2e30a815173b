use anyhow::{anyhow, Result};
use manga_link_bot::config::Config;
use manga_link_bot::database::connection::DatabaseManager;
use std::env;
use std::io;
use std::path::Path;

const FALLBACK_DB_PATH: &str = "linkbot.db";

/// Tables the bot reads and writes.
const CATALOG_TABLES: &[&str] = &[
    "admins",
    "audit_logs",
    "episodes",
    "manga_views",
    "title_admins",
    "titles",
    "usage_logs",
];

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

/// `DB_PATH` from the full configuration, or from the environment alone when
/// the bot token is not available to this tool.
fn db_path() -> String {
    dotenvy::dotenv().ok();
    match Config::from_env() {
        Ok(config) => config.db_path,
        Err(e) => {
            log::debug!("Falling back to DB_PATH only: {}", e);
            env::var("DB_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_DB_PATH.to_string())
        }
    }
}

async fn run_migrations() -> Result<()> {
    println!("📚 Manga Link Bot - Database Migration Tool");
    println!("===========================================");

    let path = db_path();
    println!("📊 Database file: {path}");

    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            println!("📁 Creating directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("🚀 Running database migrations...");
    let db_manager = DatabaseManager::new(&format!("sqlite:{path}"))
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db_manager.run_migrations().await {
        Ok(_) => println!("✅ Migrations completed successfully!"),
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let path = db_path();
    println!("📊 Database file: {path}");

    let db_manager = DatabaseManager::new(&format!("sqlite:{path}"))
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match missing_tables(&db_manager).await {
        Ok(missing) if missing.is_empty() => {
            println!("✅ Catalog schema is complete ({} tables).", CATALOG_TABLES.len());
        }
        Ok(missing) => {
            println!("⚠️  Missing tables: {}", missing.join(", "));
            println!("💡 Try running 'migrate up' to create the schema");
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL manga, episodes, admins and logs!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    let path = db_path();
    if Path::new(&path).exists() {
        std::fs::remove_file(&path)?;
        println!("🗑️  Deleted database file: {path}");
    }

    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");
    Ok(())
}

async fn missing_tables(db_manager: &DatabaseManager) -> Result<Vec<&'static str>> {
    let present = sqlx::query_scalar::<_, String>("SELECT name FROM sqlite_master WHERE type = 'table'")
        .fetch_all(&db_manager.pool)
        .await?;
    Ok(CATALOG_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|name| name == table))
        .collect())
}

fn print_help() {
    println!("📚 Manga Link Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and schema");
    println!("    reset          Reset database - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DB_PATH        SQLite database file (default: {FALLBACK_DB_PATH})");
    println!();
}
