//! # Manga Link Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the catalog database,
//! starts the auto-delete service and runs the Telegram bot next to the
//! health check server.

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod database;
mod services;
mod utils;

use crate::bot::commands::Command;
use crate::bot::context::AppContext;
use crate::bot::errors::BotErrorHandler;
use crate::bot::handlers::BotHandler;
use crate::bot::session::Session;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::services::access::AccessControl;
use crate::services::auto_delete::AutoDeleteService;
use crate::services::health;
use crate::services::link_probe::LinkProber;
use crate::services::permissions::PermissionGate;
use crate::utils::logging::log_system_event;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manga_link_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    info!("Starting Manga Link Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, super admins: {}",
        config.db_path,
        config.http_port,
        config.super_admin_ids.len()
    );
    if config.super_admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS is empty - admin commands are disabled");
    }

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url()).await?;
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let bot = Bot::new(&config.bot_token);

    let mut cleaner = AutoDeleteService::new(bot.clone(), config.auto_delete_after)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create auto-delete service: {}", e))?;
    if let Err(e) = cleaner.start().await {
        tracing::error!("Failed to start auto-delete service: {}", e);
    }

    let prober = LinkProber::new(config.probe_concurrency, config.probe_timeout)?;
    let gate = PermissionGate::new(config.super_admin_ids.clone());
    let ctx = AppContext {
        db: db_arc.as_ref().clone(),
        access: AccessControl::new(gate, db_arc.pool.clone()),
        prober,
        cleaner: cleaner.clone(),
        config: config.clone(),
    };
    let handler = BotHandler::new(ctx);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Could not publish the command list: {}", e);
    }
    log_system_event("bot_ready", Some(&format!("probe concurrency {}", config.probe_concurrency)));

    let health_router = health::router(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![InMemStorage::<Session>::new()])
            .error_handler(BotErrorHandler::shared())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = cleaner.stop().await {
        tracing::warn!("Error stopping auto-delete service: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
