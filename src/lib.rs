//! # Manga Link Bot
//!
//! A Telegram bot that keeps a catalog of manga titles and their episode links.
//!
//! ## Features
//! - Browse titles and open episode links from inline keyboards
//! - Admin panel for adding, editing, bulk-importing and deleting episodes
//! - Three-tier permissions: configured super admins, added admins, per-title grants
//! - Dead-link and duplicate-link reports with bounded concurrent probing
//! - Usage, view and audit reports; bot messages expire automatically

/// Command and callback handlers, keyboards and per-chat sessions
pub mod bot;
/// Configuration loaded from environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Background and shared services: auto-delete, link probing, permissions, health
pub mod services;
/// Helpers for parsing, validation, dates, pagination and replies
pub mod utils;
