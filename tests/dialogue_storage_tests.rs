use std::sync::Arc;
use std::time::Duration;

use manga_link_bot::bot::context::AppContext;
use manga_link_bot::bot::handlers::BotHandler;
use manga_link_bot::bot::session::{Pending, Session, SessionStorage};
use manga_link_bot::config::Config;
use manga_link_bot::database::connection::DatabaseManager;
use manga_link_bot::services::access::AccessControl;
use manga_link_bot::services::auto_delete::AutoDeleteService;
use manga_link_bot::services::link_probe::LinkProber;
use manga_link_bot::services::permissions::PermissionGate;
use teloxide::dispatching::dialogue::{InMemStorage, Storage};
use teloxide::prelude::*;
use tempfile::TempDir;

fn test_config() -> Config {
    Config {
        bot_token: "123:test".to_string(),
        super_admin_ids: [1].into_iter().collect(),
        db_path: "unused.db".to_string(),
        http_port: 0,
        auto_delete_after: Duration::from_secs(300),
        probe_concurrency: 2,
        probe_timeout: Duration::from_secs(1),
        report_utc_offset_hours: 7,
        donate_image_path: "missing.png".into(),
    }
}

#[tokio::test]
async fn test_dialogue_storage_setup() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    let config = Arc::new(test_config());
    let bot = Bot::new(&config.bot_token);
    let cleaner = AutoDeleteService::new(bot, config.auto_delete_after)
        .await
        .expect("Failed to create auto-delete service");
    let ctx = AppContext {
        access: AccessControl::new(PermissionGate::new(config.super_admin_ids.clone()), db.pool.clone()),
        prober: LinkProber::new(config.probe_concurrency, config.probe_timeout).expect("prober"),
        cleaner,
        config,
        db,
    };

    let handler = BotHandler::new(ctx);
    let _schema = handler.schema();
}

#[tokio::test]
async fn test_sessions_are_kept_per_user() {
    let storage: Arc<SessionStorage> = InMemStorage::new();
    let bulk = Session::waiting(Pending::BulkAdd {
        title_id: 3,
        buffer: String::new(),
    });

    storage
        .clone()
        .update_dialogue(ChatId(10), bulk.clone())
        .await
        .unwrap();

    let other = storage.clone().get_dialogue(ChatId(20)).await.unwrap();
    assert!(other.is_none());

    let mut stored = storage.clone().get_dialogue(ChatId(10)).await.unwrap().unwrap();
    assert_eq!(stored, bulk);
    assert!(stored.append_bulk("EP1\nhttps://x.test/1"));
    assert!(stored.append_bulk("EP2\nhttps://x.test/2"));
    storage.clone().update_dialogue(ChatId(10), stored).await.unwrap();

    let reloaded = storage.clone().get_dialogue(ChatId(10)).await.unwrap().unwrap();
    match reloaded.pending {
        Pending::BulkAdd { title_id, buffer } => {
            assert_eq!(title_id, 3);
            assert_eq!(buffer, "EP1\nhttps://x.test/1\nEP2\nhttps://x.test/2");
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(reloaded.auto_delete);

    storage.clone().remove_dialogue(ChatId(10)).await.unwrap();
    assert!(storage.get_dialogue(ChatId(10)).await.unwrap().is_none());
}
