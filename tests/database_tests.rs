use anyhow::Result;
use manga_link_bot::database::{connection::DatabaseManager, models::*};
use sqlx::Row;
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

async fn new_title(db: &DatabaseManager, name: &str, owner: i64) -> Result<i64> {
    Title::create(&db.pool, name, owner)
        .await?
        .ok_or_else(|| anyhow::anyhow!("title {name} already exists"))
}

#[tokio::test]
async fn test_title_names_are_unique() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let id = new_title(&db, "One Piece", 1).await?;
    assert!(Title::create(&db.pool, "One Piece", 2).await?.is_none());

    let found = Title::find_by_name(&db.pool, "One Piece").await?.unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.created_by, 1);
    assert_eq!(Title::count(&db.pool).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_titles_listed_by_name_and_searched_without_case() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    new_title(&db, "Naruto", 1).await?;
    new_title(&db, "Bleach", 1).await?;
    new_title(&db, "one piece", 1).await?;

    let names: Vec<String> = Title::list_all(&db.pool)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Bleach", "Naruto", "one piece"]);

    let hits = Title::search(&db.pool, "PIECE").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "one piece");

    Ok(())
}

#[tokio::test]
async fn test_rename_outcomes() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let naruto = new_title(&db, "Naruto", 1).await?;
    new_title(&db, "Bleach", 1).await?;

    assert_eq!(Title::rename(&db.pool, naruto, "Bleach").await?, RenameOutcome::NameTaken);
    assert_eq!(Title::rename(&db.pool, naruto, "Naruto").await?, RenameOutcome::Renamed);
    assert_eq!(Title::rename(&db.pool, naruto, "Boruto").await?, RenameOutcome::Renamed);
    assert_eq!(Title::rename(&db.pool, 999, "Ghost").await?, RenameOutcome::NotFound);

    let renamed = Title::find_by_id(&db.pool, naruto).await?.unwrap();
    assert_eq!(renamed.name, "Boruto");

    Ok(())
}

#[tokio::test]
async fn test_deleting_title_cascades() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let title_id = new_title(&db, "Berserk", 1).await?;
    let episode_id = Episode::create(&db.pool, title_id, "ep1", "https://x.test/1", 1).await?;
    Admin::add(&db.pool, 5).await?;
    TitleAdmin::grant(&db.pool, title_id, 5).await?;
    MangaView::record(&db.pool, title_id, 7).await?;

    assert!(Title::delete(&db.pool, title_id).await?);
    assert!(!Title::delete(&db.pool, title_id).await?);

    assert!(Episode::find_by_id(&db.pool, episode_id).await?.is_none());
    assert!(TitleAdmin::user_ids_for_title(&db.pool, title_id).await?.is_empty());
    assert!(MangaView::top_titles(&db.pool, 10).await?.is_empty());
    assert!(Admin::exists(&db.pool, 5).await?);

    Ok(())
}

#[tokio::test]
async fn test_episode_ordering_and_neighbours() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let title_id = new_title(&db, "Berserk", 1).await?;
    let entries: Vec<(String, String)> = (1..=3)
        .map(|i| (format!("ep{i}"), format!("https://x.test/{i}")))
        .collect();
    assert_eq!(Episode::create_many(&db.pool, title_id, &entries, 1).await?, 3);

    let episodes = Episode::list_by_title(&db.pool, title_id).await?;
    let ids: Vec<i64> = episodes.iter().map(|e| e.id).collect();
    assert_eq!(episodes[0].name, "ep1");
    assert_eq!(ids.len(), 3);

    assert_eq!(Episode::prev_id(&db.pool, title_id, ids[0]).await?, None);
    assert_eq!(Episode::next_id(&db.pool, title_id, ids[0]).await?, Some(ids[1]));
    assert_eq!(Episode::prev_id(&db.pool, title_id, ids[2]).await?, Some(ids[1]));
    assert_eq!(Episode::next_id(&db.pool, title_id, ids[2]).await?, None);

    assert!(Episode::update(&db.pool, ids[1], "ep2b", "https://x.test/2b").await?);
    let updated = Episode::find_by_id(&db.pool, ids[1]).await?.unwrap();
    assert_eq!(updated.name, "ep2b");
    assert_eq!(updated.url, "https://x.test/2b");

    assert!(Episode::delete(&db.pool, ids[1]).await?);
    assert_eq!(Episode::next_id(&db.pool, title_id, ids[0]).await?, Some(ids[2]));

    Ok(())
}

#[tokio::test]
async fn test_episode_requires_existing_title() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let result = Episode::create(&db.pool, 404, "ep1", "https://x.test/1", 1).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_admin_and_grants_are_idempotent() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let title_id = new_title(&db, "Berserk", 1).await?;

    assert!(Admin::add(&db.pool, 42).await?);
    assert!(!Admin::add(&db.pool, 42).await?);
    assert_eq!(Admin::list_ids(&db.pool).await?, vec![42]);

    assert!(TitleAdmin::grant(&db.pool, title_id, 42).await?);
    assert!(!TitleAdmin::grant(&db.pool, title_id, 42).await?);
    assert!(TitleAdmin::is_granted(&db.pool, title_id, 42).await?);
    assert_eq!(TitleAdmin::user_ids_for_title(&db.pool, title_id).await?, vec![42]);
    assert!(TitleAdmin::title_ids_for_user(&db.pool, 42).await?.contains(&title_id));

    assert!(TitleAdmin::revoke(&db.pool, title_id, 42).await?);
    assert!(!TitleAdmin::revoke(&db.pool, title_id, 42).await?);
    assert!(Admin::remove(&db.pool, 42).await?);
    assert!(!Admin::exists(&db.pool, 42).await?);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_links_and_recent_links() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let a = new_title(&db, "Alpha", 1).await?;
    let b = new_title(&db, "Beta", 1).await?;
    Episode::create(&db.pool, a, "ep1", "https://x.test/same", 1).await?;
    Episode::create(&db.pool, b, "ep9", "https://x.test/same", 1).await?;
    let last = Episode::create(&db.pool, b, "ep10", "https://x.test/unique", 1).await?;

    let duplicates = Episode::duplicate_links(&db.pool).await?;
    assert_eq!(duplicates.len(), 2);
    assert!(duplicates.iter().all(|d| d.url == "https://x.test/same" && d.duplicate_count == 2));
    assert_eq!(duplicates[0].title_name, "Alpha");

    let recent = Episode::recent_links(&db.pool, 2).await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].episode_id, last);
    assert_eq!(recent[0].title_name, "Beta");

    Ok(())
}

#[tokio::test]
async fn test_update_reports() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let a = new_title(&db, "Alpha", 1).await?;
    let empty = new_title(&db, "Empty", 1).await?;
    Episode::create(&db.pool, a, "ep1", "https://x.test/1", 1).await?;
    Episode::create(&db.pool, a, "ep2", "https://x.test/2", 1).await?;

    let counts = Episode::update_counts_since(&db.pool, "2000-01-01T00:00:00").await?;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].title_name, "Alpha");
    assert_eq!(counts[0].added_episodes, 2);
    assert!(Episode::update_counts_since(&db.pool, "2999-01-01T00:00:00").await?.is_empty());

    let last = Episode::last_update_for_title(&db.pool, a).await?.unwrap();
    assert_eq!(last.total_links, 2);
    assert!(last.last_update_at.is_some());

    let none = Episode::last_update_for_title(&db.pool, empty).await?.unwrap();
    assert_eq!(none.total_links, 0);
    assert!(none.last_update_at.is_none());

    Ok(())
}

#[tokio::test]
async fn test_logs_and_usage_reports() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let a = new_title(&db, "Alpha", 1).await?;
    let b = new_title(&db, "Beta", 1).await?;

    AuditLog::record(&db.pool, 1, "add_title", "title_id=1").await?;
    AuditLog::record(&db.pool, 1, "delete_title", "title_id=1").await?;
    let audit = AuditLog::recent(&db.pool, 1).await?;
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "delete_title");

    for user in [10, 10, 20] {
        UsageLog::record(&db.pool, user, "mangalink").await?;
    }
    UsageLog::record(&db.pool, 30, "search").await?;
    let top = UsageLog::top_users_between(
        &db.pool,
        "mangalink",
        "2000-01-01T00:00:00",
        "2999-01-01T00:00:00",
        10,
    )
    .await?;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].user_id, 10);
    assert_eq!(top[0].usage_count, 2);

    MangaView::record(&db.pool, b, 1).await?;
    MangaView::record(&db.pool, b, 2).await?;
    MangaView::record(&db.pool, a, 1).await?;
    let views = MangaView::top_titles(&db.pool, 5).await?;
    assert_eq!(views[0].title_name, "Beta");
    assert_eq!(views[0].view_count, 2);

    Ok(())
}

#[tokio::test]
async fn test_legacy_schema_gains_missing_columns() -> Result<()> {
    let temp_dir = tempdir()?;
    let database_url = format!("sqlite:{}", temp_dir.path().join("legacy.db").display());
    let db = DatabaseManager::new(&database_url).await?;

    sqlx::query("CREATE TABLE titles (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, created_at TEXT NOT NULL)")
        .execute(&db.pool)
        .await?;
    sqlx::query("INSERT INTO titles (name, created_at) VALUES ('Old', '2020-01-01T00:00:00')")
        .execute(&db.pool)
        .await?;

    db.run_migrations().await?;

    let columns: Vec<String> = sqlx::query("PRAGMA table_info(titles)")
        .fetch_all(&db.pool)
        .await?
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();
    assert!(columns.contains(&"created_by".to_string()));

    let old = Title::find_by_name(&db.pool, "Old").await?.unwrap();
    assert_eq!(old.created_by, 0);

    assert!(!db.ensure_column("titles", "created_by", "INTEGER NOT NULL DEFAULT 0").await?);

    Ok(())
}
