use anyhow::Result;
use manga_link_bot::database::{connection::DatabaseManager, models::*};
use manga_link_bot::services::access::AccessControl;
use manga_link_bot::services::permissions::{PermissionGate, Role};
use tempfile::{tempdir, TempDir};

const SUPER: i64 = 1;
const OWNER: i64 = 2;
const GRANTED: i64 = 3;
const STRANGER: i64 = 4;

async fn setup() -> Result<(AccessControl, DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let database_url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
    let db = DatabaseManager::new(&database_url).await?;
    db.run_migrations().await?;

    let gate = PermissionGate::new([SUPER].into_iter().collect());
    Ok((AccessControl::new(gate, db.pool.clone()), db, temp_dir))
}

#[tokio::test]
async fn test_roles_come_from_config_and_table() -> Result<()> {
    let (access, db, _temp_dir) = setup().await?;
    Admin::add(&db.pool, OWNER).await?;

    assert_eq!(access.role(SUPER).await?, Role::SuperAdmin);
    assert_eq!(access.role(OWNER).await?, Role::Admin);
    assert_eq!(access.role(STRANGER).await?, Role::User);
    assert!(access.is_admin(OWNER).await?);
    assert!(!access.is_admin(STRANGER).await?);

    Admin::remove(&db.pool, OWNER).await?;
    assert!(!access.is_admin(OWNER).await?);

    Ok(())
}

#[tokio::test]
async fn test_title_management_resolution_order() -> Result<()> {
    let (access, db, _temp_dir) = setup().await?;
    let title_id = Title::create(&db.pool, "Berserk", OWNER).await?.unwrap();
    let title = Title::find_by_id(&db.pool, title_id).await?.unwrap();
    TitleAdmin::grant(&db.pool, title_id, GRANTED).await?;

    assert!(access.can_manage_title(SUPER, &title).await?);
    assert!(access.can_manage_title(OWNER, &title).await?);
    assert!(access.can_manage_title(GRANTED, &title).await?);
    assert!(!access.can_manage_title(STRANGER, &title).await?);

    TitleAdmin::revoke(&db.pool, title_id, GRANTED).await?;
    assert!(!access.can_manage_title_id(GRANTED, title_id).await?);
    assert!(!access.can_manage_title_id(SUPER, 999).await?);

    Ok(())
}

#[tokio::test]
async fn test_manageable_filters_search_results() -> Result<()> {
    let (access, db, _temp_dir) = setup().await?;
    let own = Title::create(&db.pool, "Own", GRANTED).await?.unwrap();
    let shared = Title::create(&db.pool, "Shared", OWNER).await?.unwrap();
    Title::create(&db.pool, "Other", OWNER).await?.unwrap();
    TitleAdmin::grant(&db.pool, shared, GRANTED).await?;

    let all = Title::list_all(&db.pool).await?;
    let mut ids: Vec<i64> = access
        .manageable(GRANTED, all.clone())
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![own, shared]);

    assert_eq!(access.manageable(SUPER, all.clone()).await?.len(), 3);
    assert!(access.manageable(STRANGER, all).await?.is_empty());

    Ok(())
}
