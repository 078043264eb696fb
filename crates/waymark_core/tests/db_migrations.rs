use waymark_core::db::migrations::latest_version;
use waymark_core::db::{open_db, open_db_in_memory, DbError};
use waymark_core::repo::project_repo::SqliteProjectRepository;
use waymark_core::{Collection, Project, ProjectRepository, TransportMode};

#[test]
fn fresh_database_lands_on_latest_version_with_all_tables() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    for collection in Collection::CLAIM_ORDER {
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {};", collection.table()),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
    }
}

#[test]
fn reopening_a_file_database_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("waymark.db");

    let project = Project::new("Harbor loop", "en", TransportMode::Walking);
    {
        let conn = open_db(&db_path).unwrap();
        SqliteProjectRepository::new(&conn)
            .create_project(&project)
            .unwrap();
    }

    let conn = open_db(&db_path).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    let loaded = SqliteProjectRepository::new(&conn)
        .get_project(project.id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name, "Harbor loop");
}

#[test]
fn database_from_a_newer_binary_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("waymark.db");

    {
        let conn = open_db(&db_path).unwrap();
        conn.execute_batch(&format!(
            "PRAGMA user_version = {};",
            latest_version() + 1
        ))
        .unwrap();
    }

    let err = open_db(&db_path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, .. } if db_version == latest_version() + 1
    ));
}

#[test]
fn foreign_keys_pragma_is_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}
