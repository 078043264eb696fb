use std::collections::BTreeSet;
use waymark_core::db::open_db_in_memory;
use waymark_core::model::extent::Extent;
use waymark_core::model::media::{Media, MediaKind, Thumbnail};
use waymark_core::model::poi::Poi;
use waymark_core::repo::extent_repo::{ExtentRepository, SqliteExtentRepository};
use waymark_core::repo::media_repo::{
    MediaRepository, SqliteMediaRepository, SqliteThumbnailRepository, ThumbnailRepository,
};
use waymark_core::repo::poi_repo::{PoiRepository, SqlitePoiRepository};
use waymark_core::repo::project_repo::SqliteProjectRepository;
use waymark_core::{
    claim_all_local_collections, ClaimError, Collection, EventRecorder, Project,
    ProjectRepository, TransportMode,
};

fn seed_full_store(conn: &rusqlite::Connection) -> (Project, Poi) {
    let projects = SqliteProjectRepository::new(conn);
    let pois = SqlitePoiRepository::new(conn);
    let media = SqliteMediaRepository::new(conn);
    let thumbnails = SqliteThumbnailRepository::new(conn);
    let extents = SqliteExtentRepository::new(conn);

    let project = Project::new("Harbor loop", "en", TransportMode::Walking);
    projects.create_project(&project).unwrap();
    let poi = Poi::new(project.id, 48.85, 2.35);
    pois.create_poi(&poi).unwrap();
    media
        .create_media(&Media::new(poi.id, MediaKind::Image, "https://cdn/a.jpg"))
        .unwrap();
    thumbnails
        .create_thumbnail(&Thumbnail::new(
            project.id,
            MediaKind::Image,
            "https://cdn/cover.jpg",
        ))
        .unwrap();
    extents
        .create_extent(&Extent::new(project.id, 48.0, 49.0, 2.0, 3.0))
        .unwrap();

    (project, poi)
}

fn count_unowned(conn: &rusqlite::Connection, table: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE owner_id IS NULL;"),
        [],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn claims_every_unowned_record_in_every_collection() {
    let conn = open_db_in_memory().unwrap();
    seed_full_store(&conn);
    let recorder = EventRecorder::new();

    let summary = claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();
    assert_eq!(summary.total_claimed(), 5);
    assert_eq!(summary.total_failed(), 0);

    for collection in Collection::CLAIM_ORDER {
        assert_eq!(count_unowned(&conn, collection.table()), 0);
        let owned: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE owner_id = 'ada@example.org';",
                    collection.table()
                ),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(owned, 1);
    }
}

#[test]
fn second_pass_claims_nothing_even_for_another_identity() {
    let conn = open_db_in_memory().unwrap();
    seed_full_store(&conn);
    let recorder = EventRecorder::new();

    claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();
    let second = claim_all_local_collections(&conn, "grace@example.org", &recorder).unwrap();
    assert_eq!(second.total_claimed(), 0);

    let stolen: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM projects WHERE owner_id = 'grace@example.org';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stolen, 0);
}

#[test]
fn already_owned_records_are_not_examined() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);

    let mut owned = Project::new("Owned", "en", TransportMode::Walking);
    owned.owner_id = Some("grace@example.org".to_string());
    projects.create_project(&owned).unwrap();
    projects
        .create_project(&Project::new("Unowned", "en", TransportMode::Walking))
        .unwrap();

    let recorder = EventRecorder::new();
    let summary = claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();

    let projects_outcome = &summary.collections[0];
    assert_eq!(projects_outcome.collection, Collection::Projects);
    assert_eq!(projects_outcome.examined, 1);
    assert_eq!(projects_outcome.claimed, 1);

    let loaded = projects.get_project(owned.id).unwrap().unwrap();
    assert_eq!(loaded.owner_id.as_deref(), Some("grace@example.org"));
}

#[test]
fn claiming_does_not_touch_shared_with_or_payload() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);

    let mut project = Project::new("Shared walk", "en", TransportMode::Walking);
    project.shared_with = BTreeSet::from(["grace@example.org".to_string()]);
    project.content = Some("body".to_string());
    projects.create_project(&project).unwrap();

    let recorder = EventRecorder::new();
    claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();

    let loaded = projects.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.owner_id.as_deref(), Some("ada@example.org"));
    assert_eq!(loaded.shared_with, project.shared_with);
    assert_eq!(loaded.content, project.content);
    assert_eq!(loaded.edited_at, project.edited_at);
}

#[test]
fn blank_identity_is_rejected_and_nothing_changes() {
    let conn = open_db_in_memory().unwrap();
    seed_full_store(&conn);
    let recorder = EventRecorder::new();

    let err = claim_all_local_collections(&conn, "", &recorder).unwrap_err();
    assert_eq!(err, ClaimError::EmptyIdentity);
    assert_eq!(count_unowned(&conn, "projects"), 1);
}

#[test]
fn identity_is_trimmed_before_claiming() {
    let conn = open_db_in_memory().unwrap();
    seed_full_store(&conn);
    let recorder = EventRecorder::new();

    let summary =
        claim_all_local_collections(&conn, "  ada@example.org  ", &recorder).unwrap();
    assert_eq!(summary.identity, "ada@example.org");

    let owner: String = conn
        .query_row("SELECT owner_id FROM projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(owner, "ada@example.org");
}

#[test]
fn failed_record_is_skipped_and_the_pass_continues() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);

    let poisoned = Project::new("Poisoned", "en", TransportMode::Walking);
    let healthy = Project::new("Healthy", "en", TransportMode::Walking);
    projects.create_project(&poisoned).unwrap();
    projects.create_project(&healthy).unwrap();

    // Reject the ownership update of one specific record.
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_one_claim
         BEFORE UPDATE OF owner_id ON projects
         WHEN NEW.uuid = '{}'
         BEGIN SELECT RAISE(ABORT, 'simulated update failure'); END;",
        poisoned.id
    ))
    .unwrap();

    let recorder = EventRecorder::new();
    let summary = claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();

    let outcome = &summary.collections[0];
    assert_eq!(outcome.examined, 2);
    assert_eq!(outcome.claimed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].id, poisoned.id);

    let healthy_loaded = projects.get_project(healthy.id).unwrap().unwrap();
    assert_eq!(healthy_loaded.owner_id.as_deref(), Some("ada@example.org"));
    let poisoned_loaded = projects.get_project(poisoned.id).unwrap().unwrap();
    assert!(poisoned_loaded.is_unowned());
}

#[test]
fn failed_scan_skips_the_collection_but_not_the_pass() {
    let conn = open_db_in_memory().unwrap();
    let (project, _poi) = seed_full_store(&conn);

    // Make the projects scan itself fail.
    conn.execute_batch("ALTER TABLE projects RENAME TO projects_hidden;")
        .unwrap();

    let recorder = EventRecorder::new();
    let summary = claim_all_local_collections(&conn, "ada@example.org", &recorder).unwrap();

    let projects_outcome = &summary.collections[0];
    assert!(projects_outcome.scan_failed);
    assert_eq!(projects_outcome.claimed, 0);

    // The remaining four collections were still claimed.
    assert_eq!(summary.total_claimed(), 4);
    assert_eq!(count_unowned(&conn, "pois"), 0);
    assert_eq!(count_unowned(&conn, "extents"), 0);

    conn.execute_batch("ALTER TABLE projects_hidden RENAME TO projects;")
        .unwrap();
    let loaded = SqliteProjectRepository::new(&conn)
        .get_project(project.id)
        .unwrap()
        .unwrap();
    assert!(loaded.is_unowned());
}
