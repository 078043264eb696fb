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
    Project, ProjectListQuery, ProjectRepository, ProjectStatus, RepoError, TransportMode,
};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let mut project = Project::new("Harbor loop", "en", TransportMode::Walking);
    project.content = Some("A walk along the old docks".to_string());
    project.duration = 1.5;
    let id = repo.create_project(&project).unwrap();

    let loaded = repo.get_project(id).unwrap().unwrap();
    assert_eq!(loaded, project);
    assert!(loaded.is_unowned());
}

#[test]
fn update_rewrites_fields_and_bumps_edited_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let mut project = Project::new("Harbor loop", "en", TransportMode::Walking);
    repo.create_project(&project).unwrap();

    project.name = "Harbor loop extended".to_string();
    project.status = ProjectStatus::Published;
    project.transport = TransportMode::Biking;
    repo.update_project(&project).unwrap();

    let loaded = repo.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Harbor loop extended");
    assert_eq!(loaded.status, ProjectStatus::Published);
    assert_eq!(loaded.transport, TransportMode::Biking);
    assert!(loaded.edited_at >= project.edited_at);
}

#[test]
fn update_missing_project_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("Ghost", "en", TransportMode::Walking);
    let err = repo.update_project(&project).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == project.id));
}

#[test]
fn duplicate_name_is_a_semantic_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    repo.create_project(&Project::new("Harbor loop", "en", TransportMode::Walking))
        .unwrap();
    let err = repo
        .create_project(&Project::new("Harbor loop", "fr", TransportMode::Biking))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName { name } if name == "Harbor loop"));
}

#[test]
fn list_is_newest_first_with_optional_owner_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let mut first = Project::new("First", "en", TransportMode::Walking);
    first.created_at = 1_000;
    first.owner_id = Some("ada@example.org".to_string());
    let mut second = Project::new("Second", "en", TransportMode::Walking);
    second.created_at = 2_000;
    let mut third = Project::new("Third", "en", TransportMode::Walking);
    third.created_at = 3_000;
    third.owner_id = Some("ada@example.org".to_string());

    repo.create_project(&first).unwrap();
    repo.create_project(&second).unwrap();
    repo.create_project(&third).unwrap();

    let all = repo.list_projects(&ProjectListQuery::default()).unwrap();
    let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);

    let owned = repo
        .list_projects(&ProjectListQuery {
            owner: Some("ada@example.org".to_string()),
        })
        .unwrap();
    let owned_names: Vec<&str> = owned.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(owned_names, vec!["Third", "First"]);
}

#[test]
fn poi_requires_existing_parent_project() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePoiRepository::new(&conn);

    let poi = Poi::new(Uuid::new_v4(), 48.85, 2.35);
    let err = repo.create_poi(&poi).unwrap_err();
    assert!(matches!(err, RepoError::MissingParent { .. }));
}

#[test]
fn media_requires_existing_parent_poi() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMediaRepository::new(&conn);

    let media = Media::new(Uuid::new_v4(), MediaKind::Image, "https://cdn/a.jpg");
    let err = repo.create_media(&media).unwrap_err();
    assert!(matches!(err, RepoError::MissingParent { .. }));
}

#[test]
fn second_thumbnail_for_project_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);
    let thumbnails = SqliteThumbnailRepository::new(&conn);

    let project = Project::new("Harbor loop", "en", TransportMode::Walking);
    projects.create_project(&project).unwrap();

    thumbnails
        .create_thumbnail(&Thumbnail::new(
            project.id,
            MediaKind::Image,
            "https://cdn/a.jpg",
        ))
        .unwrap();
    let err = thumbnails
        .create_thumbnail(&Thumbnail::new(
            project.id,
            MediaKind::Image,
            "https://cdn/b.jpg",
        ))
        .unwrap_err();
    assert!(matches!(err, RepoError::ThumbnailExists { project_id } if project_id == project.id));
}

#[test]
fn relations_shape_orders_pois_and_carries_thumbnail() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);
    let pois = SqlitePoiRepository::new(&conn);
    let thumbnails = SqliteThumbnailRepository::new(&conn);

    let project = Project::new("Harbor loop", "en", TransportMode::Walking);
    projects.create_project(&project).unwrap();

    let mut stop_b = Poi::new(project.id, 48.86, 2.36);
    stop_b.sort_order = 2;
    let mut stop_a = Poi::new(project.id, 48.85, 2.35);
    stop_a.sort_order = 1;
    pois.create_poi(&stop_b).unwrap();
    pois.create_poi(&stop_a).unwrap();

    thumbnails
        .create_thumbnail(&Thumbnail::new(
            project.id,
            MediaKind::Image,
            "https://cdn/cover.jpg",
        ))
        .unwrap();

    let detail = projects
        .get_project_with_relations(project.id)
        .unwrap()
        .unwrap();
    assert_eq!(detail.project.id, project.id);
    assert_eq!(detail.pois.len(), 2);
    assert_eq!(detail.pois[0].id, stop_a.id);
    assert_eq!(detail.pois[1].id, stop_b.id);
    assert_eq!(
        detail.thumbnail.map(|t| t.url),
        Some("https://cdn/cover.jpg".to_string())
    );
}

#[test]
fn deleting_a_project_leaves_children_behind() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);
    let pois = SqlitePoiRepository::new(&conn);
    let extents = SqliteExtentRepository::new(&conn);

    let project = Project::new("Harbor loop", "en", TransportMode::Walking);
    projects.create_project(&project).unwrap();
    let poi = Poi::new(project.id, 48.85, 2.35);
    pois.create_poi(&poi).unwrap();
    let extent = Extent::new(project.id, 48.0, 49.0, 2.0, 3.0);
    extents.create_extent(&extent).unwrap();

    projects.delete_project(project.id).unwrap();
    assert!(projects.get_project(project.id).unwrap().is_none());

    // No cascade: children stay for the remote engine to reconcile.
    assert!(pois.get_poi(poi.id).unwrap().is_some());
    assert!(extents.get_extent(extent.id).unwrap().is_some());
}

#[test]
fn invalid_records_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);

    let blank = Project::new("   ", "en", TransportMode::Walking);
    let err = projects.create_project(&blank).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(projects
        .list_projects(&ProjectListQuery::default())
        .unwrap()
        .is_empty());
}
