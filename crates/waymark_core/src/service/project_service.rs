//! Project use-case service.
//!
//! # Responsibility
//! - Expose project, poi, media, thumbnail and extent operations at
//!   use-case granularity over the repositories.
//! - Publish a collection-change event after every successful mutation
//!   so live queries re-evaluate.
//!
//! # Invariants
//! - No change event is published for a failed mutation.
//! - Reads never mutate.

use crate::event::EventCategory;
use crate::model::extent::{Extent, ExtentId};
use crate::model::media::{Media, MediaId, Thumbnail, ThumbnailId};
use crate::model::poi::{Poi, PoiId};
use crate::model::project::{Project, ProjectId};
use crate::model::Collection;
use crate::repo::extent_repo::{ExtentRepository, SqliteExtentRepository};
use crate::repo::media_repo::{
    MediaRepository, SqliteMediaRepository, SqliteThumbnailRepository, ThumbnailRepository,
};
use crate::repo::poi_repo::{PoiRepository, SqlitePoiRepository};
use crate::repo::project_repo::{
    ProjectListQuery, ProjectRepository, ProjectWithRelations, SqliteProjectRepository,
};
use crate::repo::RepoResult;
use crate::service::context::StoreContext;
use crate::service::watch::{ProjectDetailWatch, ProjectsWatch};
use log::info;

pub struct ProjectService<'ctx> {
    context: &'ctx StoreContext,
}

impl<'ctx> ProjectService<'ctx> {
    pub fn new(context: &'ctx StoreContext) -> Self {
        Self { context }
    }

    fn record_store_event(&self, message: String) {
        self.context.recorder().record(EventCategory::Store, message);
    }

    // Projects

    pub fn list_projects(&self, owner: Option<&str>) -> RepoResult<Vec<Project>> {
        let repo = SqliteProjectRepository::new(self.context.conn());
        repo.list_projects(&ProjectListQuery {
            owner: owner.map(str::to_string),
        })
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        SqliteProjectRepository::new(self.context.conn()).get_project(id)
    }

    pub fn project_with_relations(
        &self,
        id: ProjectId,
    ) -> RepoResult<Option<ProjectWithRelations>> {
        SqliteProjectRepository::new(self.context.conn()).get_project_with_relations(id)
    }

    pub fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        let id = SqliteProjectRepository::new(self.context.conn()).create_project(project)?;
        info!("event=project_create module=service status=ok uuid={id}");
        self.record_store_event(format!("project created: {}", project.name));
        self.context.notify_change(Collection::Projects);
        Ok(id)
    }

    pub fn update_project(&self, project: &Project) -> RepoResult<()> {
        SqliteProjectRepository::new(self.context.conn()).update_project(project)?;
        info!(
            "event=project_update module=service status=ok uuid={}",
            project.id
        );
        self.record_store_event(format!("project updated: {}", project.name));
        self.context.notify_change(Collection::Projects);
        Ok(())
    }

    /// Deletes the project record only; its pois, media, thumbnail and
    /// extents stay behind for the remote engine to reconcile.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        SqliteProjectRepository::new(self.context.conn()).delete_project(id)?;
        info!("event=project_delete module=service status=ok uuid={id}");
        self.record_store_event(format!("project deleted: {id}"));
        self.context.notify_change(Collection::Projects);
        Ok(())
    }

    // Pois

    pub fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId> {
        let id = SqlitePoiRepository::new(self.context.conn()).create_poi(poi)?;
        info!("event=poi_create module=service status=ok uuid={id}");
        self.record_store_event(format!("poi created in project {}", poi.project_id));
        self.context.notify_change(Collection::Pois);
        Ok(id)
    }

    pub fn update_poi(&self, poi: &Poi) -> RepoResult<()> {
        SqlitePoiRepository::new(self.context.conn()).update_poi(poi)?;
        info!("event=poi_update module=service status=ok uuid={}", poi.id);
        self.record_store_event(format!("poi updated: {}", poi.id));
        self.context.notify_change(Collection::Pois);
        Ok(())
    }

    pub fn delete_poi(&self, id: PoiId) -> RepoResult<()> {
        SqlitePoiRepository::new(self.context.conn()).delete_poi(id)?;
        info!("event=poi_delete module=service status=ok uuid={id}");
        self.record_store_event(format!("poi deleted: {id}"));
        self.context.notify_change(Collection::Pois);
        Ok(())
    }

    pub fn list_pois_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Poi>> {
        SqlitePoiRepository::new(self.context.conn()).list_pois_for_project(project_id)
    }

    // Media

    pub fn add_media(&self, media: &Media) -> RepoResult<MediaId> {
        let id = SqliteMediaRepository::new(self.context.conn()).create_media(media)?;
        info!("event=media_create module=service status=ok uuid={id}");
        self.record_store_event(format!("media added to poi {}", media.poi_id));
        self.context.notify_change(Collection::Media);
        Ok(id)
    }

    pub fn list_media_for_poi(&self, poi_id: PoiId) -> RepoResult<Vec<Media>> {
        SqliteMediaRepository::new(self.context.conn()).list_media_for_poi(poi_id)
    }

    pub fn delete_media(&self, id: MediaId) -> RepoResult<()> {
        SqliteMediaRepository::new(self.context.conn()).delete_media(id)?;
        info!("event=media_delete module=service status=ok uuid={id}");
        self.record_store_event(format!("media deleted: {id}"));
        self.context.notify_change(Collection::Media);
        Ok(())
    }

    // Thumbnails

    pub fn set_thumbnail(&self, thumbnail: &Thumbnail) -> RepoResult<ThumbnailId> {
        let id =
            SqliteThumbnailRepository::new(self.context.conn()).create_thumbnail(thumbnail)?;
        info!("event=thumbnail_create module=service status=ok uuid={id}");
        self.record_store_event(format!(
            "thumbnail set for project {}",
            thumbnail.project_id
        ));
        self.context.notify_change(Collection::Thumbnails);
        Ok(id)
    }

    pub fn delete_thumbnail(&self, id: ThumbnailId) -> RepoResult<()> {
        SqliteThumbnailRepository::new(self.context.conn()).delete_thumbnail(id)?;
        info!("event=thumbnail_delete module=service status=ok uuid={id}");
        self.record_store_event(format!("thumbnail deleted: {id}"));
        self.context.notify_change(Collection::Thumbnails);
        Ok(())
    }

    // Extents

    pub fn set_extent(&self, extent: &Extent) -> RepoResult<ExtentId> {
        let id = SqliteExtentRepository::new(self.context.conn()).create_extent(extent)?;
        info!("event=extent_create module=service status=ok uuid={id}");
        self.record_store_event(format!("extent set for project {}", extent.project_id));
        self.context.notify_change(Collection::Extents);
        Ok(id)
    }

    pub fn list_extents_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Extent>> {
        SqliteExtentRepository::new(self.context.conn()).list_extents_for_project(project_id)
    }

    pub fn delete_extent(&self, id: ExtentId) -> RepoResult<()> {
        SqliteExtentRepository::new(self.context.conn()).delete_extent(id)?;
        info!("event=extent_delete module=service status=ok uuid={id}");
        self.record_store_event(format!("extent deleted: {id}"));
        self.context.notify_change(Collection::Extents);
        Ok(())
    }

    // Live queries

    /// Live handle over the project list, optionally owner-scoped.
    pub fn watch_projects(&self, owner: Option<&str>) -> ProjectsWatch<'ctx> {
        ProjectsWatch::new(self.context, owner.map(str::to_string))
    }

    /// Live handle over one project's detail shape.
    pub fn watch_project(&self, id: ProjectId) -> ProjectDetailWatch<'ctx> {
        ProjectDetailWatch::new(self.context, id)
    }
}
