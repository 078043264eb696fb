//! Pull-based live query handles.
//!
//! # Responsibility
//! - Keep a cached query result and re-evaluate it lazily after any
//!   relevant collection change, claim passes included.
//!
//! # Invariants
//! - Watches are read-only; they never mutate the store.
//! - Dropping a watch detaches its change subscription.
//! - A fresh watch is dirty, so the first `results()` call queries.

use crate::event::Subscription;
use crate::model::project::{Project, ProjectId};
use crate::model::Collection;
use crate::repo::project_repo::{
    ProjectListQuery, ProjectRepository, ProjectWithRelations, SqliteProjectRepository,
};
use crate::repo::RepoResult;
use crate::service::context::StoreContext;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Live project list, optionally scoped to one owner.
pub struct ProjectsWatch<'ctx> {
    context: &'ctx StoreContext,
    owner: Option<String>,
    dirty: Arc<AtomicBool>,
    cache: RefCell<Vec<Project>>,
    _sub: Subscription,
}

impl<'ctx> ProjectsWatch<'ctx> {
    pub(crate) fn new(context: &'ctx StoreContext, owner: Option<String>) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let dirty_flag = Arc::clone(&dirty);
        let sub = context.changes().subscribe(move |collection| {
            if *collection == Collection::Projects {
                dirty_flag.store(true, Ordering::SeqCst);
            }
        });

        Self {
            context,
            owner,
            dirty,
            cache: RefCell::new(Vec::new()),
            _sub: sub,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Current results, re-querying only when the list changed.
    pub fn results(&self) -> RepoResult<Vec<Project>> {
        if self.dirty.swap(false, Ordering::SeqCst) {
            let repo = SqliteProjectRepository::new(self.context.conn());
            let projects = repo.list_projects(&ProjectListQuery {
                owner: self.owner.clone(),
            })?;
            *self.cache.borrow_mut() = projects;
        }
        Ok(self.cache.borrow().clone())
    }
}

/// Live detail view of one project (pois and thumbnail included).
pub struct ProjectDetailWatch<'ctx> {
    context: &'ctx StoreContext,
    project_id: ProjectId,
    dirty: Arc<AtomicBool>,
    cache: RefCell<Option<ProjectWithRelations>>,
    _sub: Subscription,
}

impl<'ctx> ProjectDetailWatch<'ctx> {
    pub(crate) fn new(context: &'ctx StoreContext, project_id: ProjectId) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let dirty_flag = Arc::clone(&dirty);
        let sub = context.changes().subscribe(move |collection| {
            if matches!(
                collection,
                Collection::Projects | Collection::Pois | Collection::Thumbnails
            ) {
                dirty_flag.store(true, Ordering::SeqCst);
            }
        });

        Self {
            context,
            project_id,
            dirty,
            cache: RefCell::new(None),
            _sub: sub,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Current detail shape; `None` once the project is deleted.
    pub fn results(&self) -> RepoResult<Option<ProjectWithRelations>> {
        if self.dirty.swap(false, Ordering::SeqCst) {
            let repo = SqliteProjectRepository::new(self.context.conn());
            *self.cache.borrow_mut() = repo.get_project_with_relations(self.project_id)?;
        }
        Ok(self.cache.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::project::{Project, TransportMode};
    use crate::service::context::StoreContext;
    use crate::service::project_service::ProjectService;

    #[test]
    fn fresh_watch_is_dirty_and_settles_after_results() {
        let context = StoreContext::open_in_memory().expect("in-memory store should open");
        let service = ProjectService::new(&context);
        let watch = service.watch_projects(None);

        assert!(watch.is_dirty());
        let initial = watch.results().expect("query should run");
        assert!(initial.is_empty());
        assert!(!watch.is_dirty());
    }

    #[test]
    fn mutation_marks_watch_dirty() {
        let context = StoreContext::open_in_memory().expect("in-memory store should open");
        let service = ProjectService::new(&context);
        let watch = service.watch_projects(None);
        watch.results().expect("query should run");

        service
            .create_project(&Project::new("Harbour walk", "en", TransportMode::Walking))
            .expect("create should succeed");
        assert!(watch.is_dirty());
        let projects = watch.results().expect("query should run");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Harbour walk");
    }
}
