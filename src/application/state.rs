// src/application/state.rs

use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::events::{create_event_bus, EventBus};
use crate::repositories::{
    GalleryRepository, MediaRepository, SqliteGalleryRepository, SqliteMediaRepository,
};
use crate::services::{GalleryService, GalleryWritePipeline, ListRules, MediaReferenceResolver};

/// Shared application state handed to every command.
/// Fields are Arc-wrapped so commands can run from any thread.
pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub gallery_service: Arc<GalleryService>,
}

impl AppState {
    pub fn new(event_bus: Arc<EventBus>, gallery_service: Arc<GalleryService>) -> Self {
        Self {
            event_bus,
            gallery_service,
        }
    }

    /// Wire the SQLite repositories, resolver and pipeline into a service
    pub fn from_pool(pool: Arc<ConnectionPool>, rules: ListRules) -> Self {
        let gallery_repo: Arc<dyn GalleryRepository> =
            Arc::new(SqliteGalleryRepository::new(pool.clone()));
        let media_repo: Arc<dyn MediaRepository> = Arc::new(SqliteMediaRepository::new(pool));
        let event_bus = Arc::new(create_event_bus());

        let resolver = Arc::new(MediaReferenceResolver::new(media_repo.clone()));
        let pipeline = Arc::new(GalleryWritePipeline::new(gallery_repo.clone(), media_repo));

        let gallery_service = Arc::new(GalleryService::new(
            gallery_repo,
            resolver,
            pipeline,
            rules,
            event_bus.clone(),
        ));

        Self::new(event_bus, gallery_service)
    }
}
