// src/services/gallery_service.rs
//
// Gallery resource facade: list, get, sub-collections, create, update, delete.
// Reads go straight to the repository; writes go through the pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Gallery, GalleryId, GalleryMediaAssociation, Media};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, GalleryCreated, GalleryDeleted, GalleryUpdated};
use crate::repositories::GalleryRepository;
use crate::services::gallery_query::{ListRequest, ListRules, RawParams};
use crate::services::gallery_write_pipeline::{GalleryWritePipeline, RawInput};
use crate::services::media_resolver::MediaReferenceResolver;

/// Acknowledgement returned by a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub deleted: bool,
}

pub struct GalleryService {
    gallery_repo: Arc<dyn GalleryRepository>,
    resolver: Arc<MediaReferenceResolver>,
    pipeline: Arc<GalleryWritePipeline>,
    rules: ListRules,
    event_bus: Arc<EventBus>,
}

impl GalleryService {
    pub fn new(
        gallery_repo: Arc<dyn GalleryRepository>,
        resolver: Arc<MediaReferenceResolver>,
        pipeline: Arc<GalleryWritePipeline>,
        rules: ListRules,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            gallery_repo,
            resolver,
            pipeline,
            rules,
            event_bus,
        }
    }

    /// List galleries from raw query parameters
    pub fn list(&self, params: &RawParams) -> AppResult<Vec<Gallery>> {
        let request = self.rules.parse(params)?;
        self.list_with(&request)
    }

    pub fn list_with(&self, request: &ListRequest) -> AppResult<Vec<Gallery>> {
        log::debug!(
            "listing galleries: page {} x {}, {} filters",
            request.page,
            request.page_size,
            request.criteria.len()
        );

        self.gallery_repo.find_many(
            &request.criteria,
            &request.ordering,
            request.page_size,
            request.page,
        )
    }

    pub fn get(&self, id: GalleryId) -> AppResult<Gallery> {
        self.gallery_repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::gallery_not_found(id))
    }

    /// Media referenced by the gallery, in position order
    pub fn get_media(&self, id: GalleryId) -> AppResult<Vec<Media>> {
        let gallery = self.get(id)?;
        self.resolver.media_of(&gallery)
    }

    pub fn get_associations(&self, id: GalleryId) -> AppResult<Vec<GalleryMediaAssociation>> {
        let gallery = self.get(id)?;
        Ok(self.resolver.associations_of(&gallery))
    }

    pub fn create(&self, raw: &RawInput) -> AppResult<Gallery> {
        let gallery = self.pipeline.write(None, raw)?;

        if let Some(id) = gallery.id {
            log::info!("created gallery {} ({})", id, gallery.name);
            self.event_bus.emit(GalleryCreated::new(id, gallery.name.clone()));
        }

        Ok(gallery)
    }

    /// Overlay `raw` onto the stored gallery.
    ///
    /// A missing id fails with `NotFound` before the payload is looked at.
    pub fn update(&self, id: GalleryId, raw: &RawInput) -> AppResult<Gallery> {
        self.get(id)?;

        let gallery = self.pipeline.write(Some(id), raw)?;

        log::info!("updated gallery {}", id);
        self.event_bus.emit(GalleryUpdated::new(id));

        Ok(gallery)
    }

    pub fn delete(&self, id: GalleryId) -> AppResult<DeleteAck> {
        let gallery = self.get(id)?;

        self.gallery_repo.delete(&gallery)?;

        log::info!("deleted gallery {}", id);
        self.event_bus.emit(GalleryDeleted::new(id));

        Ok(DeleteAck { deleted: true })
    }
}
