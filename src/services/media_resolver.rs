// src/services/media_resolver.rs
//
// Media Reference Resolver
//
// Walks a gallery's association set and resolves each referenced media.
// A reference whose media no longer exists is skipped, never fatal.

use std::sync::Arc;

use crate::domain::{Gallery, GalleryMediaAssociation, Media};
use crate::error::AppResult;
use crate::repositories::MediaRepository;

pub struct MediaReferenceResolver {
    media_repo: Arc<dyn MediaRepository>,
}

impl MediaReferenceResolver {
    pub fn new(media_repo: Arc<dyn MediaRepository>) -> Self {
        Self { media_repo }
    }

    /// The gallery's associations in display (position) order
    pub fn associations_of(&self, gallery: &Gallery) -> Vec<GalleryMediaAssociation> {
        let mut associations = gallery.associations.clone();
        associations.sort_by_key(|a| a.position);
        associations
    }

    /// Referenced media in association order.
    ///
    /// Dangling references are dropped from the result and logged; store
    /// failures still propagate.
    pub fn media_of(&self, gallery: &Gallery) -> AppResult<Vec<Media>> {
        let associations = self.associations_of(gallery);
        let mut media = Vec::with_capacity(associations.len());

        for association in &associations {
            match self.media_repo.get_by_id(association.media_id)? {
                Some(found) => media.push(found),
                None => log::warn!(
                    "gallery {:?}: media {} at position {} no longer exists, skipping",
                    gallery.id,
                    association.media_id,
                    association.position
                ),
            }
        }

        Ok(media)
    }
}
