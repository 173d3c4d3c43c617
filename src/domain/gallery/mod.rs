//! Gallery aggregate: a named collection of ordered media references.
//!
//! A gallery owns its associations; the media they point at are external
//! and only ever read.

pub mod entity;
pub mod invariants;

pub use entity::{AssociationId, Gallery, GalleryId, GalleryMediaAssociation};
pub use invariants::validate_gallery;
