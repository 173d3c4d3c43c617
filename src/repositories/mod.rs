// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - NO cross-repository calls
// - Explicit SQL only

pub mod gallery_repository;
pub mod media_repository;

pub use gallery_repository::{GalleryRepository, SqliteGalleryRepository};
pub use media_repository::{MediaRepository, SqliteMediaRepository};

#[cfg(test)]
pub use gallery_repository::MockGalleryRepository;
#[cfg(test)]
pub use media_repository::MockMediaRepository;
