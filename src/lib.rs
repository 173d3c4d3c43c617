// src/lib.rs
// GalleryHub - ordered media galleries over SQLite
//
// Architecture:
// - Domain: Gallery, associations, query types and validation rules
// - Repositories: SQLite-backed stores behind traits
// - Services: query parsing, write pipeline, resource facade
// - Application: DTO projections, error responses, commands

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_gallery, FieldError, Gallery, GalleryField, GalleryId, GalleryMediaAssociation,
    Media, MediaId, OrderingSpec, QueryCriteria, SortDirection, ValidationErrors,
};

// ============================================================================
// PUBLIC API - Errors, config, database
// ============================================================================

pub use config::AppConfig;
pub use db::{create_connection_pool, initialize_database, ConnectionPool};
pub use error::{AppError, AppResult, ErrorKind};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, EventLogEntry, GalleryCreated, GalleryDeleted,
    GalleryUpdated,
};

// ============================================================================
// PUBLIC API - Repositories & services
// ============================================================================

pub use repositories::{
    GalleryRepository, MediaRepository, SqliteGalleryRepository, SqliteMediaRepository,
};

pub use services::{
    DeleteAck, GalleryCandidate, GalleryService, GalleryWritePipeline, ListRequest, ListRules,
    MediaReferenceResolver,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

pub use application::commands;
pub use application::dto;
