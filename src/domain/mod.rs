// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod gallery;
pub mod media;
pub mod query;
pub mod validation;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Gallery Domain
pub use gallery::{
    validate_gallery, AssociationId, Gallery, GalleryId, GalleryMediaAssociation,
};

// Media (external, read-only from the gallery's point of view)
pub use media::{Media, MediaId};

// Listing queries
pub use query::{
    FieldKind, FilterValue, GalleryField, OrderingSpec, Pagination, QueryCriteria,
    SortDirection,
};

// Validation results
pub use validation::{FieldError, ValidationErrors};
