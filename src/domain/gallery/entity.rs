use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::media::MediaId;

/// Store-assigned gallery identifier. Zero is a legal value.
pub type GalleryId = i64;

/// Store-assigned identifier of a gallery/media link row
pub type AssociationId = i64;

pub const DEFAULT_CONTEXT: &str = "default";
pub const DEFAULT_FORMAT: &str = "default_small";

/// A named, ordered collection of media references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    /// `None` until the store persists the gallery for the first time
    pub id: Option<GalleryId>,

    pub name: String,

    /// Media context the gallery belongs to
    pub context: String,

    /// Format used when rendering the gallery's media
    pub default_format: String,

    pub enabled: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Iteration order is display order (ascending position)
    pub associations: Vec<GalleryMediaAssociation>,
}

/// Link between a gallery and one media item, carrying its display position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryMediaAssociation {
    pub id: Option<AssociationId>,

    /// Back-reference to the owning gallery
    pub gallery_id: Option<GalleryId>,

    pub media_id: MediaId,

    pub position: i32,

    pub enabled: bool,

    pub caption: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Gallery {
    /// Create a new, not yet persisted gallery
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            context: DEFAULT_CONTEXT.to_string(),
            default_format: DEFAULT_FORMAT.to_string(),
            enabled: false,
            created_at: now,
            updated_at: now,
            associations: Vec::new(),
        }
    }

    /// Blank mutation base used when creating from raw input
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Replace the association set, keeping it in display order
    pub fn set_associations(&mut self, mut associations: Vec<GalleryMediaAssociation>) {
        for association in &mut associations {
            association.gallery_id = self.id;
        }
        associations.sort_by_key(|a| a.position);
        self.associations = associations;
    }
}

impl GalleryMediaAssociation {
    pub fn new(media_id: MediaId, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            gallery_id: None,
            media_id,
            position,
            enabled: true,
            caption: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl std::fmt::Display for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} (#{})", self.name, id),
            None => write!(f, "{} (new)", self.name),
        }
    }
}
