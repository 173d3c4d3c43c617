// events/types.rs
//
// Gallery domain events. Each one is an immutable fact that has already
// happened; they carry only what a subscriber needs to react.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::GalleryId;

pub trait DomainEvent: std::fmt::Debug + Clone {
    fn event_id(&self) -> Uuid;
    fn occurred_at(&self) -> DateTime<Utc>;
    fn event_type(&self) -> &'static str;
}

/// Emitted after a new gallery has been persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub gallery_id: GalleryId,
    pub name: String,
}

impl GalleryCreated {
    pub fn new(gallery_id: GalleryId, name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            gallery_id,
            name,
        }
    }
}

impl DomainEvent for GalleryCreated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "GalleryCreated" }
}

/// Emitted after an existing gallery (or its association set) changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub gallery_id: GalleryId,
}

impl GalleryUpdated {
    pub fn new(gallery_id: GalleryId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            gallery_id,
        }
    }
}

impl DomainEvent for GalleryUpdated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "GalleryUpdated" }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub gallery_id: GalleryId,
}

impl GalleryDeleted {
    pub fn new(gallery_id: GalleryId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            gallery_id,
        }
    }
}

impl DomainEvent for GalleryDeleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "GalleryDeleted" }
}
