// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// Read views are what detail and listing calls return. The write view
// echoes a created or updated gallery and leaves timestamps out.
// Conversion goes from domain entities only.

use serde::{Deserialize, Serialize};

use crate::domain::{Gallery, GalleryMediaAssociation, Media};

// ============================================================================
// READ VIEWS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryReadDto {
    pub id: Option<i64>,
    pub name: String,
    pub context: String,
    pub default_format: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub associations: Vec<AssociationReadDto>,
}

/// Association as nested in a gallery; no back-reference to the gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationReadDto {
    pub id: Option<i64>,
    pub media_id: i64,
    pub position: i32,
    pub enabled: bool,
    pub caption: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReadDto {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub provider_name: String,
    pub provider_reference: String,
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// WRITE VIEW
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryWriteDto {
    pub id: Option<i64>,
    pub name: String,
    pub context: String,
    pub default_format: String,
    pub enabled: bool,
    pub associations: Vec<AssociationWriteDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationWriteDto {
    pub media_id: i64,
    pub position: i32,
    pub enabled: bool,
    pub caption: Option<String>,
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<Gallery> for GalleryReadDto {
    fn from(gallery: Gallery) -> Self {
        Self {
            id: gallery.id,
            name: gallery.name,
            context: gallery.context,
            default_format: gallery.default_format,
            enabled: gallery.enabled,
            created_at: gallery.created_at.to_rfc3339(),
            updated_at: gallery.updated_at.to_rfc3339(),
            associations: gallery
                .associations
                .into_iter()
                .map(AssociationReadDto::from)
                .collect(),
        }
    }
}

impl From<GalleryMediaAssociation> for AssociationReadDto {
    fn from(association: GalleryMediaAssociation) -> Self {
        Self {
            id: association.id,
            media_id: association.media_id,
            position: association.position,
            enabled: association.enabled,
            caption: association.caption,
            created_at: association.created_at.to_rfc3339(),
            updated_at: association.updated_at.to_rfc3339(),
        }
    }
}

impl From<Media> for MediaReadDto {
    fn from(media: Media) -> Self {
        Self {
            id: media.id,
            name: media.name,
            description: media.description,
            enabled: media.enabled,
            provider_name: media.provider_name,
            provider_reference: media.provider_reference,
            content_type: media.content_type,
            width: media.width,
            height: media.height,
            created_at: media.created_at.to_rfc3339(),
            updated_at: media.updated_at.to_rfc3339(),
        }
    }
}

impl From<Gallery> for GalleryWriteDto {
    fn from(gallery: Gallery) -> Self {
        Self {
            id: gallery.id,
            name: gallery.name,
            context: gallery.context,
            default_format: gallery.default_format,
            enabled: gallery.enabled,
            associations: gallery
                .associations
                .into_iter()
                .map(AssociationWriteDto::from)
                .collect(),
        }
    }
}

impl From<GalleryMediaAssociation> for AssociationWriteDto {
    fn from(association: GalleryMediaAssociation) -> Self {
        Self {
            media_id: association.media_id,
            position: association.position,
            enabled: association.enabled,
            caption: association.caption,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_view_has_no_back_reference() {
        let mut gallery = Gallery::new("Trip".to_string());
        gallery.id = Some(3);
        gallery.set_associations(vec![GalleryMediaAssociation::new(10, 0)]);

        let value = serde_json::to_value(GalleryReadDto::from(gallery)).unwrap();

        let association = &value["associations"][0];
        assert_eq!(association["media_id"], 10);
        assert!(association.get("gallery_id").is_none());
        assert!(value.get("created_at").is_some());
    }

    #[test]
    fn test_write_view_leaves_out_timestamps() {
        let mut gallery = Gallery::new("Trip".to_string());
        gallery.set_associations(vec![GalleryMediaAssociation::new(10, 0).with_caption("c")]);

        let value = serde_json::to_value(GalleryWriteDto::from(gallery)).unwrap();

        assert!(value.get("created_at").is_none());
        assert!(value.get("updated_at").is_none());
        assert!(value["associations"][0].get("created_at").is_none());
        assert_eq!(value["associations"][0]["caption"], "c");
    }
}
