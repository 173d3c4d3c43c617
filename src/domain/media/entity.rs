use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MediaId = i64;

/// Snapshot of a media item as stored by the media provider.
/// Galleries reference media by id and never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Option<MediaId>,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,

    /// Provider that owns the binary (e.g. "image", "youtube")
    pub provider_name: String,

    /// Provider-specific reference (file name, video id, ...)
    pub provider_reference: String,

    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Media {
    pub fn new(name: String, provider_name: String, provider_reference: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            description: None,
            enabled: true,
            provider_name,
            provider_reference,
            content_type: None,
            width: None,
            height: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.provider_name)
    }
}
