// src/repositories/media_repository.rs
//
// Read access to media rows owned by the media provider.
// `save`/`delete` exist for the provider side and for fixtures; the
// gallery layer only ever calls `get_by_id` and `exists`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::ConnectionPool;
use crate::domain::{Media, MediaId};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait MediaRepository: Send + Sync {
    fn get_by_id(&self, id: MediaId) -> AppResult<Option<Media>>;
    fn exists(&self, id: MediaId) -> AppResult<bool>;
    fn save(&self, media: &Media) -> AppResult<Media>;
    fn delete(&self, id: MediaId) -> AppResult<()>;
}

pub struct SqliteMediaRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMediaRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_media(row: &Row) -> Result<Media, rusqlite::Error> {
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        Ok(Media {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            description: row.get("description")?,
            enabled: row.get("enabled")?,
            provider_name: row.get("provider_name")?,
            provider_reference: row.get("provider_reference")?,
            content_type: row.get("content_type")?,
            width: row.get("width")?,
            height: row.get("height")?,
            created_at: parse_rfc3339(&created_at)?,
            updated_at: parse_rfc3339(&updated_at)?,
        })
    }
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

impl MediaRepository for SqliteMediaRepository {
    fn get_by_id(&self, id: MediaId) -> AppResult<Option<Media>> {
        let conn = self.pool.get()?;

        let media = conn
            .query_row(
                "SELECT id, name, description, enabled, provider_name, provider_reference,
                        content_type, width, height, created_at, updated_at
                 FROM media WHERE id = ?1",
                params![id],
                Self::row_to_media,
            )
            .optional()?;

        Ok(media)
    }

    fn exists(&self, id: MediaId) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM media WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn save(&self, media: &Media) -> AppResult<Media> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT OR REPLACE INTO media (
                id, name, description, enabled, provider_name, provider_reference,
                content_type, width, height, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                media.id,
                media.name,
                media.description,
                media.enabled,
                media.provider_name,
                media.provider_reference,
                media.content_type,
                media.width,
                media.height,
                media.created_at.to_rfc3339(),
                media.updated_at.to_rfc3339(),
            ],
        )?;

        let id = media.id.unwrap_or_else(|| conn.last_insert_rowid());
        Ok(Media {
            id: Some(id),
            ..media.clone()
        })
    }

    fn delete(&self, id: MediaId) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute("DELETE FROM media WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("Media ({}) not found", id)));
        }

        Ok(())
    }
}
