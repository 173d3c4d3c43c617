// src/repositories/gallery_repository.rs
//
// Gallery persistence. A gallery row and its gallery_media rows are
// always written and removed together inside one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db::ConnectionPool;
use crate::domain::{
    FilterValue, Gallery, GalleryField, GalleryId, GalleryMediaAssociation, OrderingSpec,
    Pagination, QueryCriteria, SortDirection,
};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait GalleryRepository: Send + Sync {
    /// Exact lookup, associations included
    fn find_by_id(&self, id: GalleryId) -> AppResult<Option<Gallery>>;

    /// One page of galleries matching `criteria`, 1-indexed.
    /// `id ASC` breaks ties so that pages are stable for a given state.
    fn find_many(
        &self,
        criteria: &QueryCriteria,
        ordering: &OrderingSpec,
        page_size: u32,
        page: u32,
    ) -> AppResult<Vec<Gallery>>;

    /// Upsert the gallery and replace its association set atomically.
    /// Returns the stored state with identifiers assigned.
    fn save(&self, gallery: &Gallery) -> AppResult<Gallery>;

    /// Remove the gallery and its associations.
    /// `NotFound` when the row no longer exists.
    fn delete(&self, gallery: &Gallery) -> AppResult<()>;

    fn count(&self) -> AppResult<u64>;
}

const GALLERY_COLUMNS: &str =
    "id, name, context, default_format, enabled, created_at, updated_at";

const ASSOCIATION_COLUMNS: &str =
    "id, gallery_id, media_id, position, enabled, caption, created_at, updated_at";

pub struct SqliteGalleryRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteGalleryRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_gallery(row: &Row) -> Result<Gallery, rusqlite::Error> {
        Ok(Gallery {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            context: row.get("context")?,
            default_format: row.get("default_format")?,
            enabled: row.get("enabled")?,
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
            associations: Vec::new(),
        })
    }

    fn row_to_association(row: &Row) -> Result<GalleryMediaAssociation, rusqlite::Error> {
        Ok(GalleryMediaAssociation {
            id: Some(row.get("id")?),
            gallery_id: Some(row.get("gallery_id")?),
            media_id: row.get("media_id")?,
            position: row.get("position")?,
            enabled: row.get("enabled")?,
            caption: row.get("caption")?,
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }

    fn load_associations(
        conn: &Connection,
        gallery_id: GalleryId,
    ) -> Result<Vec<GalleryMediaAssociation>, rusqlite::Error> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM gallery_media WHERE gallery_id = ?1 ORDER BY position ASC, id ASC",
            ASSOCIATION_COLUMNS
        ))?;

        let associations = stmt
            .query_map(params![gallery_id], Self::row_to_association)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(associations)
    }

    fn load_gallery(conn: &Connection, id: GalleryId) -> Result<Option<Gallery>, rusqlite::Error> {
        let gallery = conn
            .query_row(
                &format!("SELECT {} FROM galleries WHERE id = ?1", GALLERY_COLUMNS),
                params![id],
                Self::row_to_gallery,
            )
            .optional()?;

        match gallery {
            Some(mut gallery) => {
                gallery.associations = Self::load_associations(conn, id)?;
                Ok(Some(gallery))
            }
            None => Ok(None),
        }
    }
}

fn parse_timestamp(row: &Row, column: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Render one criterion as a SQL predicate, pushing its bound values
fn render_filter(field: GalleryField, value: &FilterValue, args: &mut Vec<Value>) -> String {
    match value {
        FilterValue::AnyOf(values) => {
            let mut flat = Vec::new();
            flatten(values, &mut flat);
            if flat.is_empty() {
                // Membership in an empty set matches nothing
                return "0".to_string();
            }
            let placeholders = vec!["?"; flat.len()].join(", ");
            args.extend(flat);
            format!("{} IN ({})", field.as_str(), placeholders)
        }
        scalar => {
            args.push(to_sql_value(scalar));
            format!("{} = ?", field.as_str())
        }
    }
}

fn flatten(values: &[FilterValue], out: &mut Vec<Value>) {
    for value in values {
        match value {
            FilterValue::AnyOf(inner) => flatten(inner, out),
            scalar => out.push(to_sql_value(scalar)),
        }
    }
}

fn to_sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Bool(b) => Value::Integer(i64::from(*b)),
        FilterValue::Integer(i) => Value::Integer(*i),
        FilterValue::Text(s) => Value::Text(s.clone()),
        FilterValue::AnyOf(_) => Value::Null,
    }
}

fn render_order_by(ordering: &OrderingSpec) -> String {
    let mut terms: Vec<String> = ordering
        .terms()
        .iter()
        .map(|(field, direction)| format!("{} {}", field.as_str(), direction.as_sql()))
        .collect();

    if !ordering.terms().iter().any(|(f, _)| *f == GalleryField::Id) {
        terms.push(format!("id {}", SortDirection::Asc.as_sql()));
    }

    terms.join(", ")
}

impl GalleryRepository for SqliteGalleryRepository {
    fn find_by_id(&self, id: GalleryId) -> AppResult<Option<Gallery>> {
        let conn = self.pool.get()?;
        Ok(Self::load_gallery(&conn, id)?)
    }

    fn find_many(
        &self,
        criteria: &QueryCriteria,
        ordering: &OrderingSpec,
        page_size: u32,
        page: u32,
    ) -> AppResult<Vec<Gallery>> {
        let window = Pagination::new(page, page_size);

        // Past anything SQLite can address: the block is necessarily empty
        let Ok(offset) = i64::try_from(window.offset()) else {
            log::debug!("find_many: page {} x {} is out of range", page, page_size);
            return Ok(Vec::new());
        };

        let conn = self.pool.get()?;

        let mut args: Vec<Value> = Vec::new();
        let predicates: Vec<String> = criteria
            .iter()
            .map(|(field, value)| render_filter(*field, value, &mut args))
            .collect();

        let where_clause = if predicates.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", predicates.join(" AND "))
        };

        args.push(Value::Integer(i64::from(window.page_size)));
        args.push(Value::Integer(offset));

        let sql = format!(
            "SELECT {} FROM galleries {} ORDER BY {} LIMIT ? OFFSET ?",
            GALLERY_COLUMNS,
            where_clause,
            render_order_by(ordering)
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut galleries: Vec<Gallery> = stmt
            .query_map(params_from_iter(args.iter()), Self::row_to_gallery)?
            .collect::<Result<Vec<_>, _>>()?;

        for gallery in &mut galleries {
            if let Some(id) = gallery.id {
                gallery.associations = Self::load_associations(&conn, id)?;
            }
        }

        log::debug!(
            "find_many: {} filters, page {} x {} -> {} galleries",
            criteria.len(),
            page,
            page_size,
            galleries.len()
        );

        Ok(galleries)
    }

    fn save(&self, gallery: &Gallery) -> AppResult<Gallery> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let id = match gallery.id {
            Some(id) => {
                tx.execute(
                    "INSERT INTO galleries (id, name, context, default_format, enabled, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        context = excluded.context,
                        default_format = excluded.default_format,
                        enabled = excluded.enabled,
                        updated_at = excluded.updated_at",
                    params![
                        id,
                        gallery.name,
                        gallery.context,
                        gallery.default_format,
                        gallery.enabled,
                        gallery.created_at.to_rfc3339(),
                        gallery.updated_at.to_rfc3339(),
                    ],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO galleries (name, context, default_format, enabled, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        gallery.name,
                        gallery.context,
                        gallery.default_format,
                        gallery.enabled,
                        gallery.created_at.to_rfc3339(),
                        gallery.updated_at.to_rfc3339(),
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.execute(
            "DELETE FROM gallery_media WHERE gallery_id = ?1",
            params![id],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO gallery_media (id, gallery_id, media_id, position, enabled, caption, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for association in &gallery.associations {
                insert.execute(params![
                    association.id,
                    id,
                    association.media_id,
                    association.position,
                    association.enabled,
                    association.caption,
                    association.created_at.to_rfc3339(),
                    association.updated_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;

        log::debug!(
            "saved gallery {} with {} associations",
            id,
            gallery.associations.len()
        );

        Self::load_gallery(&conn, id)?
            .ok_or_else(|| AppError::Other(format!("Gallery ({}) vanished after save", id)))
    }

    fn delete(&self, gallery: &Gallery) -> AppResult<()> {
        let id = gallery
            .id
            .ok_or_else(|| AppError::NotFound("Gallery has no identifier".to_string()))?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM gallery_media WHERE gallery_id = ?1",
            params![id],
        )?;
        let rows_affected = tx.execute("DELETE FROM galleries WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            // dropping the transaction rolls it back
            return Err(AppError::gallery_not_found(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn count(&self) -> AppResult<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM galleries", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn repo() -> SqliteGalleryRepository {
        SqliteGalleryRepository::new(Arc::new(create_test_pool()))
    }

    fn gallery(name: &str, enabled: bool) -> Gallery {
        let mut gallery = Gallery::new(name.to_string());
        gallery.enabled = enabled;
        gallery
    }

    #[test]
    fn test_save_assigns_identifiers() {
        let repo = repo();
        let mut draft = gallery("Summer", true);
        draft.set_associations(vec![
            GalleryMediaAssociation::new(10, 0),
            GalleryMediaAssociation::new(11, 1).with_caption("Beach"),
        ]);

        let saved = repo.save(&draft).unwrap();

        let id = saved.id.expect("id assigned");
        assert_eq!(saved.associations.len(), 2);
        assert!(saved.associations.iter().all(|a| a.id.is_some()));
        assert!(saved.associations.iter().all(|a| a.gallery_id == Some(id)));
        assert_eq!(saved.associations[1].caption.as_deref(), Some("Beach"));
    }

    #[test]
    fn test_save_replaces_association_set() {
        let repo = repo();
        let mut draft = gallery("Summer", true);
        draft.set_associations(vec![
            GalleryMediaAssociation::new(10, 0),
            GalleryMediaAssociation::new(11, 1),
        ]);
        let mut saved = repo.save(&draft).unwrap();

        saved.set_associations(vec![GalleryMediaAssociation::new(12, 0)]);
        saved.name = "Winter".to_string();
        let resaved = repo.save(&saved).unwrap();

        assert_eq!(resaved.id, saved.id);
        assert_eq!(resaved.name, "Winter");
        let media: Vec<_> = resaved.associations.iter().map(|a| a.media_id).collect();
        assert_eq!(media, vec![12]);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_save_writes_nothing() {
        let repo = repo();
        let mut draft = gallery("Broken", true);
        // bypasses domain validation: duplicate position hits the UNIQUE constraint
        draft.associations = vec![
            GalleryMediaAssociation::new(10, 0),
            GalleryMediaAssociation::new(11, 0),
        ];

        assert!(repo.save(&draft).is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_id_missing_returns_none() {
        assert!(repo().find_by_id(404).unwrap().is_none());
    }

    #[test]
    fn test_associations_come_back_in_position_order() {
        let repo = repo();
        let mut draft = gallery("Ordered", true);
        draft.associations = vec![
            GalleryMediaAssociation::new(20, 5),
            GalleryMediaAssociation::new(21, 1),
            GalleryMediaAssociation::new(22, 3),
        ];
        let id = repo.save(&draft).unwrap().id.unwrap();

        let loaded = repo.find_by_id(id).unwrap().unwrap();
        let positions: Vec<_> = loaded.associations.iter().map(|a| a.position).collect();
        assert_eq!(positions, vec![1, 3, 5]);
    }

    #[test]
    fn test_find_many_filters_by_enabled() {
        let repo = repo();
        let a = repo.save(&gallery("A", true)).unwrap();
        repo.save(&gallery("B", false)).unwrap();

        let criteria = QueryCriteria::new().with(GalleryField::Enabled, FilterValue::Bool(true));
        let found = repo
            .find_many(&criteria, &OrderingSpec::new(), 10, 1)
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[test]
    fn test_find_many_set_membership() {
        let repo = repo();
        repo.save(&gallery("A", true)).unwrap();
        repo.save(&gallery("B", true)).unwrap();
        repo.save(&gallery("C", true)).unwrap();

        let criteria = QueryCriteria::new().with(
            GalleryField::Name,
            FilterValue::AnyOf(vec![
                FilterValue::Text("A".to_string()),
                FilterValue::Text("C".to_string()),
            ]),
        );
        let names: Vec<_> = repo
            .find_many(&criteria, &OrderingSpec::new(), 10, 1)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_find_many_empty_set_matches_nothing() {
        let repo = repo();
        repo.save(&gallery("A", true)).unwrap();

        let criteria = QueryCriteria::new().with(GalleryField::Id, FilterValue::AnyOf(vec![]));
        assert!(repo
            .find_many(&criteria, &OrderingSpec::new(), 10, 1)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_many_orders_and_paginates() {
        let repo = repo();
        for name in ["d", "b", "e", "a", "c"] {
            repo.save(&gallery(name, true)).unwrap();
        }
        let ordering = OrderingSpec::new().then(GalleryField::Name, SortDirection::Desc);

        let first: Vec<_> = repo
            .find_many(&QueryCriteria::new(), &ordering, 2, 1)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        let third: Vec<_> = repo
            .find_many(&QueryCriteria::new(), &ordering, 2, 3)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();

        assert_eq!(first, vec!["e", "d"]);
        assert_eq!(third, vec!["a"]);
    }

    #[test]
    fn test_find_many_far_past_the_end_is_empty() {
        let repo = repo();
        repo.save(&gallery("only", true)).unwrap();

        let found = repo
            .find_many(&QueryCriteria::new(), &OrderingSpec::new(), u32::MAX, u32::MAX)
            .unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn test_find_many_default_order_is_by_id() {
        let repo = repo();
        let ids: Vec<_> = ["x", "y", "z"]
            .iter()
            .map(|n| repo.save(&gallery(n, true)).unwrap().id.unwrap())
            .collect();

        let found: Vec<_> = repo
            .find_many(&QueryCriteria::new(), &OrderingSpec::new(), 10, 1)
            .unwrap()
            .into_iter()
            .filter_map(|g| g.id)
            .collect();

        assert_eq!(found, ids);
    }

    #[test]
    fn test_delete_removes_gallery_and_associations() {
        let repo = repo();
        let mut draft = gallery("Gone", true);
        draft.associations = vec![GalleryMediaAssociation::new(10, 0)];
        let saved = repo.save(&draft).unwrap();

        repo.delete(&saved).unwrap();

        assert!(repo.find_by_id(saved.id.unwrap()).unwrap().is_none());
        let conn = repo.pool.get().unwrap();
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM gallery_media", [], |row| row.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn test_delete_twice_is_not_found() {
        let repo = repo();
        let saved = repo.save(&gallery("Gone", true)).unwrap();
        repo.delete(&saved).unwrap();

        let err = repo.delete(&saved).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_explicit_zero_id_is_a_real_identifier() {
        let repo = repo();
        let mut draft = gallery("Zero", true);
        draft.id = Some(0);

        let saved = repo.save(&draft).unwrap();

        assert_eq!(saved.id, Some(0));
        assert_eq!(repo.find_by_id(0).unwrap().unwrap().name, "Zero");
    }
}
