// src/services/gallery_write_pipeline.rs
//
// Validation & Mutation Pipeline
//
// prepare (bind raw input onto a base) -> validate (pure) -> commit (save).
// A write that fails binding or validation never reaches the store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::gallery::invariants::NOT_BLANK;
use crate::domain::{
    validate_gallery, Gallery, GalleryId, GalleryMediaAssociation, MediaId, ValidationErrors,
};
use crate::error::{AppError, AppResult};
use crate::repositories::{GalleryRepository, MediaRepository};

/// Untyped write payload
pub type RawInput = serde_json::Map<String, Value>;

const EXTRA_FIELDS: &str = "This form should not contain extra fields.";
const INVALID_CHOICE: &str = "This value is not valid.";

fn type_error(expected: &str) -> String {
    format!("This value should be of type {}.", expected)
}

/// Unvalidated mutation target: a base gallery with raw input overlaid.
///
/// Binding problems (wrong types, unknown fields, unknown media) are
/// recorded here instead of aborting, so that validation can report
/// them together with rule violations.
#[derive(Debug, Clone)]
pub struct GalleryCandidate {
    pub gallery: Gallery,
    pub binding_errors: ValidationErrors,
}

impl GalleryCandidate {
    pub fn new(base: Gallery) -> Self {
        Self {
            gallery: base,
            binding_errors: ValidationErrors::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        !self.gallery.is_persisted()
    }

    fn bind(&mut self, raw: &RawInput, media_repo: &dyn MediaRepository) -> AppResult<()> {
        for (key, value) in raw {
            match key.as_str() {
                "name" => self.bind_text(key, value, |g| &mut g.name),
                "context" => self.bind_text(key, value, |g| &mut g.context),
                "default_format" => self.bind_text(key, value, |g| &mut g.default_format),
                "enabled" => match coerce_bool(value, false) {
                    Some(enabled) => self.gallery.enabled = enabled,
                    None => self.binding_errors.add(key.clone(), type_error("boolean")),
                },
                "associations" => match value {
                    Value::Null => self.gallery.associations.clear(),
                    Value::Array(items) => self.bind_associations(items, media_repo)?,
                    _ => self.binding_errors.add(key.clone(), type_error("array")),
                },
                _ => self.binding_errors.add(key.clone(), EXTRA_FIELDS),
            }
        }
        Ok(())
    }

    /// Null clears the field so that NotBlank reports it
    fn bind_text<F>(&mut self, key: &str, value: &Value, field: F)
    where
        F: FnOnce(&mut Gallery) -> &mut String,
    {
        match value {
            Value::String(s) => *field(&mut self.gallery) = s.clone(),
            Value::Null => field(&mut self.gallery).clear(),
            _ => self.binding_errors.add(key, type_error("string")),
        }
    }

    /// Replaces the whole association set, kept in payload order until
    /// validation so that error paths match the submitted indices.
    /// Rows for media that were already linked keep their identity.
    fn bind_associations(
        &mut self,
        items: &[Value],
        media_repo: &dyn MediaRepository,
    ) -> AppResult<()> {
        let mut previous = std::mem::take(&mut self.gallery.associations);
        let mut bound = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let prefix = format!("associations[{}]", index);

            let Some(fields) = item.as_object() else {
                self.binding_errors.add(prefix, type_error("object"));
                continue;
            };

            for key in fields.keys() {
                if !matches!(key.as_str(), "media_id" | "position" | "enabled" | "caption") {
                    self.binding_errors
                        .add(format!("{}.{}", prefix, key), EXTRA_FIELDS);
                }
            }

            let media_id = match fields.get("media_id") {
                None | Some(Value::Null) => {
                    self.binding_errors
                        .add(format!("{}.media_id", prefix), NOT_BLANK);
                    None
                }
                Some(value) => match coerce_id(value) {
                    Some(id) if media_repo.exists(id)? => Some(id),
                    Some(_) => {
                        self.binding_errors
                            .add(format!("{}.media_id", prefix), INVALID_CHOICE);
                        None
                    }
                    None => {
                        self.binding_errors
                            .add(format!("{}.media_id", prefix), type_error("integer"));
                        None
                    }
                },
            };

            let position = match fields.get("position") {
                None | Some(Value::Null) => i32::try_from(index).ok(),
                Some(value) => value.as_i64().and_then(|p| i32::try_from(p).ok()),
            };
            if position.is_none() {
                self.binding_errors
                    .add(format!("{}.position", prefix), type_error("integer"));
            }

            let enabled = match fields.get("enabled") {
                None => Some(true),
                Some(value) => coerce_bool(value, true),
            };
            if enabled.is_none() {
                self.binding_errors
                    .add(format!("{}.enabled", prefix), type_error("boolean"));
            }

            let caption = match fields.get("caption") {
                None | Some(Value::Null) => Some(None),
                Some(Value::String(s)) => Some(Some(s.clone())),
                Some(_) => None,
            };
            if caption.is_none() {
                self.binding_errors
                    .add(format!("{}.caption", prefix), type_error("string"));
            }

            if let (Some(media_id), Some(position), Some(enabled), Some(caption)) =
                (media_id, position, enabled, caption)
            {
                let mut association = GalleryMediaAssociation::new(media_id, position);
                association.enabled = enabled;
                association.caption = caption;
                association.gallery_id = self.gallery.id;

                if let Some(at) = previous.iter().position(|a| a.media_id == media_id) {
                    let existing = previous.swap_remove(at);
                    association.id = existing.id;
                    association.created_at = existing.created_at;
                }

                bound.push(association);
            }
        }

        self.gallery.associations = bound;
        Ok(())
    }
}

/// Booleans, 0/1 and their string forms; null maps to `on_null`
fn coerce_bool(value: &Value, on_null: bool) -> Option<bool> {
    match value {
        Value::Null => Some(on_null),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_id(value: &Value) -> Option<MediaId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<MediaId>().ok(),
        _ => None,
    }
}

pub struct GalleryWritePipeline {
    gallery_repo: Arc<dyn GalleryRepository>,
    media_repo: Arc<dyn MediaRepository>,
}

impl GalleryWritePipeline {
    pub fn new(
        gallery_repo: Arc<dyn GalleryRepository>,
        media_repo: Arc<dyn MediaRepository>,
    ) -> Self {
        Self {
            gallery_repo,
            media_repo,
        }
    }

    /// Build the candidate for a write.
    ///
    /// With `Some(id)` the stored gallery is the base and a missing id
    /// fails with `NotFound` before anything is bound; with `None` the
    /// base is an empty gallery.
    pub fn prepare(
        &self,
        existing_id: Option<GalleryId>,
        raw: &RawInput,
    ) -> AppResult<GalleryCandidate> {
        let base = match existing_id {
            Some(id) => self
                .gallery_repo
                .find_by_id(id)?
                .ok_or_else(|| AppError::gallery_not_found(id))?,
            None => Gallery::empty(),
        };

        let mut candidate = GalleryCandidate::new(base);
        candidate.bind(raw, self.media_repo.as_ref())?;
        Ok(candidate)
    }

    /// Pure check of a candidate.
    ///
    /// Rule violations on a field that already failed binding are not
    /// repeated. On success the associations are put in display order.
    pub fn validate(candidate: GalleryCandidate) -> Result<Gallery, ValidationErrors> {
        let GalleryCandidate {
            mut gallery,
            binding_errors,
        } = candidate;

        // Items that failed binding are absent from the candidate, so
        // association indices no longer line up with the payload.
        let associations_unbound = binding_errors
            .iter()
            .any(|e| e.field.starts_with("associations"));

        let mut errors = binding_errors;
        if let Err(rule_errors) = validate_gallery(&gallery) {
            for error in rule_errors {
                let shifted = associations_unbound && error.field.starts_with("associations[");
                if !shifted && !errors.has_field(&error.field) {
                    errors.add(error.field, error.message);
                }
            }
        }
        errors.into_result()?;

        let associations = std::mem::take(&mut gallery.associations);
        gallery.set_associations(associations);

        let now = Utc::now();
        for association in &mut gallery.associations {
            association.updated_at = now;
        }
        gallery.updated_at = now;

        Ok(gallery)
    }

    /// Persist a validated gallery
    pub fn commit(&self, gallery: Gallery) -> AppResult<Gallery> {
        self.gallery_repo.save(&gallery)
    }

    /// prepare -> validate -> commit
    pub fn write(&self, existing_id: Option<GalleryId>, raw: &RawInput) -> AppResult<Gallery> {
        let candidate = self.prepare(existing_id, raw)?;

        let gallery = Self::validate(candidate).map_err(|errors| {
            log::info!(
                "rejected gallery write ({:?}): {} field errors",
                existing_id,
                errors.len()
            );
            AppError::ValidationFailed(errors)
        })?;

        self.commit(gallery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockGalleryRepository, MockMediaRepository};
    use serde_json::json;

    fn raw(value: Value) -> RawInput {
        value.as_object().cloned().expect("object literal")
    }

    fn media_known(ids: &'static [i64]) -> MockMediaRepository {
        let mut media = MockMediaRepository::new();
        media.expect_exists().returning(move |id| Ok(ids.contains(&id)));
        media
    }

    fn stored(id: GalleryId, name: &str) -> Gallery {
        let mut gallery = Gallery::new(name.to_string());
        gallery.id = Some(id);
        gallery.enabled = true;
        gallery
    }

    #[test]
    fn test_prepare_without_id_starts_empty() {
        let mut galleries = MockGalleryRepository::new();
        galleries.expect_find_by_id().never();
        let pipeline = GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media_known(&[])));

        let candidate = pipeline.prepare(None, &raw(json!({ "name": "New" }))).unwrap();

        assert!(candidate.is_new());
        assert_eq!(candidate.gallery.name, "New");
        assert!(candidate.binding_errors.is_empty());
    }

    #[test]
    fn test_prepare_missing_base_is_not_found() {
        let mut galleries = MockGalleryRepository::new();
        galleries.expect_find_by_id().returning(|_| Ok(None));
        let mut media = MockMediaRepository::new();
        media.expect_exists().never();
        let pipeline = GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media));

        let err = pipeline
            .prepare(Some(9), &raw(json!({ "associations": [{ "media_id": 1 }] })))
            .unwrap_err();

        assert_eq!(err.to_string(), "Gallery (9) not found");
    }

    #[test]
    fn test_prepare_overlays_only_given_fields() {
        let mut galleries = MockGalleryRepository::new();
        galleries
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Old"))));
        let pipeline = GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media_known(&[])));

        let candidate = pipeline
            .prepare(Some(0), &raw(json!({ "context": "news" })))
            .unwrap();

        assert_eq!(candidate.gallery.id, Some(0));
        assert_eq!(candidate.gallery.name, "Old");
        assert_eq!(candidate.gallery.context, "news");
        assert!(candidate.gallery.enabled);
    }

    #[test]
    fn test_binding_records_type_and_extra_field_errors() {
        let pipeline = GalleryWritePipeline::new(
            Arc::new(MockGalleryRepository::new()),
            Arc::new(media_known(&[])),
        );

        let candidate = pipeline
            .prepare(None, &raw(json!({ "name": 12, "enabled": "maybe", "id": 4 })))
            .unwrap();

        let errors = &candidate.binding_errors;
        assert!(errors.has_field("name"));
        assert!(errors.has_field("enabled"));
        assert!(errors.has_field("id"));
    }

    #[test]
    fn test_validate_reports_each_field_once() {
        let pipeline = GalleryWritePipeline::new(
            Arc::new(MockGalleryRepository::new()),
            Arc::new(media_known(&[])),
        );
        let candidate = pipeline.prepare(None, &raw(json!({ "name": 12 }))).unwrap();

        let errors = GalleryWritePipeline::validate(candidate).unwrap_err();

        assert_eq!(errors.messages_for("name").count(), 1);
        assert_eq!(
            errors.messages_for("name").next(),
            Some("This value should be of type string.")
        );
    }

    #[test]
    fn test_unknown_media_is_invalid() {
        let pipeline = GalleryWritePipeline::new(
            Arc::new(MockGalleryRepository::new()),
            Arc::new(media_known(&[10])),
        );
        let candidate = pipeline
            .prepare(
                None,
                &raw(json!({
                    "name": "G",
                    "associations": [{ "media_id": 10 }, { "media_id": 77 }]
                })),
            )
            .unwrap();

        let errors = GalleryWritePipeline::validate(candidate).unwrap_err();
        assert_eq!(
            errors.messages_for("associations[1].media_id").next(),
            Some("This value is not valid.")
        );
    }

    #[test]
    fn test_missing_positions_follow_payload_order() {
        let pipeline = GalleryWritePipeline::new(
            Arc::new(MockGalleryRepository::new()),
            Arc::new(media_known(&[10, 11, 12])),
        );
        let candidate = pipeline
            .prepare(
                None,
                &raw(json!({
                    "name": "G",
                    "associations": [
                        { "media_id": 12, "position": 7 },
                        { "media_id": 10 },
                        { "media_id": "11", "caption": "eleven" }
                    ]
                })),
            )
            .unwrap();

        let gallery = GalleryWritePipeline::validate(candidate).unwrap();
        let order: Vec<_> = gallery
            .associations
            .iter()
            .map(|a| (a.media_id, a.position))
            .collect();
        assert_eq!(order, vec![(10, 1), (11, 2), (12, 7)]);
        assert_eq!(gallery.associations[1].caption.as_deref(), Some("eleven"));
    }

    #[test]
    fn test_duplicate_positions_point_at_payload_index() {
        let pipeline = GalleryWritePipeline::new(
            Arc::new(MockGalleryRepository::new()),
            Arc::new(media_known(&[10, 11])),
        );
        let candidate = pipeline
            .prepare(
                None,
                &raw(json!({
                    "name": "G",
                    "associations": [
                        { "media_id": 10, "position": 3 },
                        { "media_id": 11, "position": 3 }
                    ]
                })),
            )
            .unwrap();

        let errors = GalleryWritePipeline::validate(candidate).unwrap_err();
        assert!(errors.has_field("associations[1].position"));
    }

    #[test]
    fn test_relinked_media_keeps_association_identity() {
        let mut galleries = MockGalleryRepository::new();
        galleries.expect_find_by_id().returning(|id| {
            let mut gallery = stored(id, "G");
            let mut existing = GalleryMediaAssociation::new(10, 0);
            existing.id = Some(500);
            existing.gallery_id = Some(id);
            gallery.associations = vec![existing];
            Ok(Some(gallery))
        });
        let pipeline =
            GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media_known(&[10, 11])));

        let candidate = pipeline
            .prepare(
                Some(1),
                &raw(json!({ "associations": [
                    { "media_id": 11, "position": 0 },
                    { "media_id": 10, "position": 1 }
                ] })),
            )
            .unwrap();

        let gallery = GalleryWritePipeline::validate(candidate).unwrap();
        assert_eq!(gallery.associations[0].id, None);
        assert_eq!(gallery.associations[1].id, Some(500));
        assert!(gallery.associations.iter().all(|a| a.gallery_id == Some(1)));
    }

    #[test]
    fn test_write_never_saves_invalid_candidate() {
        let mut galleries = MockGalleryRepository::new();
        galleries.expect_save().never();
        let pipeline = GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media_known(&[])));

        let err = pipeline.write(None, &RawInput::new()).unwrap_err();

        let errors = err.validation_errors().expect("validation failure");
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_write_saves_valid_candidate() {
        let mut galleries = MockGalleryRepository::new();
        galleries.expect_save().times(1).returning(|gallery| {
            let mut saved = gallery.clone();
            saved.id = Some(42);
            Ok(saved)
        });
        let pipeline = GalleryWritePipeline::new(Arc::new(galleries), Arc::new(media_known(&[])));

        let saved = pipeline
            .write(None, &raw(json!({ "name": "Fresh", "enabled": true })))
            .unwrap();

        assert_eq!(saved.id, Some(42));
        assert!(saved.enabled);
    }
}
