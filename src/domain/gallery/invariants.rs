use std::collections::HashMap;

use super::entity::Gallery;
use crate::domain::ValidationErrors;

pub const NAME_MAX_LENGTH: usize = 255;
pub const CONTEXT_MAX_LENGTH: usize = 64;
pub const FORMAT_MAX_LENGTH: usize = 255;
pub const CAPTION_MAX_LENGTH: usize = 255;

pub(crate) const NOT_BLANK: &str = "This value should not be blank.";

/// Validates every Gallery invariant and reports all violations at once
pub fn validate_gallery(gallery: &Gallery) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_text(&mut errors, "name", &gallery.name, NAME_MAX_LENGTH);
    check_text(&mut errors, "context", &gallery.context, CONTEXT_MAX_LENGTH);
    check_text(
        &mut errors,
        "default_format",
        &gallery.default_format,
        FORMAT_MAX_LENGTH,
    );
    check_associations(&mut errors, gallery);

    errors.into_result()
}

fn check_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, NOT_BLANK);
    } else if value.chars().count() > max {
        errors.add(field, too_long(max));
    }
}

fn too_long(max: usize) -> String {
    format!("This value is too long. It should have {} characters or less.", max)
}

/// Positions are non-negative and unique within the gallery
fn check_associations(errors: &mut ValidationErrors, gallery: &Gallery) {
    let mut seen: HashMap<i32, usize> = HashMap::new();

    for (index, association) in gallery.associations.iter().enumerate() {
        let field = format!("associations[{}].position", index);

        if association.position < 0 {
            errors.add(field.clone(), "This value should be positive or zero.");
        }

        if let Some(first) = seen.get(&association.position) {
            errors.add(
                field,
                format!(
                    "Position {} is already used by associations[{}].",
                    association.position, first
                ),
            );
        } else {
            seen.insert(association.position, index);
        }

        if let Some(caption) = &association.caption {
            if caption.chars().count() > CAPTION_MAX_LENGTH {
                errors.add(
                    format!("associations[{}].caption", index),
                    too_long(CAPTION_MAX_LENGTH),
                );
            }
        }
    }
}

/// Invariants that must hold true for a Gallery:
///
/// 1. Identity is assigned by the store and never changes afterwards
/// 2. Name, context and default format are never blank
/// 3. Association positions are unique within one gallery (not globally)
/// 4. Association order is display order
/// 5. A gallery may exist without any media

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gallery::GalleryMediaAssociation;

    #[test]
    fn test_valid_gallery() {
        let gallery = Gallery::new("Summer".to_string());
        assert!(validate_gallery(&gallery).is_ok());
    }

    #[test]
    fn test_blank_name_fails() {
        let gallery = Gallery::new("   ".to_string());
        let errors = validate_gallery(&gallery).unwrap_err();
        assert!(errors.has_field("name"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_overlong_context_fails() {
        let mut gallery = Gallery::new("Summer".to_string());
        gallery.context = "c".repeat(CONTEXT_MAX_LENGTH + 1);
        let errors = validate_gallery(&gallery).unwrap_err();
        assert!(errors.has_field("context"));
    }

    #[test]
    fn test_duplicate_positions_fail() {
        let mut gallery = Gallery::new("Summer".to_string());
        gallery.associations = vec![
            GalleryMediaAssociation::new(10, 0),
            GalleryMediaAssociation::new(11, 0),
        ];

        let errors = validate_gallery(&gallery).unwrap_err();
        assert!(errors.has_field("associations[1].position"));
        assert!(!errors.has_field("associations[0].position"));
    }

    #[test]
    fn test_negative_position_fails() {
        let mut gallery = Gallery::new("Summer".to_string());
        gallery.associations = vec![GalleryMediaAssociation::new(10, -1)];

        let errors = validate_gallery(&gallery).unwrap_err();
        assert!(errors.has_field("associations[0].position"));
    }

    #[test]
    fn test_same_position_in_different_galleries_is_fine() {
        let mut first = Gallery::new("A".to_string());
        first.associations = vec![GalleryMediaAssociation::new(10, 0)];
        let mut second = Gallery::new("B".to_string());
        second.associations = vec![GalleryMediaAssociation::new(10, 0)];

        assert!(validate_gallery(&first).is_ok());
        assert!(validate_gallery(&second).is_ok());
    }
}
