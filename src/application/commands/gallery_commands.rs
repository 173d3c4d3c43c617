// src/application/commands/gallery_commands.rs
//
// Gallery Command Handlers
//
// RULES:
// - Accept raw JSON from the transport
// - Call the gallery service
// - Return DTOs, or an ErrorResponse
// - Never contain business logic

use serde_json::{Map, Value};

use crate::application::dto::{AssociationReadDto, GalleryReadDto, GalleryWriteDto, MediaReadDto};
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;
use crate::domain::GalleryId;
use crate::services::DeleteAck;

pub type CommandResult<T> = Result<T, ErrorResponse>;

/// Transport payloads must be JSON objects; `null` counts as empty
fn as_object(field: &str, value: Value) -> CommandResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ErrorResponse::validation(
            field,
            "This value should be of type object.",
        )),
    }
}

/// List galleries matching the raw query parameters
pub fn list_galleries(state: &AppState, params: Value) -> CommandResult<Vec<GalleryReadDto>> {
    let params = as_object("query", params)?;

    let galleries = state.gallery_service.list(&params)?;

    Ok(galleries.into_iter().map(GalleryReadDto::from).collect())
}

pub fn get_gallery(state: &AppState, id: GalleryId) -> CommandResult<GalleryReadDto> {
    Ok(state.gallery_service.get(id)?.into())
}

pub fn get_gallery_media(state: &AppState, id: GalleryId) -> CommandResult<Vec<MediaReadDto>> {
    let media = state.gallery_service.get_media(id)?;
    Ok(media.into_iter().map(MediaReadDto::from).collect())
}

pub fn get_gallery_associations(
    state: &AppState,
    id: GalleryId,
) -> CommandResult<Vec<AssociationReadDto>> {
    let associations = state.gallery_service.get_associations(id)?;
    Ok(associations.into_iter().map(AssociationReadDto::from).collect())
}

pub fn create_gallery(state: &AppState, payload: Value) -> CommandResult<GalleryWriteDto> {
    let raw = as_object("body", payload)?;
    Ok(state.gallery_service.create(&raw)?.into())
}

pub fn update_gallery(
    state: &AppState,
    id: GalleryId,
    payload: Value,
) -> CommandResult<GalleryWriteDto> {
    let raw = as_object("body", payload)?;
    Ok(state.gallery_service.update(id, &raw)?.into())
}

pub fn delete_gallery(state: &AppState, id: GalleryId) -> CommandResult<DeleteAck> {
    Ok(state.gallery_service.delete(id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;
    use crate::application::state::AppState;
    use crate::db::create_test_pool;
    use crate::services::ListRules;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::from_pool(Arc::new(create_test_pool()), ListRules::default())
    }

    #[test]
    fn test_create_then_get() {
        let state = state();

        let created = create_gallery(&state, json!({ "name": "Trip", "enabled": true })).unwrap();
        let id = created.id.unwrap();

        let read = get_gallery(&state, id).unwrap();
        assert_eq!(read.name, "Trip");
        assert!(read.enabled);
    }

    #[test]
    fn test_non_object_payload_is_validation_error() {
        let state = state();

        let err = create_gallery(&state, json!(["name"])).unwrap_err();

        assert_eq!(err.error_type, ErrorType::Validation);
        assert_eq!(err.errors[0].field, "body");
    }

    #[test]
    fn test_missing_gallery_maps_to_not_found() {
        let state = state();

        let err = delete_gallery(&state, 12).unwrap_err();

        assert_eq!(err.error_type, ErrorType::NotFound);
        assert_eq!(err.message, "Gallery (12) not found");
    }

    #[test]
    fn test_list_with_null_params() {
        let state = state();
        create_gallery(&state, json!({ "name": "One" })).unwrap();

        let listed = list_galleries(&state, Value::Null).unwrap();

        assert_eq!(listed.len(), 1);
    }
}
