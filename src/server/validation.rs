use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::server::response::ApiError;
use crate::types::{DbId, EntityId, EntityKind, FieldUpdate, IdKind};

/// A required text field: present and not blank.
pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(message)),
    }
}

/// Prepends `#` to a hex color when it is missing.
#[must_use]
pub fn normalize_hex(value: &str) -> String {
    let value = value.trim();
    if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    }
}

/// The placeholder a variable is referenced by when none is given.
#[must_use]
pub fn default_variable_name(namn: &str) -> String {
    format!("${namn}$")
}

/// Parses an integer id from a path segment.
pub fn parse_id(kind: EntityKind, raw: &str) -> Result<DbId, ApiError> {
    kind.parse_id(raw)
        .and_then(|id| id.as_int())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {kind} ID: {raw}")))
}

/// Parses a children category id (UUID) from a path segment.
pub fn parse_child_id(raw: &str) -> Result<String, ApiError> {
    match EntityKind::ChildCategory.parse_id(raw) {
        Some(EntityId::Uuid(id)) => Ok(id),
        _ => Err(ApiError::bad_request(format!(
            "Invalid {} ID: {raw}",
            EntityKind::ChildCategory
        ))),
    }
}

/// Resolves a link field of a full update to an integer id change.
pub fn link_field(
    target: EntityKind,
    update: FieldUpdate<Value>,
) -> Result<FieldUpdate<DbId>, ApiError> {
    update
        .coerce_id(IdKind::Integer)
        .map_err(|value| invalid_id(target, &value))?
        .try_map(|id| id.as_int().ok_or_else(|| invalid_id(target, &Value::Null)))
}

/// Resolves a list of integer ids, rejecting the first one that does not parse.
pub fn id_list(target: EntityKind, values: Vec<Value>) -> Result<Vec<DbId>, ApiError> {
    values
        .into_iter()
        .map(|value| {
            IdKind::Integer
                .coerce(&value)
                .and_then(|id| id.as_int())
                .ok_or_else(|| invalid_id(target, &value))
        })
        .collect()
}

fn invalid_id(kind: EntityKind, value: &Value) -> ApiError {
    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    ApiError::bad_request(format!("Invalid {kind} ID: {shown}"))
}

/// Unwraps a JSON body that must be a non-empty object.
pub fn json_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match body {
        Ok(Json(Value::Object(map))) if !map.is_empty() => Ok(map),
        Ok(_) => Err(ApiError::bad_request("No data provided")),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected request body");
            Err(ApiError::bad_request("No data provided"))
        }
    }
}

/// Decodes a JSON object into a request DTO.
pub fn decode<T: DeserializeOwned>(payload: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}
