use std::fmt::Display;
use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{Error, Result as StoreResult};
use crate::reconcile::ReconcileError;

/// Body for association and delete operations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match &err {
            ReconcileError::InvalidId { .. } => ApiError::bad_request(err.to_string()),
            ReconcileError::NotFound { .. } => ApiError::not_found(err.to_string()),
            ReconcileError::UpdateFailed { .. } if err.is_unsupported() => {
                ApiError::bad_request(err.to_string())
            }
            ReconcileError::UpdateFailed { source, .. } => {
                ApiError::internal("Failed to update association")
                    .with_details(Value::String(source.to_string()))
            }
        }
    }
}

/// Maps a store error to a response, logging the ones that are not the
/// caller's fault.
fn store_error(
    err: Error,
    message: &'static str,
    entity: Option<&str>,
    id: Option<&dyn Display>,
    location: &'static Location<'static>,
) -> ApiError {
    let entity = entity.unwrap_or("-");
    let id = id.map_or_else(|| "-".to_string(), ToString::to_string);

    match err {
        Error::Validation(msg) => ApiError::bad_request(msg),
        Error::NotFound => ApiError::not_found(format!("{message}: not found")),
        Error::AssociationConflict { id: ct_id, templates } => {
            tracing::warn!(
                operation = message,
                entity,
                id = %id,
                blocking = templates.len(),
                "Delete blocked by template references"
            );
            ApiError::conflict(format!(
                "Cannot delete completion type {ct_id}: it is used by {} template(s)",
                templates.len()
            ))
            .with_details(json!({ "templates": templates }))
        }
        Error::Unsupported(what) => {
            tracing::warn!(operation = message, entity, id = %id, unsupported = %what, "Unsupported by schema");
            ApiError::bad_request(format!("{message}: {what} is not available in this database"))
        }
        other => {
            tracing::error!(
                operation = message,
                entity,
                id = %id,
                error = %other,
                caller = %location,
                "Store operation failed"
            );
            ApiError::internal(message).with_details(Value::String(other.to_string()))
        }
    }
}

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;

    /// Like `api_err`, with the entity and id the operation touched.
    fn api_err_for(
        self,
        message: &'static str,
        entity: impl Display,
        id: impl Display,
    ) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    #[track_caller]
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        let location = Location::caller();
        self.map_err(|e| store_error(e, message, None, None, location))
    }

    #[track_caller]
    fn api_err_for(
        self,
        message: &'static str,
        entity: impl Display,
        id: impl Display,
    ) -> Result<T, ApiError> {
        let location = Location::caller();
        self.map_err(|e| {
            let entity = entity.to_string();
            store_error(e, message, Some(entity.as_str()), Some(&id as &dyn Display), location)
        })
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
