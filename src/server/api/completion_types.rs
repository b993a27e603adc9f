use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::server::AppState;
use crate::server::dto::NamedEntityRequest;
use crate::server::response::{ApiError, MessageResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{decode, json_object, link_field, parse_id, required};
use crate::types::{CompletionTypeInput, EntityId, EntityKind};

use super::reconcile_single_field;

const COMPLETION_TYPE: EntityKind = EntityKind::CompletionType;

fn completion_type_input(req: NamedEntityRequest) -> Result<CompletionTypeInput, ApiError> {
    Ok(CompletionTypeInput {
        name: required(req.name, "Completion type name is required")?,
        description: req.description,
        template_id: link_field(EntityKind::Template, req.template_id)?,
    })
}

pub async fn list_completion_types(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let completion_types = state
        .store
        .list_completion_types()
        .api_err("Failed to list completion types")?;

    Ok::<_, ApiError>(Json(completion_types))
}

pub async fn create_completion_type(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = completion_type_input(decode(json_object(body)?)?)?;

    let completion_type = state
        .store
        .create_completion_type(&input)
        .api_err("Failed to create completion type")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(completion_type)))
}

pub async fn get_completion_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(COMPLETION_TYPE, &id)?;

    let completion_type = state
        .store
        .get_completion_type(id)
        .api_err_for("Failed to get completion type", COMPLETION_TYPE, id)?
        .or_not_found("Completion type not found")?;

    Ok::<_, ApiError>(Json(completion_type))
}

pub async fn update_completion_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_id(COMPLETION_TYPE, &id)?;
    let payload = json_object(body)?;

    if let Some(response) =
        reconcile_single_field(store, COMPLETION_TYPE, EntityId::Int(id), &payload)?
    {
        return Ok(response);
    }

    let input = completion_type_input(decode(payload)?)?;
    let completion_type = store
        .update_completion_type(id, &input)
        .api_err_for("Failed to update completion type", COMPLETION_TYPE, id)?
        .or_not_found("Completion type not found")?;

    Ok(Json(completion_type).into_response())
}

/// Refused with 409 while a template still references the completion type.
pub async fn delete_completion_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(COMPLETION_TYPE, &id)?;

    if !state
        .store
        .delete_completion_type(id)
        .api_err_for("Failed to delete completion type", COMPLETION_TYPE, id)?
    {
        return Err(ApiError::not_found("Completion type not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Completion type deleted"))
}
