use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::server::AppState;
use crate::server::dto::InformationRequest;
use crate::server::response::{ApiError, MessageResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{decode, json_object, link_field, parse_id, required};
use crate::types::{EntityId, EntityKind, InformationInput};

use super::reconcile_single_field;
use super::variables::comments_flag;

const INFORMATION: EntityKind = EntityKind::Information;

fn information_input(req: InformationRequest) -> Result<InformationInput, ApiError> {
    Ok(InformationInput {
        name: required(req.name, "Information name is required")?,
        label: req.label,
        description: req.description,
        template_id: link_field(EntityKind::Template, req.template_id)?,
        comments: req.comments.unwrap_or(false),
    })
}

pub async fn list_information(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let items = state
        .store
        .list_information()
        .api_err("Failed to retrieve information items")?;

    Ok::<_, ApiError>(Json(items))
}

pub async fn create_information(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = information_input(decode(json_object(body)?)?)?;

    let item = state
        .store
        .create_information(&input)
        .api_err("Failed to create information item")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(item)))
}

pub async fn get_information(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(INFORMATION, &id)?;

    let item = state
        .store
        .get_information(id)
        .api_err_for("Failed to retrieve information item", INFORMATION, id)?
        .or_not_found("Information item not found")?;

    Ok::<_, ApiError>(Json(item))
}

pub async fn update_information(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_id(INFORMATION, &id)?;
    let payload = json_object(body)?;

    if let Some(response) = reconcile_single_field(store, INFORMATION, EntityId::Int(id), &payload)?
    {
        return Ok(response);
    }

    let input = information_input(decode(payload)?)?;
    let item = store
        .update_information(id, &input)
        .api_err_for("Failed to update information item", INFORMATION, id)?
        .or_not_found("Information item not found")?;

    Ok(Json(item).into_response())
}

pub async fn delete_information(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(INFORMATION, &id)?;

    if !state
        .store
        .delete_information(id)
        .api_err_for("Failed to delete information item", INFORMATION, id)?
    {
        return Err(ApiError::not_found("Information item not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Information item deleted successfully"))
}

pub async fn set_information_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(INFORMATION, &id)?;
    let comments = comments_flag(body)?;

    let item = state
        .store
        .set_information_comments(id, comments)
        .api_err_for("Failed to update comments status", INFORMATION, id)?
        .or_not_found("Information item not found")?;

    Ok::<_, ApiError>(Json(json!({
        "message": "Comments status updated successfully",
        "information": item,
    })))
}
