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
use crate::types::{CategoryInput, EntityId, EntityKind};

use super::reconcile_single_field;

const CATEGORY: EntityKind = EntityKind::Category;

fn category_input(req: NamedEntityRequest) -> Result<CategoryInput, ApiError> {
    Ok(CategoryInput {
        name: required(req.name, "Category name is required")?,
        description: req.description,
        template_id: link_field(EntityKind::Template, req.template_id)?,
    })
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let categories = state
        .store
        .list_categories()
        .api_err("Failed to list categories")?;

    Ok::<_, ApiError>(Json(categories))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = category_input(decode(json_object(body)?)?)?;

    let category = state
        .store
        .create_category(&input)
        .api_err("Failed to create category")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(CATEGORY, &id)?;

    let category = state
        .store
        .get_category(id)
        .api_err_for("Failed to get category", CATEGORY, id)?
        .or_not_found("Category not found")?;

    Ok::<_, ApiError>(Json(category))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_id(CATEGORY, &id)?;
    let payload = json_object(body)?;

    if let Some(response) = reconcile_single_field(store, CATEGORY, EntityId::Int(id), &payload)? {
        return Ok(response);
    }

    let input = category_input(decode(payload)?)?;
    let category = store
        .update_category(id, &input)
        .api_err_for("Failed to update category", CATEGORY, id)?
        .or_not_found("Category not found")?;

    Ok(Json(category).into_response())
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(CATEGORY, &id)?;

    if !state
        .store
        .delete_category(id)
        .api_err_for("Failed to delete category", CATEGORY, id)?
    {
        return Err(ApiError::not_found("Category not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Category deleted successfully"))
}
