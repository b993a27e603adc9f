use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::server::AppState;
use crate::server::dto::ChildCategoryRequest;
use crate::server::response::{ApiError, MessageResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    decode, json_object, link_field, parse_child_id, parse_id, required,
};
use crate::types::{ChildCategoryInput, EntityId, EntityKind};

use super::reconcile_single_field;

const CHILD_CATEGORY: EntityKind = EntityKind::ChildCategory;

fn child_category_input(req: ChildCategoryRequest) -> Result<ChildCategoryInput, ApiError> {
    Ok(ChildCategoryInput {
        name: required(req.name, "Children category name is required")?,
        description: req.description,
        completion_type_id: link_field(EntityKind::CompletionType, req.completion_type_id)?,
        department_id: link_field(EntityKind::Department, req.department_id)?,
    })
}

pub async fn list_children_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let children = state
        .store
        .list_children_categories()
        .api_err("Failed to list children categories")?;

    Ok::<_, ApiError>(Json(children))
}

pub async fn list_by_completion_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(EntityKind::CompletionType, &id)?;

    let children = state
        .store
        .list_children_by_completion_type(id)
        .api_err_for(
            "Failed to list children categories",
            EntityKind::CompletionType,
            id,
        )?;

    Ok::<_, ApiError>(Json(children))
}

pub async fn list_by_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(EntityKind::Department, &id)?;

    let children = state
        .store
        .list_children_by_department(id)
        .api_err_for(
            "Failed to list children categories",
            EntityKind::Department,
            id,
        )?;

    Ok::<_, ApiError>(Json(children))
}

pub async fn create_child_category(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = child_category_input(decode(json_object(body)?)?)?;

    let child = state
        .store
        .create_child_category(&input)
        .api_err("Failed to create children category")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(child)))
}

pub async fn get_child_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_child_id(&id)?;

    let child = state
        .store
        .get_child_category(&id)
        .api_err_for("Failed to get children category", CHILD_CATEGORY, &id)?
        .or_not_found("Children category not found")?;

    Ok::<_, ApiError>(Json(child))
}

pub async fn update_child_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_child_id(&id)?;
    let payload = json_object(body)?;

    if let Some(response) =
        reconcile_single_field(store, CHILD_CATEGORY, EntityId::Uuid(id.clone()), &payload)?
    {
        return Ok(response);
    }

    let input = child_category_input(decode(payload)?)?;
    let child = store
        .update_child_category(&id, &input)
        .api_err_for("Failed to update children category", CHILD_CATEGORY, &id)?
        .or_not_found("Children category not found")?;

    Ok(Json(child).into_response())
}

pub async fn delete_child_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_child_id(&id)?;

    if !state
        .store
        .delete_child_category(&id)
        .api_err_for("Failed to delete children category", CHILD_CATEGORY, &id)?
    {
        return Err(ApiError::not_found("Children category not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Children category deleted successfully"))
}
