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
use crate::types::{DepartmentInput, EntityId, EntityKind};

use super::reconcile_single_field;

const DEPARTMENT: EntityKind = EntityKind::Department;

fn department_input(req: NamedEntityRequest) -> Result<DepartmentInput, ApiError> {
    Ok(DepartmentInput {
        name: required(req.name, "Department name is required")?,
        description: req.description,
        template_id: link_field(EntityKind::Template, req.template_id)?,
    })
}

pub async fn list_departments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let departments = state
        .store
        .list_departments()
        .api_err("Failed to list departments")?;

    Ok::<_, ApiError>(Json(departments))
}

pub async fn create_department(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = department_input(decode(json_object(body)?)?)?;

    let department = state
        .store
        .create_department(&input)
        .api_err("Failed to create department")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(department)))
}

pub async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(DEPARTMENT, &id)?;

    let department = state
        .store
        .get_department(id)
        .api_err_for("Failed to get department", DEPARTMENT, id)?
        .or_not_found("Department not found")?;

    Ok::<_, ApiError>(Json(department))
}

pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_id(DEPARTMENT, &id)?;
    let payload = json_object(body)?;

    if let Some(response) = reconcile_single_field(store, DEPARTMENT, EntityId::Int(id), &payload)? {
        return Ok(response);
    }

    let input = department_input(decode(payload)?)?;
    let department = store
        .update_department(id, &input)
        .api_err_for("Failed to update department", DEPARTMENT, id)?
        .or_not_found("Department not found")?;

    Ok(Json(department).into_response())
}

pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(DEPARTMENT, &id)?;

    if !state
        .store
        .delete_department(id)
        .api_err_for("Failed to delete department", DEPARTMENT, id)?
    {
        return Err(ApiError::not_found("Department not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Department deleted successfully"))
}
