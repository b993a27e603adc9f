use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::reconcile::{reconcile_association, remove_association, replace_template_completion_types};
use crate::server::AppState;
use crate::server::dto::{CompletionTypeIdsRequest, TemplateColorRequest, TemplateRequest};
use crate::server::response::{ApiError, MessageResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{decode, id_list, json_object, link_field, parse_id, required};
use crate::store::Store;
use crate::types::{DbId, EntityId, EntityKind, FieldUpdate, Link, NewTemplate, TemplateChanges};

use super::reconcile_single_field;

const TEMPLATE: EntityKind = EntityKind::Template;

fn require_template(store: &dyn Store, id: DbId) -> Result<(), ApiError> {
    if store
        .exists(TEMPLATE, &EntityId::Int(id))
        .api_err_for("Failed to get template", TEMPLATE, id)?
    {
        Ok(())
    } else {
        Err(ApiError::not_found("Template not found"))
    }
}

pub async fn list_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let templates = state
        .store
        .list_templates()
        .api_err("Failed to list templates")?;

    Ok::<_, ApiError>(Json(templates))
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let req: TemplateRequest = decode(json_object(body)?)?;

    let input = NewTemplate {
        title: required(req.title, "Template title is required")?,
        content: required(req.content, "Template content is required")?,
        department_id: link_field(EntityKind::Department, req.department_id)?.into_option(),
        color_id: link_field(EntityKind::Color, req.color_id)?.into_option(),
        completion_type_id: link_field(EntityKind::CompletionType, req.completion_type_id)?
            .into_option(),
        completion_type_ids: req
            .completion_type_ids
            .map(|ids| id_list(EntityKind::CompletionType, ids))
            .transpose()?
            .unwrap_or_default(),
    };

    let template = state
        .store
        .create_template(&input)
        .api_err("Failed to create template")?;

    tracing::info!(template_id = template.template.id, "Created template");
    Ok::<_, ApiError>((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;

    let template = state
        .store
        .get_template(id)
        .api_err_for("Failed to get template", TEMPLATE, id)?
        .or_not_found("Template not found")?;

    Ok::<_, ApiError>(Json(template))
}

/// Full update, or a single link change when the body carries exactly one
/// link field.
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    let payload = json_object(body)?;

    if let Some(response) = reconcile_single_field(store, TEMPLATE, EntityId::Int(id), &payload)? {
        return Ok(response);
    }

    let req: TemplateRequest = decode(payload)?;
    let changes = TemplateChanges {
        title: required(req.title, "Template title is required")?,
        content: required(req.content, "Template content is required")?,
        department_id: link_field(EntityKind::Department, req.department_id)?,
        color_id: link_field(EntityKind::Color, req.color_id)?,
        completion_type_id: link_field(EntityKind::CompletionType, req.completion_type_id)?,
        completion_type_ids: req
            .completion_type_ids
            .map(|ids| id_list(EntityKind::CompletionType, ids))
            .transpose()?,
    };

    let template = store
        .update_template(id, &changes)
        .api_err_for("Failed to update template", TEMPLATE, id)?
        .or_not_found("Template not found")?;

    Ok(Json(template).into_response())
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;

    if !state
        .store
        .delete_template(id)
        .api_err_for("Failed to delete template", TEMPLATE, id)?
    {
        return Err(ApiError::not_found("Template not found"));
    }

    tracing::info!(template_id = id, "Deleted template");
    Ok::<_, ApiError>(MessageResponse::new("Template deleted"))
}

pub async fn set_template_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;
    let req: TemplateColorRequest = decode(json_object(body)?)?;
    let raw = match req.color_id {
        FieldUpdate::Absent => return Err(ApiError::bad_request("color_id is required")),
        FieldUpdate::Clear => Value::Null,
        FieldUpdate::Set(raw) => raw,
    };

    let outcome = reconcile_association(
        state.store.as_ref(),
        Link::TEMPLATE_COLOR,
        &EntityId::Int(id),
        raw,
    )?;

    Ok::<_, ApiError>(MessageResponse::new(outcome.message(Link::TEMPLATE_COLOR)))
}

pub async fn remove_template_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;

    if !remove_association(state.store.as_ref(), Link::TEMPLATE_COLOR, &EntityId::Int(id))
        .api_err_for("Failed to remove color", TEMPLATE, id)?
    {
        return Err(ApiError::not_found("Template not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new(format!(
        "Color removed from template {id}"
    )))
}

pub async fn list_template_completion_types(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    require_template(store, id)?;

    let completion_types = store
        .list_template_completion_types(id)
        .api_err_for("Failed to list completion types", TEMPLATE, id)?;

    Ok::<_, ApiError>(Json(completion_types))
}

/// Replaces the template's completion type set with the listed ids.
pub async fn set_template_completion_types(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;
    let req: CompletionTypeIdsRequest = decode(json_object(body)?)?;
    let ids = req
        .completion_type_ids
        .ok_or_else(|| ApiError::bad_request("completion_type_ids is required"))?;
    let ids = id_list(EntityKind::CompletionType, ids)?;

    let template = replace_template_completion_types(state.store.as_ref(), id, ids)
        .api_err_for("Failed to update completion types", TEMPLATE, id)?
        .or_not_found("Template not found")?;

    Ok::<_, ApiError>(Json(template))
}

pub async fn associate_completion_type(
    State(state): State<Arc<AppState>>,
    Path((id, completion_type_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    let completion_type_id = parse_id(EntityKind::CompletionType, &completion_type_id)?;
    require_template(store, id)?;

    if !store
        .associate_completion_type(id, completion_type_id)
        .api_err_for("Failed to associate completion type", TEMPLATE, id)?
    {
        return Err(ApiError::not_found("Completion type not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new(format!(
        "Completion type {completion_type_id} associated with template {id}"
    )))
}

pub async fn remove_completion_type(
    State(state): State<Arc<AppState>>,
    Path((id, completion_type_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let id = parse_id(TEMPLATE, &id)?;
    let completion_type_id = parse_id(EntityKind::CompletionType, &completion_type_id)?;

    if !state
        .store
        .remove_completion_type_association(id, completion_type_id)
        .api_err_for("Failed to remove completion type association", TEMPLATE, id)?
    {
        return Err(ApiError::not_found("Association not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new(format!(
        "Completion type {completion_type_id} association removed from template {id}"
    )))
}

pub async fn list_template_departments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    require_template(store, id)?;

    let departments = store
        .list_template_departments(id)
        .api_err_for("Failed to list departments", TEMPLATE, id)?;

    Ok::<_, ApiError>(Json(departments))
}

pub async fn list_template_categories(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    require_template(store, id)?;

    let categories = store
        .list_template_categories(id)
        .api_err_for("Failed to list categories", TEMPLATE, id)?;

    Ok::<_, ApiError>(Json(categories))
}

pub async fn list_template_information(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let id = parse_id(TEMPLATE, &id)?;
    require_template(store, id)?;

    let information = store
        .list_template_information(id)
        .api_err_for("Failed to list information", TEMPLATE, id)?;

    Ok::<_, ApiError>(Json(information))
}
