use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::server::AppState;
use crate::server::dto::{CommentsRequest, VariableRequest};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::server::validation::{decode, default_variable_name, json_object, parse_id, required};
use crate::types::{EntityKind, VariableInput};

const VARIABLE: EntityKind = EntityKind::Variable;

fn variable_input(req: VariableRequest) -> Result<VariableInput, ApiError> {
    let namn = required(req.namn, "Variable name (namn) is required")?;
    let variabel_namn = req
        .variabel_namn
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_variable_name(&namn));

    Ok(VariableInput {
        namn,
        beskrivning: req.beskrivning,
        variabel_namn,
        exempel_varde: req.exempel_varde,
        comments: req.comments.unwrap_or(false),
    })
}

pub async fn list_variables(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let variables = state
        .store
        .list_variables()
        .api_err("Failed to retrieve variables")?;

    Ok::<_, ApiError>(Json(variables))
}

pub async fn create_variable(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = variable_input(decode(json_object(body)?)?)?;

    let variable = state
        .store
        .create_variable(&input)
        .api_err("Failed to create variable")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(variable)))
}

pub async fn get_variable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(VARIABLE, &id)?;

    let variable = state
        .store
        .get_variable(id)
        .api_err_for("Failed to retrieve variable", VARIABLE, id)?
        .or_not_found("Variable not found")?;

    Ok::<_, ApiError>(Json(variable))
}

pub async fn update_variable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(VARIABLE, &id)?;
    let input = variable_input(decode(json_object(body)?)?)?;

    let variable = state
        .store
        .update_variable(id, &input)
        .api_err_for("Failed to update variable", VARIABLE, id)?
        .or_not_found("Variable not found")?;

    Ok::<_, ApiError>(Json(variable))
}

pub async fn delete_variable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(VARIABLE, &id)?;

    if !state
        .store
        .delete_variable(id)
        .api_err_for("Failed to delete variable", VARIABLE, id)?
    {
        return Err(ApiError::not_found("Variable not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn set_variable_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(VARIABLE, &id)?;
    let comments = comments_flag(body)?;

    let variable = state
        .store
        .set_variable_comments(id, comments)
        .api_err_for("Failed to update comments status", VARIABLE, id)?
        .or_not_found("Variable not found")?;

    tracing::info!(variable_id = id, comments, "Updated variable comments flag");

    Ok::<_, ApiError>(Json(json!({
        "message": "Comments status updated successfully",
        "variable": variable,
    })))
}

/// Extracts the mandatory `comments` flag of a comments toggle body.
pub(super) fn comments_flag(body: Result<Json<Value>, JsonRejection>) -> Result<bool, ApiError> {
    let missing = || ApiError::bad_request("Missing comments field in request data");
    let payload = json_object(body).map_err(|_| missing())?;
    let request: CommentsRequest = decode(payload)?;
    request.comments.ok_or_else(missing)
}
