use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use crate::server::AppState;
use crate::server::dto::ColorRequest;
use crate::server::response::{ApiError, MessageResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{decode, json_object, normalize_hex, parse_id, required};
use crate::types::{ColorInput, EntityKind};

const COLOR: EntityKind = EntityKind::Color;

fn color_input(req: ColorRequest) -> Result<ColorInput, ApiError> {
    let name = required(req.name, "Color name is required")?;
    let hex_value = required(req.hex_value, "Color hex value is required")?;
    Ok(ColorInput {
        name,
        hex_value: normalize_hex(&hex_value),
        description: req.description,
    })
}

pub async fn list_colors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let colors = state.store.list_colors().api_err("Failed to list colors")?;

    Ok::<_, ApiError>(Json(colors))
}

pub async fn create_color(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let input = color_input(decode(json_object(body)?)?)?;

    let color = state
        .store
        .create_color(&input)
        .api_err("Failed to create color")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(color)))
}

pub async fn get_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(COLOR, &id)?;

    let color = state
        .store
        .get_color(id)
        .api_err_for("Failed to get color", COLOR, id)?
        .or_not_found("Color not found")?;

    Ok::<_, ApiError>(Json(color))
}

pub async fn update_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let id = parse_id(COLOR, &id)?;
    let input = color_input(decode(json_object(body)?)?)?;

    let color = state
        .store
        .update_color(id, &input)
        .api_err_for("Failed to update color", COLOR, id)?
        .or_not_found("Color not found")?;

    Ok::<_, ApiError>(Json(color))
}

pub async fn delete_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(COLOR, &id)?;

    if !state
        .store
        .delete_color(id)
        .api_err_for("Failed to delete color", COLOR, id)?
    {
        return Err(ApiError::not_found("Color not found"));
    }

    Ok::<_, ApiError>(MessageResponse::new("Color deleted"))
}
