mod categories;
mod children_categories;
mod colors;
mod completion_types;
mod departments;
mod information;
mod status;
mod templates;
mod variables;

use std::sync::Arc;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::{Map, Value};

use crate::reconcile::{reconcile_association, single_association_field};
use crate::server::AppState;
use crate::server::response::{ApiError, MessageResponse};
use crate::store::Store;
use crate::types::{EntityId, EntityKind};

pub use status::health;

/// Routes an update body that carries a single link field through the
/// reconciler. `None` means the body is a full update.
fn reconcile_single_field(
    store: &dyn Store,
    kind: EntityKind,
    id: EntityId,
    payload: &Map<String, Value>,
) -> Result<Option<Response>, ApiError> {
    let Some((link, value)) = single_association_field(kind, payload) else {
        return Ok(None);
    };
    let outcome = reconcile_association(store, link, &id, value.clone())?;
    Ok(Some(
        MessageResponse::new(outcome.message(link)).into_response(),
    ))
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Status
        .route("/health", get(status::api_health))
        .route("/status", get(status::status))
        .route("/debug/db-status", get(status::db_status))
        // Templates
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route(
            "/templates/{id}/color",
            put(templates::set_template_color).delete(templates::remove_template_color),
        )
        .route(
            "/templates/{id}/completion-types",
            get(templates::list_template_completion_types)
                .put(templates::set_template_completion_types),
        )
        .route(
            "/templates/{id}/completion-types/{completion_type_id}",
            put(templates::associate_completion_type).delete(templates::remove_completion_type),
        )
        .route(
            "/templates/{id}/departments",
            get(templates::list_template_departments),
        )
        .route(
            "/templates/{id}/categories",
            get(templates::list_template_categories),
        )
        .route(
            "/templates/{id}/information",
            get(templates::list_template_information),
        )
        // Departments
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route(
            "/departments/{id}/children-categories",
            get(children_categories::list_by_department),
        )
        // Colors
        .route("/colors", get(colors::list_colors).post(colors::create_color))
        .route(
            "/colors/{id}",
            get(colors::get_color)
                .put(colors::update_color)
                .delete(colors::delete_color),
        )
        // Completion types
        .route(
            "/completion-types",
            get(completion_types::list_completion_types)
                .post(completion_types::create_completion_type),
        )
        .route(
            "/completion-types/{id}",
            get(completion_types::get_completion_type)
                .put(completion_types::update_completion_type)
                .delete(completion_types::delete_completion_type),
        )
        .route(
            "/completion-types/{id}/children-categories",
            get(children_categories::list_by_completion_type),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Children categories
        .route(
            "/children-categories",
            get(children_categories::list_children_categories)
                .post(children_categories::create_child_category),
        )
        .route(
            "/children-categories/{id}",
            get(children_categories::get_child_category)
                .put(children_categories::update_child_category)
                .delete(children_categories::delete_child_category),
        )
        // Text variables
        .route(
            "/text/variables",
            get(variables::list_variables).post(variables::create_variable),
        )
        .route(
            "/text/variables/{id}",
            get(variables::get_variable)
                .put(variables::update_variable)
                .delete(variables::delete_variable),
        )
        .route(
            "/text/variables/{id}/comments",
            put(variables::set_variable_comments),
        )
        // Information items
        .route(
            "/information",
            get(information::list_information).post(information::create_information),
        )
        .route(
            "/information/{id}",
            get(information::get_information)
                .put(information::update_information)
                .delete(information::delete_information),
        )
        .route(
            "/information/{id}/comments",
            put(information::set_information_comments),
        )
}
