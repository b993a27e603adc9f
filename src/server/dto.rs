use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ColumnInfo, FieldUpdate, SchemaCapabilities};

// Request bodies. Scalars are optional here so that validation can answer
// with a field-specific message instead of a generic decode error.

#[derive(Debug, Default, Deserialize)]
pub struct TemplateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub department_id: FieldUpdate<Value>,
    #[serde(default)]
    pub color_id: FieldUpdate<Value>,
    #[serde(default)]
    pub completion_type_id: FieldUpdate<Value>,
    #[serde(default)]
    pub completion_type_ids: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletionTypeIdsRequest {
    #[serde(default)]
    pub completion_type_ids: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateColorRequest {
    #[serde(default)]
    pub color_id: FieldUpdate<Value>,
}

/// Shared by departments, completion types and categories.
#[derive(Debug, Default, Deserialize)]
pub struct NamedEntityRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: FieldUpdate<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ColorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hex_value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChildCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completion_type_id: FieldUpdate<Value>,
    #[serde(default)]
    pub department_id: FieldUpdate<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VariableRequest {
    #[serde(default)]
    pub namn: Option<String>,
    #[serde(default)]
    pub beskrivning: Option<String>,
    #[serde(default)]
    pub variabel_namn: Option<String>,
    #[serde(default)]
    pub exempel_varde: Option<String>,
    #[serde(default)]
    pub comments: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InformationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_id: FieldUpdate<Value>,
    #[serde(default)]
    pub comments: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentsRequest {
    #[serde(default)]
    pub comments: Option<bool>,
}

// Status responses

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub database_connected: bool,
    pub env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DbStatusResponse {
    pub database_connected: bool,
    pub tables: Vec<String>,
    pub template_columns: Vec<ColumnInfo>,
    pub color_columns: Vec<ColumnInfo>,
    pub completion_type_columns: Vec<ColumnInfo>,
    pub capabilities: SchemaCapabilities,
}
