use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::field::FieldUpdate;
use super::ids::DbId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub department_id: Option<DbId>,
    pub color_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_type_id: Option<DbId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSummary {
    pub id: DbId,
    pub name: String,
    pub hex_value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTypeSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// A template with its department, color and completion types inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
    pub department: Option<DepartmentSummary>,
    pub color: Option<ColorSummary>,
    pub completion_types: Vec<CompletionTypeSummary>,
}

/// A template that blocks a delete elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: DbId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub template_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    pub id: DbId,
    pub name: String,
    pub hex_value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionType {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub template_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub template_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub completion_type_id: Option<DbId>,
    pub department_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: DbId,
    pub namn: String,
    pub beskrivning: Option<String>,
    pub variabel_namn: String,
    pub exempel_varde: Option<String>,
    pub comments: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Information {
    pub id: DbId,
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub template_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_title: Option<String>,
    pub comments: bool,
    pub created_at: DateTime<Utc>,
}

// Write-side inputs. These are validated by the HTTP layer before they reach
// the store.

#[derive(Debug, Clone, Default)]
pub struct NewTemplate {
    pub title: String,
    pub content: String,
    pub department_id: Option<DbId>,
    pub color_id: Option<DbId>,
    pub completion_type_id: Option<DbId>,
    pub completion_type_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub title: String,
    pub content: String,
    pub department_id: FieldUpdate<DbId>,
    pub color_id: FieldUpdate<DbId>,
    pub completion_type_id: FieldUpdate<DbId>,
    /// `Some` replaces the whole completion type set, `None` leaves it alone.
    pub completion_type_ids: Option<Vec<DbId>>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentInput {
    pub name: String,
    pub description: Option<String>,
    pub template_id: FieldUpdate<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct ColorInput {
    pub name: String,
    pub hex_value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionTypeInput {
    pub name: String,
    pub description: Option<String>,
    pub template_id: FieldUpdate<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub template_id: FieldUpdate<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct ChildCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub completion_type_id: FieldUpdate<DbId>,
    pub department_id: FieldUpdate<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct VariableInput {
    pub namn: String,
    pub beskrivning: Option<String>,
    pub variabel_namn: String,
    pub exempel_varde: Option<String>,
    pub comments: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InformationInput {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub template_id: FieldUpdate<DbId>,
    pub comments: bool,
}

/// Optional schema features, resolved once per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaCapabilities {
    /// `completion_types.template_id` exists and may be written.
    pub completion_type_template_link: bool,
}

/// Row counts per table, used by `admin info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCounts {
    pub templates: i64,
    pub departments: i64,
    pub colors: i64,
    pub completion_types: i64,
    pub categories: i64,
    pub children_categories: i64,
    pub variables: i64,
    pub information: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Snapshot of the live schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaReport {
    pub tables: Vec<String>,
    pub template_columns: Vec<ColumnInfo>,
    pub color_columns: Vec<ColumnInfo>,
    pub completion_type_columns: Vec<ColumnInfo>,
}
