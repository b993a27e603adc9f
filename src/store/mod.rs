mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Single reads return `Ok(None)` when the row does not exist and `Err` when
/// the backend fails. Updates return `Ok(None)` when no row matched.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Optional schema features, resolved once and cached.
    fn capabilities(&self) -> Result<SchemaCapabilities>;

    fn ping(&self) -> Result<()>;
    fn schema_report(&self) -> Result<SchemaReport>;
    fn table_counts(&self) -> Result<TableCounts>;

    // Generic association primitives
    fn exists(&self, kind: EntityKind, id: &EntityId) -> Result<bool>;
    /// Writes `target` (or NULL) into the link column of one source row.
    /// Returns false when no source row matched.
    fn set_link(&self, link: Link, source_id: &EntityId, target: Option<&EntityId>)
    -> Result<bool>;

    // Template operations
    fn list_templates(&self) -> Result<Vec<TemplateDetail>>;
    fn get_template(&self, id: DbId) -> Result<Option<TemplateDetail>>;
    fn create_template(&self, input: &NewTemplate) -> Result<TemplateDetail>;
    fn update_template(&self, id: DbId, changes: &TemplateChanges)
    -> Result<Option<TemplateDetail>>;
    fn delete_template(&self, id: DbId) -> Result<bool>;

    // Template <-> completion type set (completion_types.template_id)
    fn list_template_completion_types(&self, template_id: DbId) -> Result<Vec<CompletionType>>;
    fn associate_completion_type(&self, template_id: DbId, completion_type_id: DbId)
    -> Result<bool>;
    fn remove_completion_type_association(
        &self,
        template_id: DbId,
        completion_type_id: DbId,
    ) -> Result<bool>;

    // Department operations
    fn list_departments(&self) -> Result<Vec<Department>>;
    fn list_template_departments(&self, template_id: DbId) -> Result<Vec<Department>>;
    fn get_department(&self, id: DbId) -> Result<Option<Department>>;
    fn create_department(&self, input: &DepartmentInput) -> Result<Department>;
    fn update_department(&self, id: DbId, input: &DepartmentInput) -> Result<Option<Department>>;
    fn delete_department(&self, id: DbId) -> Result<bool>;

    // Color operations
    fn list_colors(&self) -> Result<Vec<Color>>;
    fn get_color(&self, id: DbId) -> Result<Option<Color>>;
    fn create_color(&self, input: &ColorInput) -> Result<Color>;
    fn update_color(&self, id: DbId, input: &ColorInput) -> Result<Option<Color>>;
    fn delete_color(&self, id: DbId) -> Result<bool>;

    // Completion type operations
    fn list_completion_types(&self) -> Result<Vec<CompletionType>>;
    fn get_completion_type(&self, id: DbId) -> Result<Option<CompletionType>>;
    fn create_completion_type(&self, input: &CompletionTypeInput) -> Result<CompletionType>;
    fn update_completion_type(
        &self,
        id: DbId,
        input: &CompletionTypeInput,
    ) -> Result<Option<CompletionType>>;
    /// Fails with `Error::AssociationConflict` while a template still points
    /// at the completion type.
    fn delete_completion_type(&self, id: DbId) -> Result<bool>;

    // Category operations
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn list_template_categories(&self, template_id: DbId) -> Result<Vec<Category>>;
    fn get_category(&self, id: DbId) -> Result<Option<Category>>;
    fn create_category(&self, input: &CategoryInput) -> Result<Category>;
    fn update_category(&self, id: DbId, input: &CategoryInput) -> Result<Option<Category>>;
    fn delete_category(&self, id: DbId) -> Result<bool>;

    // Children category operations (UUID keys)
    fn list_children_categories(&self) -> Result<Vec<ChildCategory>>;
    fn list_children_by_completion_type(&self, completion_type_id: DbId)
    -> Result<Vec<ChildCategory>>;
    fn list_children_by_department(&self, department_id: DbId) -> Result<Vec<ChildCategory>>;
    fn get_child_category(&self, id: &str) -> Result<Option<ChildCategory>>;
    fn create_child_category(&self, input: &ChildCategoryInput) -> Result<ChildCategory>;
    fn update_child_category(
        &self,
        id: &str,
        input: &ChildCategoryInput,
    ) -> Result<Option<ChildCategory>>;
    fn delete_child_category(&self, id: &str) -> Result<bool>;

    // Variable operations
    fn list_variables(&self) -> Result<Vec<Variable>>;
    fn get_variable(&self, id: DbId) -> Result<Option<Variable>>;
    fn create_variable(&self, input: &VariableInput) -> Result<Variable>;
    fn update_variable(&self, id: DbId, input: &VariableInput) -> Result<Option<Variable>>;
    fn delete_variable(&self, id: DbId) -> Result<bool>;
    fn set_variable_comments(&self, id: DbId, comments: bool) -> Result<Option<Variable>>;

    // Information operations
    fn list_information(&self) -> Result<Vec<Information>>;
    fn list_template_information(&self, template_id: DbId) -> Result<Vec<Information>>;
    fn get_information(&self, id: DbId) -> Result<Option<Information>>;
    fn create_information(&self, input: &InformationInput) -> Result<Information>;
    fn update_information(&self, id: DbId, input: &InformationInput)
    -> Result<Option<Information>>;
    fn delete_information(&self, id: DbId) -> Result<bool>;
    fn set_information_comments(&self, id: DbId, comments: bool) -> Result<Option<Information>>;
}
