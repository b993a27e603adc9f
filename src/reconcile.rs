//! Association reconciliation for nullable foreign keys.
//!
//! A payload value for a link column is either removed (`null`, `""`,
//! `"null"`) or coerced to the target's id kind and associated. Both paths
//! go through [`Store::set_link`], so every link behaves the same way.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{DbId, EntityId, EntityKind, FieldUpdate, Link, TemplateChanges, TemplateDetail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationOutcome {
    Associated { target_id: EntityId },
    Removed,
}

impl AssociationOutcome {
    /// Response message for a reconciled link.
    #[must_use]
    pub fn message(&self, link: Link) -> String {
        match self {
            AssociationOutcome::Associated { .. } => {
                format!("{} associated successfully", link.target.title())
            }
            AssociationOutcome::Removed => {
                format!("{} association removed successfully", link.target.title())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Invalid {kind} ID: {value}")]
    InvalidId { kind: EntityKind, value: String },

    #[error("{} with ID {id} not found", .kind.title())]
    NotFound { kind: EntityKind, id: String },

    #[error("Failed to update {link}: {source}")]
    UpdateFailed {
        link: Link,
        #[source]
        source: Error,
    },
}

impl ReconcileError {
    /// The link column does not exist in the running schema.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            ReconcileError::UpdateFailed {
                source: Error::Unsupported(_),
                ..
            }
        )
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Applies a present payload value to one link of one source row.
pub fn reconcile_association(
    store: &dyn Store,
    link: Link,
    source_id: &EntityId,
    raw: Value,
) -> std::result::Result<AssociationOutcome, ReconcileError> {
    let value = match FieldUpdate::from_raw(raw) {
        FieldUpdate::Set(value) => value,
        FieldUpdate::Absent | FieldUpdate::Clear => {
            return match remove_association(store, link, source_id) {
                Ok(true) => {
                    tracing::info!(%link, %source_id, outcome = "removed", "Association reconciled");
                    Ok(AssociationOutcome::Removed)
                }
                Ok(false) => Err(ReconcileError::NotFound {
                    kind: link.source,
                    id: source_id.to_string(),
                }),
                Err(source) => Err(ReconcileError::UpdateFailed { link, source }),
            };
        }
    };

    let target_id = link.target.id_kind().coerce(&value).ok_or_else(|| {
        tracing::debug!(%link, %source_id, value = %value, "Rejected association id");
        ReconcileError::InvalidId {
            kind: link.target,
            value: describe(&value),
        }
    })?;

    for (kind, id) in [(link.source, source_id), (link.target, &target_id)] {
        match store.exists(kind, id) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(%link, %source_id, %target_id, outcome = "not_found", missing = %kind, "Association rejected");
                return Err(ReconcileError::NotFound {
                    kind,
                    id: id.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(%link, entity = %kind, %id, error = %e, "Existence check failed, continuing");
            }
        }
    }

    match store.set_link(link, source_id, Some(&target_id)) {
        Ok(true) => {
            tracing::info!(%link, %source_id, %target_id, outcome = "associated", "Association reconciled");
            Ok(AssociationOutcome::Associated { target_id })
        }
        Ok(false) => Err(ReconcileError::NotFound {
            kind: link.source,
            id: source_id.to_string(),
        }),
        Err(source) => {
            tracing::error!(%link, %source_id, %target_id, error = %source, "Association update failed");
            Err(ReconcileError::UpdateFailed { link, source })
        }
    }
}

/// Sets the link column to NULL. Returns false when no source row matched.
pub fn remove_association(store: &dyn Store, link: Link, source_id: &EntityId) -> Result<bool> {
    store.set_link(link, source_id, None)
}

/// Detects an update payload that carries exactly one field and that field
/// names a link of `source`.
#[must_use]
pub fn single_association_field(
    source: EntityKind,
    payload: &Map<String, Value>,
) -> Option<(Link, &Value)> {
    if payload.len() != 1 {
        return None;
    }
    let (key, value) = payload.iter().next()?;
    Link::find(source, key).map(|link| (link, value))
}

/// Replaces the whole completion type set of a template, carrying every other
/// field forward unchanged. `Ok(None)` when the template does not exist.
pub fn replace_template_completion_types(
    store: &dyn Store,
    template_id: DbId,
    completion_type_ids: Vec<DbId>,
) -> Result<Option<TemplateDetail>> {
    let Some(current) = store.get_template(template_id)? else {
        return Ok(None);
    };

    let changes = TemplateChanges {
        title: current.template.title,
        content: current.template.content,
        department_id: current.template.department_id.into(),
        color_id: current.template.color_id.into(),
        completion_type_id: FieldUpdate::Absent,
        completion_type_ids: Some(completion_type_ids),
    };
    store.update_template(template_id, &changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::{CompletionTypeInput, DepartmentInput, NewTemplate};
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn seed(store: &SqliteStore) -> (DbId, DbId) {
        let template = store
            .create_template(&NewTemplate {
                title: "Welcome".to_string(),
                content: "Hi".to_string(),
                ..Default::default()
            })
            .unwrap();
        let department = store
            .create_department(&DepartmentInput {
                name: "Support".to_string(),
                ..Default::default()
            })
            .unwrap();
        (template.template.id, department.id)
    }

    #[test]
    fn test_associate_and_remove() {
        let (_temp, store) = setup();
        let (template_id, department_id) = seed(&store);
        let source = EntityId::Int(department_id);

        let outcome =
            reconcile_association(&store, Link::DEPARTMENT_TEMPLATE, &source, json!(template_id))
                .unwrap();
        assert_eq!(
            outcome,
            AssociationOutcome::Associated {
                target_id: EntityId::Int(template_id)
            }
        );
        assert_eq!(outcome.message(Link::DEPARTMENT_TEMPLATE), "Template associated successfully");
        assert_eq!(
            store.get_department(department_id).unwrap().unwrap().template_id,
            Some(template_id)
        );

        let outcome =
            reconcile_association(&store, Link::DEPARTMENT_TEMPLATE, &source, json!("")).unwrap();
        assert_eq!(outcome, AssociationOutcome::Removed);
        assert_eq!(store.get_department(department_id).unwrap().unwrap().template_id, None);
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let (_temp, store) = setup();
        let (template_id, department_id) = seed(&store);

        let outcome = reconcile_association(
            &store,
            Link::TEMPLATE_DEPARTMENT,
            &EntityId::Int(template_id),
            json!(department_id.to_string()),
        )
        .unwrap();
        assert!(matches!(outcome, AssociationOutcome::Associated { .. }));
        let fetched = store.get_template(template_id).unwrap().unwrap();
        assert_eq!(fetched.department.map(|d| d.name), Some("Support".to_string()));
    }

    #[test]
    fn test_invalid_id_leaves_row_untouched() {
        let (_temp, store) = setup();
        let (_template_id, department_id) = seed(&store);

        let err = reconcile_association(
            &store,
            Link::DEPARTMENT_TEMPLATE,
            &EntityId::Int(department_id),
            json!("abc"),
        )
        .unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidId { .. }));
        assert_eq!(err.to_string(), "Invalid template ID: abc");
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let (_temp, store) = setup();
        let (_template_id, department_id) = seed(&store);

        let err = reconcile_association(
            &store,
            Link::DEPARTMENT_TEMPLATE,
            &EntityId::Int(department_id),
            json!(999),
        )
        .unwrap_err();
        match err {
            ReconcileError::NotFound { kind, id } => {
                assert_eq!(kind, EntityKind::Template);
                assert_eq!(id, "999");
            }
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(store.get_department(department_id).unwrap().unwrap().template_id, None);
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let (_temp, store) = setup();
        let (template_id, _department_id) = seed(&store);

        let err = reconcile_association(
            &store,
            Link::DEPARTMENT_TEMPLATE,
            &EntityId::Int(404),
            json!(template_id),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::NotFound {
                kind: EntityKind::Department,
                ..
            }
        ));

        let err = reconcile_association(&store, Link::DEPARTMENT_TEMPLATE, &EntityId::Int(404), Value::Null)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::NotFound { .. }));
    }

    #[test]
    fn test_single_association_field() {
        let payload = json!({"department_id": 3});
        let (link, value) =
            single_association_field(EntityKind::Template, payload.as_object().unwrap()).unwrap();
        assert_eq!(link, Link::TEMPLATE_DEPARTMENT);
        assert_eq!(value, &json!(3));

        let payload = json!({"department_id": 3, "title": "x"});
        assert!(single_association_field(EntityKind::Template, payload.as_object().unwrap()).is_none());

        let payload = json!({"name": "x"});
        assert!(single_association_field(EntityKind::Department, payload.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_replace_completion_types_keeps_other_fields() {
        let (_temp, store) = setup();
        let (template_id, department_id) = seed(&store);
        store
            .set_link(
                Link::TEMPLATE_DEPARTMENT,
                &EntityId::Int(template_id),
                Some(&EntityId::Int(department_id)),
            )
            .unwrap();
        let chat = store
            .create_completion_type(&CompletionTypeInput {
                name: "Chat".to_string(),
                ..Default::default()
            })
            .unwrap();

        let detail = replace_template_completion_types(&store, template_id, vec![chat.id])
            .unwrap()
            .unwrap();
        assert_eq!(detail.template.title, "Welcome");
        assert_eq!(detail.template.department_id, Some(department_id));
        assert_eq!(detail.completion_types.len(), 1);

        let detail = replace_template_completion_types(&store, template_id, Vec::new())
            .unwrap()
            .unwrap();
        assert!(detail.completion_types.is_empty());

        assert!(replace_template_completion_types(&store, 999, Vec::new()).unwrap().is_none());
    }
}
