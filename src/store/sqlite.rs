use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Params, Row, params, params_from_iter};
use uuid::Uuid;

use super::Store;
use super::schema::{COMPLETION_TYPE_TEMPLATE_INDEX, SCHEMA};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    completion_type_link: Option<bool>,
    capabilities: OnceLock<SchemaCapabilities>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
            completion_type_link: None,
            capabilities: OnceLock::new(),
        })
    }

    /// Forces the completion type link capability instead of detecting it.
    #[must_use]
    pub fn with_completion_type_link(mut self, enabled: Option<bool>) -> Self {
        self.completion_type_link = enabled;
        self
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    fn resolve_capabilities(&self, conn: &Connection) -> Result<SchemaCapabilities> {
        if let Some(caps) = self.capabilities.get() {
            return Ok(*caps);
        }

        let columns = table_columns(conn, "completion_types")?;
        let detected = columns.iter().any(|c| c.name == "template_id");

        let enabled = match self.completion_type_link {
            Some(forced) => {
                if forced && !detected && !columns.is_empty() {
                    tracing::warn!(
                        "completion type link forced on but completion_types.template_id is missing"
                    );
                }
                forced
            }
            // Nothing to detect before the schema exists; try again later.
            None if columns.is_empty() => return Ok(SchemaCapabilities::default()),
            None => detected,
        };

        let caps = *self.capabilities.get_or_init(|| SchemaCapabilities {
            completion_type_template_link: enabled,
        });
        tracing::debug!(
            completion_type_template_link = caps.completion_type_template_link,
            "Resolved schema capabilities"
        );
        Ok(caps)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn now() -> String {
    format_datetime(&Utc::now())
}

fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn query_one<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    conn.query_row(sql, params, map)
        .optional()
        .map_err(Error::from)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    query_all(conn, &format!("PRAGMA table_info({table})"), [], |row| {
        Ok(ColumnInfo {
            name: row.get(1)?,
            data_type: row.get(2)?,
        })
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?)
}

fn row_exists(conn: &Connection, kind: EntityKind, id: &EntityId) -> Result<bool> {
    Ok(conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", kind.table()),
        params![id],
        |row| row.get(0),
    )?)
}

/// Rejects a write whose foreign key names a row that does not exist.
fn ensure_target(conn: &Connection, kind: EntityKind, update: &FieldUpdate<DbId>) -> Result<()> {
    match update {
        FieldUpdate::Set(id) if !row_exists(conn, kind, &EntityId::Int(*id))? => {
            Err(Error::Validation(format!("{kind} {id} does not exist")))
        }
        _ => Ok(()),
    }
}

/// A dynamically shaped `UPDATE ... SET` statement. Link columns only join
/// the statement when the change clears or sets them.
#[derive(Default)]
struct SetClause {
    assignments: Vec<(&'static str, SqlValue)>,
}

impl SetClause {
    fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    fn link(mut self, column: &'static str, update: &FieldUpdate<DbId>) -> Self {
        match update {
            FieldUpdate::Absent => {}
            FieldUpdate::Clear => self.assignments.push((column, SqlValue::Null)),
            FieldUpdate::Set(id) => self.assignments.push((column, SqlValue::Integer(*id))),
        }
        self
    }

    fn execute(self, conn: &Connection, table: &str, id: SqlValue) -> Result<usize> {
        let columns = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {columns} WHERE id = ?{}",
            self.assignments.len() + 1
        );
        let values = self
            .assignments
            .into_iter()
            .map(|(_, value)| value)
            .chain(std::iter::once(id));
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }
}

// Row mappers. Column order follows the matching *_SELECT constant.

const TEMPLATE_SELECT: &str = "SELECT t.id, t.title, t.content, t.department_id, t.color_id,
        t.completion_type_id, t.created_at, t.updated_at,
        d.id, d.name, c.id, c.name, c.hex_value, c.description
     FROM templates t
     LEFT JOIN departments d ON d.id = t.department_id
     LEFT JOIN colors c ON c.id = t.color_id";

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<TemplateDetail> {
    let department = match row.get::<_, Option<DbId>>(8)? {
        Some(id) => Some(DepartmentSummary {
            id,
            name: row.get(9)?,
        }),
        None => None,
    };
    let color = match row.get::<_, Option<DbId>>(10)? {
        Some(id) => Some(ColorSummary {
            id,
            name: row.get(11)?,
            hex_value: row.get(12)?,
            description: row.get(13)?,
        }),
        None => None,
    };

    Ok(TemplateDetail {
        template: Template {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            department_id: row.get(3)?,
            color_id: row.get(4)?,
            completion_type_id: row.get(5)?,
            created_at: parse_datetime(&row.get::<_, String>(6)?),
            updated_at: parse_datetime(&row.get::<_, String>(7)?),
        },
        department,
        color,
        completion_types: Vec::new(),
    })
}

fn completion_type_summary_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionTypeSummary> {
    Ok(CompletionTypeSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

const DEPARTMENT_SELECT: &str =
    "SELECT d.id, d.name, d.description, d.template_id, d.created_at, t.title
     FROM departments d
     LEFT JOIN templates t ON t.id = d.template_id";

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        template_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        template_title: row.get(5)?,
    })
}

const COLOR_SELECT: &str = "SELECT id, name, hex_value, description, created_at FROM colors";

fn color_from_row(row: &Row<'_>) -> rusqlite::Result<Color> {
    Ok(Color {
        id: row.get(0)?,
        name: row.get(1)?,
        hex_value: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn completion_type_select(caps: SchemaCapabilities) -> &'static str {
    if caps.completion_type_template_link {
        "SELECT ct.id, ct.name, ct.description, ct.template_id, ct.created_at, t.title
         FROM completion_types ct
         LEFT JOIN templates t ON t.id = ct.template_id"
    } else {
        "SELECT ct.id, ct.name, ct.description, NULL, ct.created_at, NULL
         FROM completion_types ct"
    }
}

fn completion_type_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionType> {
    Ok(CompletionType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        template_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        template_title: row.get(5)?,
    })
}

const CATEGORY_SELECT: &str =
    "SELECT c.id, c.name, c.description, c.template_id, c.created_at, t.title
     FROM categories c
     LEFT JOIN templates t ON t.id = c.template_id";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        template_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        template_title: row.get(5)?,
    })
}

const CHILD_CATEGORY_SELECT: &str = "SELECT cc.id, cc.name, cc.description, cc.completion_type_id,
        cc.department_id, cc.created_at, ct.name, d.name
     FROM connect_children_categories cc
     LEFT JOIN completion_types ct ON ct.id = cc.completion_type_id
     LEFT JOIN departments d ON d.id = cc.department_id";

fn child_category_from_row(row: &Row<'_>) -> rusqlite::Result<ChildCategory> {
    Ok(ChildCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        completion_type_id: row.get(3)?,
        department_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        completion_type_name: row.get(6)?,
        department_name: row.get(7)?,
    })
}

const VARIABLE_SELECT: &str = "SELECT id, namn, beskrivning, variabel_namn, exempel_varde, comments, created_at
     FROM variables";

fn variable_from_row(row: &Row<'_>) -> rusqlite::Result<Variable> {
    Ok(Variable {
        id: row.get(0)?,
        namn: row.get(1)?,
        beskrivning: row.get(2)?,
        variabel_namn: row.get(3)?,
        exempel_varde: row.get(4)?,
        comments: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

const INFORMATION_SELECT: &str =
    "SELECT i.id, i.name, i.label, i.description, i.template_id, i.comments, i.created_at, t.title
     FROM information i
     LEFT JOIN templates t ON t.id = i.template_id";

fn information_from_row(row: &Row<'_>) -> rusqlite::Result<Information> {
    Ok(Information {
        id: row.get(0)?,
        name: row.get(1)?,
        label: row.get(2)?,
        description: row.get(3)?,
        template_id: row.get(4)?,
        comments: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        template_title: row.get(7)?,
    })
}

// Shared queries that run on either a plain connection or a transaction.

fn load_template(
    conn: &Connection,
    caps: SchemaCapabilities,
    id: DbId,
) -> Result<Option<TemplateDetail>> {
    let Some(mut detail) = query_one(
        conn,
        &format!("{TEMPLATE_SELECT} WHERE t.id = ?1"),
        params![id],
        template_from_row,
    )?
    else {
        return Ok(None);
    };

    if caps.completion_type_template_link {
        detail.completion_types = query_all(
            conn,
            "SELECT id, name, description FROM completion_types WHERE template_id = ?1 ORDER BY id",
            params![id],
            completion_type_summary_from_row,
        )?;
    }
    Ok(Some(detail))
}

/// Points each listed completion type at the template. Unknown ids are skipped.
fn assign_completion_types(conn: &Connection, template_id: DbId, ids: &[DbId]) -> Result<usize> {
    let mut assigned = 0;
    for completion_type_id in ids {
        let rows = conn.execute(
            "UPDATE completion_types SET template_id = ?1 WHERE id = ?2",
            params![template_id, completion_type_id],
        )?;
        if rows == 0 {
            tracing::warn!(
                template_id,
                completion_type_id,
                "Completion type not found, skipping association"
            );
        }
        assigned += rows;
    }
    Ok(assigned)
}

fn load_department(conn: &Connection, id: DbId) -> Result<Option<Department>> {
    query_one(
        conn,
        &format!("{DEPARTMENT_SELECT} WHERE d.id = ?1"),
        params![id],
        department_from_row,
    )
}

fn load_color(conn: &Connection, id: DbId) -> Result<Option<Color>> {
    query_one(
        conn,
        &format!("{COLOR_SELECT} WHERE id = ?1"),
        params![id],
        color_from_row,
    )
}

fn load_completion_type(
    conn: &Connection,
    caps: SchemaCapabilities,
    id: DbId,
) -> Result<Option<CompletionType>> {
    query_one(
        conn,
        &format!("{} WHERE ct.id = ?1", completion_type_select(caps)),
        params![id],
        completion_type_from_row,
    )
}

fn load_category(conn: &Connection, id: DbId) -> Result<Option<Category>> {
    query_one(
        conn,
        &format!("{CATEGORY_SELECT} WHERE c.id = ?1"),
        params![id],
        category_from_row,
    )
}

fn load_child_category(conn: &Connection, id: &str) -> Result<Option<ChildCategory>> {
    query_one(
        conn,
        &format!("{CHILD_CATEGORY_SELECT} WHERE cc.id = ?1"),
        params![id],
        child_category_from_row,
    )
}

fn load_variable(conn: &Connection, id: DbId) -> Result<Option<Variable>> {
    query_one(
        conn,
        &format!("{VARIABLE_SELECT} WHERE id = ?1"),
        params![id],
        variable_from_row,
    )
}

fn load_information(conn: &Connection, id: DbId) -> Result<Option<Information>> {
    query_one(
        conn,
        &format!("{INFORMATION_SELECT} WHERE i.id = ?1"),
        params![id],
        information_from_row,
    )
}

/// The completion type link column is only written when the schema has it.
fn completion_type_template_update(
    caps: SchemaCapabilities,
    update: &FieldUpdate<DbId>,
) -> Result<FieldUpdate<DbId>> {
    match update {
        _ if caps.completion_type_template_link => Ok(update.clone()),
        FieldUpdate::Set(_) => Err(Error::Unsupported(
            "completion_types.template_id".to_string(),
        )),
        _ => Ok(FieldUpdate::Absent),
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;

        // Databases created before the completion type link keep their layout.
        let has_link = table_columns(&conn, "completion_types")?
            .iter()
            .any(|c| c.name == "template_id");
        if has_link {
            conn.execute_batch(COMPLETION_TYPE_TEMPLATE_INDEX)?;
        }

        let caps = self.resolve_capabilities(&conn)?;
        tracing::debug!(
            completion_type_template_link = caps.completion_type_template_link,
            "Schema initialized"
        );
        Ok(())
    }

    fn capabilities(&self) -> Result<SchemaCapabilities> {
        let conn = self.conn();
        self.resolve_capabilities(&conn)
    }

    fn ping(&self) -> Result<()> {
        self.conn()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn schema_report(&self) -> Result<SchemaReport> {
        let conn = self.conn();
        Ok(SchemaReport {
            tables: query_all(
                &conn,
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                [],
                |row| row.get(0),
            )?,
            template_columns: table_columns(&conn, "templates")?,
            color_columns: table_columns(&conn, "colors")?,
            completion_type_columns: table_columns(&conn, "completion_types")?,
        })
    }

    fn table_counts(&self) -> Result<TableCounts> {
        let conn = self.conn();
        Ok(TableCounts {
            templates: count_rows(&conn, EntityKind::Template.table())?,
            departments: count_rows(&conn, EntityKind::Department.table())?,
            colors: count_rows(&conn, EntityKind::Color.table())?,
            completion_types: count_rows(&conn, EntityKind::CompletionType.table())?,
            categories: count_rows(&conn, EntityKind::Category.table())?,
            children_categories: count_rows(&conn, EntityKind::ChildCategory.table())?,
            variables: count_rows(&conn, EntityKind::Variable.table())?,
            information: count_rows(&conn, EntityKind::Information.table())?,
        })
    }

    // Generic association primitives

    fn exists(&self, kind: EntityKind, id: &EntityId) -> Result<bool> {
        row_exists(&self.conn(), kind, id)
    }

    fn set_link(
        &self,
        link: Link,
        source_id: &EntityId,
        target: Option<&EntityId>,
    ) -> Result<bool> {
        let conn = self.conn();
        if link == Link::COMPLETION_TYPE_TEMPLATE
            && !self
                .resolve_capabilities(&conn)?
                .completion_type_template_link
        {
            return Err(Error::Unsupported(link.to_string()));
        }

        let rows = if link.source == EntityKind::Template {
            conn.execute(
                &format!(
                    "UPDATE templates SET {} = ?1, updated_at = ?3 WHERE id = ?2",
                    link.column
                ),
                params![target, source_id, now()],
            )?
        } else {
            conn.execute(
                &format!(
                    "UPDATE {} SET {} = ?1 WHERE id = ?2",
                    link.source.table(),
                    link.column
                ),
                params![target, source_id],
            )?
        };
        Ok(rows > 0)
    }

    // Template operations

    fn list_templates(&self) -> Result<Vec<TemplateDetail>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;

        let mut templates = query_all(
            &conn,
            &format!("{TEMPLATE_SELECT} ORDER BY t.id"),
            [],
            template_from_row,
        )?;

        if caps.completion_type_template_link {
            let linked = query_all(
                &conn,
                "SELECT id, name, description, template_id FROM completion_types
                 WHERE template_id IS NOT NULL ORDER BY id",
                [],
                |row| Ok((row.get::<_, DbId>(3)?, completion_type_summary_from_row(row)?)),
            )?;

            let mut by_template: HashMap<DbId, Vec<CompletionTypeSummary>> = HashMap::new();
            for (template_id, summary) in linked {
                by_template.entry(template_id).or_default().push(summary);
            }
            for detail in &mut templates {
                if let Some(summaries) = by_template.remove(&detail.template.id) {
                    detail.completion_types = summaries;
                }
            }
        }

        Ok(templates)
    }

    fn get_template(&self, id: DbId) -> Result<Option<TemplateDetail>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        load_template(&conn, caps, id)
    }

    fn create_template(&self, input: &NewTemplate) -> Result<TemplateDetail> {
        let mut conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        let tx = conn.transaction()?;

        ensure_target(&tx, EntityKind::Department, &input.department_id.into())?;
        ensure_target(&tx, EntityKind::Color, &input.color_id.into())?;
        ensure_target(
            &tx,
            EntityKind::CompletionType,
            &input.completion_type_id.into(),
        )?;

        let created = now();
        tx.execute(
            "INSERT INTO templates (title, content, department_id, color_id, completion_type_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                input.title,
                input.content,
                input.department_id,
                input.color_id,
                input.completion_type_id,
                created,
            ],
        )?;
        let id = tx.last_insert_rowid();

        if !input.completion_type_ids.is_empty() {
            if caps.completion_type_template_link {
                assign_completion_types(&tx, id, &input.completion_type_ids)?;
            } else {
                tracing::warn!(
                    template_id = id,
                    "Schema has no completion type link, ignoring completion_type_ids"
                );
            }
        }

        let detail = load_template(&tx, caps, id)?.ok_or(Error::NotFound)?;
        tx.commit()?;
        Ok(detail)
    }

    fn update_template(
        &self,
        id: DbId,
        changes: &TemplateChanges,
    ) -> Result<Option<TemplateDetail>> {
        let mut conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        let tx = conn.transaction()?;

        ensure_target(&tx, EntityKind::Department, &changes.department_id)?;
        ensure_target(&tx, EntityKind::Color, &changes.color_id)?;
        ensure_target(&tx, EntityKind::CompletionType, &changes.completion_type_id)?;

        let rows = SetClause::default()
            .set("title", changes.title.clone())
            .set("content", changes.content.clone())
            .set("updated_at", now())
            .link("department_id", &changes.department_id)
            .link("color_id", &changes.color_id)
            .link("completion_type_id", &changes.completion_type_id)
            .execute(&tx, "templates", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }

        if let Some(ids) = &changes.completion_type_ids {
            if caps.completion_type_template_link {
                let cleared = tx.execute(
                    "UPDATE completion_types SET template_id = NULL WHERE template_id = ?1",
                    params![id],
                )?;
                let assigned = assign_completion_types(&tx, id, ids)?;
                tracing::debug!(template_id = id, cleared, assigned, "Replaced completion types");
            } else {
                tracing::warn!(
                    template_id = id,
                    "Schema has no completion type link, ignoring completion_type_ids"
                );
            }
        }

        let detail = load_template(&tx, caps, id)?;
        tx.commit()?;
        Ok(detail)
    }

    fn delete_template(&self, id: DbId) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Follow the physical column, not the capability: a forced-off link
        // still leaves rows that would block the delete.
        let has_completion_type_link = table_columns(&tx, "completion_types")?
            .iter()
            .any(|c| c.name == "template_id");

        for link in Link::referencing(EntityKind::Template) {
            if link == Link::COMPLETION_TYPE_TEMPLATE && !has_completion_type_link {
                continue;
            }
            let cleared = tx.execute(
                &format!(
                    "UPDATE {} SET {} = NULL WHERE {} = ?1",
                    link.source.table(),
                    link.column,
                    link.column
                ),
                params![id],
            )?;
            if cleared > 0 {
                tracing::debug!(template_id = id, link = %link, cleared, "Cleared template references");
            }
        }

        let rows = tx.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    fn list_template_completion_types(&self, template_id: DbId) -> Result<Vec<CompletionType>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        if !caps.completion_type_template_link {
            return Ok(Vec::new());
        }
        query_all(
            &conn,
            &format!(
                "{} WHERE ct.template_id = ?1 ORDER BY ct.id",
                completion_type_select(caps)
            ),
            params![template_id],
            completion_type_from_row,
        )
    }

    fn associate_completion_type(
        &self,
        template_id: DbId,
        completion_type_id: DbId,
    ) -> Result<bool> {
        let conn = self.conn();
        if !self
            .resolve_capabilities(&conn)?
            .completion_type_template_link
        {
            return Err(Error::Unsupported(
                Link::COMPLETION_TYPE_TEMPLATE.to_string(),
            ));
        }
        let rows = conn.execute(
            "UPDATE completion_types SET template_id = ?1 WHERE id = ?2",
            params![template_id, completion_type_id],
        )?;
        Ok(rows > 0)
    }

    fn remove_completion_type_association(
        &self,
        template_id: DbId,
        completion_type_id: DbId,
    ) -> Result<bool> {
        let conn = self.conn();
        if !self
            .resolve_capabilities(&conn)?
            .completion_type_template_link
        {
            return Err(Error::Unsupported(
                Link::COMPLETION_TYPE_TEMPLATE.to_string(),
            ));
        }
        let rows = conn.execute(
            "UPDATE completion_types SET template_id = NULL WHERE id = ?1 AND template_id = ?2",
            params![completion_type_id, template_id],
        )?;
        Ok(rows > 0)
    }

    // Department operations

    fn list_departments(&self) -> Result<Vec<Department>> {
        query_all(
            &self.conn(),
            &format!("{DEPARTMENT_SELECT} ORDER BY d.id"),
            [],
            department_from_row,
        )
    }

    fn list_template_departments(&self, template_id: DbId) -> Result<Vec<Department>> {
        query_all(
            &self.conn(),
            &format!("{DEPARTMENT_SELECT} WHERE d.template_id = ?1 ORDER BY d.id"),
            params![template_id],
            department_from_row,
        )
    }

    fn get_department(&self, id: DbId) -> Result<Option<Department>> {
        load_department(&self.conn(), id)
    }

    fn create_department(&self, input: &DepartmentInput) -> Result<Department> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        conn.execute(
            "INSERT INTO departments (name, description, template_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.name,
                input.description,
                input.template_id.clone().into_option(),
                now(),
            ],
        )?;
        load_department(&conn, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_department(&self, id: DbId, input: &DepartmentInput) -> Result<Option<Department>> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("description", input.description.clone())
            .link("template_id", &input.template_id)
            .execute(&conn, "departments", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_department(&conn, id)
    }

    fn delete_department(&self, id: DbId) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM departments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Color operations

    fn list_colors(&self) -> Result<Vec<Color>> {
        query_all(
            &self.conn(),
            &format!("{COLOR_SELECT} ORDER BY id"),
            [],
            color_from_row,
        )
    }

    fn get_color(&self, id: DbId) -> Result<Option<Color>> {
        load_color(&self.conn(), id)
    }

    fn create_color(&self, input: &ColorInput) -> Result<Color> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO colors (name, hex_value, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![input.name, input.hex_value, input.description, now()],
        )?;
        load_color(&conn, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_color(&self, id: DbId, input: &ColorInput) -> Result<Option<Color>> {
        let conn = self.conn();
        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("hex_value", input.hex_value.clone())
            .set("description", input.description.clone())
            .execute(&conn, "colors", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_color(&conn, id)
    }

    fn delete_color(&self, id: DbId) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM colors WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Completion type operations

    fn list_completion_types(&self) -> Result<Vec<CompletionType>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        query_all(
            &conn,
            &format!("{} ORDER BY ct.id", completion_type_select(caps)),
            [],
            completion_type_from_row,
        )
    }

    fn get_completion_type(&self, id: DbId) -> Result<Option<CompletionType>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        load_completion_type(&conn, caps, id)
    }

    fn create_completion_type(&self, input: &CompletionTypeInput) -> Result<CompletionType> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        let template_id = completion_type_template_update(caps, &input.template_id)?;
        ensure_target(&conn, EntityKind::Template, &template_id)?;

        if caps.completion_type_template_link {
            conn.execute(
                "INSERT INTO completion_types (name, description, template_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    input.name,
                    input.description,
                    template_id.into_option(),
                    now()
                ],
            )?;
        } else {
            conn.execute(
                "INSERT INTO completion_types (name, description, created_at) VALUES (?1, ?2, ?3)",
                params![input.name, input.description, now()],
            )?;
        }
        load_completion_type(&conn, caps, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_completion_type(
        &self,
        id: DbId,
        input: &CompletionTypeInput,
    ) -> Result<Option<CompletionType>> {
        let conn = self.conn();
        let caps = self.resolve_capabilities(&conn)?;
        let template_id = completion_type_template_update(caps, &input.template_id)?;
        ensure_target(&conn, EntityKind::Template, &template_id)?;

        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("description", input.description.clone())
            .link("template_id", &template_id)
            .execute(&conn, "completion_types", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_completion_type(&conn, caps, id)
    }

    fn delete_completion_type(&self, id: DbId) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let templates = query_all(
            &tx,
            "SELECT id, title FROM templates WHERE completion_type_id = ?1 ORDER BY id",
            params![id],
            |row| {
                Ok(TemplateRef {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            },
        )?;
        if !templates.is_empty() {
            return Err(Error::AssociationConflict { id, templates });
        }

        let rows = tx.execute("DELETE FROM completion_types WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    // Category operations

    fn list_categories(&self) -> Result<Vec<Category>> {
        query_all(
            &self.conn(),
            &format!("{CATEGORY_SELECT} ORDER BY c.id"),
            [],
            category_from_row,
        )
    }

    fn list_template_categories(&self, template_id: DbId) -> Result<Vec<Category>> {
        query_all(
            &self.conn(),
            &format!("{CATEGORY_SELECT} WHERE c.template_id = ?1 ORDER BY c.id"),
            params![template_id],
            category_from_row,
        )
    }

    fn get_category(&self, id: DbId) -> Result<Option<Category>> {
        load_category(&self.conn(), id)
    }

    fn create_category(&self, input: &CategoryInput) -> Result<Category> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        conn.execute(
            "INSERT INTO categories (name, description, template_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.name,
                input.description,
                input.template_id.clone().into_option(),
                now(),
            ],
        )?;
        load_category(&conn, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_category(&self, id: DbId, input: &CategoryInput) -> Result<Option<Category>> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("description", input.description.clone())
            .link("template_id", &input.template_id)
            .execute(&conn, "categories", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_category(&conn, id)
    }

    fn delete_category(&self, id: DbId) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Children category operations

    fn list_children_categories(&self) -> Result<Vec<ChildCategory>> {
        query_all(
            &self.conn(),
            &format!("{CHILD_CATEGORY_SELECT} ORDER BY cc.name"),
            [],
            child_category_from_row,
        )
    }

    fn list_children_by_completion_type(
        &self,
        completion_type_id: DbId,
    ) -> Result<Vec<ChildCategory>> {
        query_all(
            &self.conn(),
            &format!("{CHILD_CATEGORY_SELECT} WHERE cc.completion_type_id = ?1 ORDER BY cc.name"),
            params![completion_type_id],
            child_category_from_row,
        )
    }

    fn list_children_by_department(&self, department_id: DbId) -> Result<Vec<ChildCategory>> {
        query_all(
            &self.conn(),
            &format!("{CHILD_CATEGORY_SELECT} WHERE cc.department_id = ?1 ORDER BY cc.name"),
            params![department_id],
            child_category_from_row,
        )
    }

    fn get_child_category(&self, id: &str) -> Result<Option<ChildCategory>> {
        load_child_category(&self.conn(), id)
    }

    fn create_child_category(&self, input: &ChildCategoryInput) -> Result<ChildCategory> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::CompletionType, &input.completion_type_id)?;
        ensure_target(&conn, EntityKind::Department, &input.department_id)?;

        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO connect_children_categories
                 (id, name, description, completion_type_id, department_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                input.name,
                input.description,
                input.completion_type_id.clone().into_option(),
                input.department_id.clone().into_option(),
                now(),
            ],
        )?;
        load_child_category(&conn, &id)?.ok_or(Error::NotFound)
    }

    fn update_child_category(
        &self,
        id: &str,
        input: &ChildCategoryInput,
    ) -> Result<Option<ChildCategory>> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::CompletionType, &input.completion_type_id)?;
        ensure_target(&conn, EntityKind::Department, &input.department_id)?;

        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("description", input.description.clone())
            .link("completion_type_id", &input.completion_type_id)
            .link("department_id", &input.department_id)
            .execute(
                &conn,
                "connect_children_categories",
                SqlValue::Text(id.to_string()),
            )?;
        if rows == 0 {
            return Ok(None);
        }
        load_child_category(&conn, id)
    }

    fn delete_child_category(&self, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM connect_children_categories WHERE id = ?1",
            params![id],
        )?;
        Ok(rows > 0)
    }

    // Variable operations

    fn list_variables(&self) -> Result<Vec<Variable>> {
        query_all(
            &self.conn(),
            &format!("{VARIABLE_SELECT} ORDER BY id"),
            [],
            variable_from_row,
        )
    }

    fn get_variable(&self, id: DbId) -> Result<Option<Variable>> {
        load_variable(&self.conn(), id)
    }

    fn create_variable(&self, input: &VariableInput) -> Result<Variable> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO variables (namn, beskrivning, variabel_namn, exempel_varde, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.namn,
                input.beskrivning,
                input.variabel_namn,
                input.exempel_varde,
                input.comments,
                now(),
            ],
        )?;
        load_variable(&conn, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_variable(&self, id: DbId, input: &VariableInput) -> Result<Option<Variable>> {
        let conn = self.conn();
        let rows = SetClause::default()
            .set("namn", input.namn.clone())
            .set("beskrivning", input.beskrivning.clone())
            .set("variabel_namn", input.variabel_namn.clone())
            .set("exempel_varde", input.exempel_varde.clone())
            .set("comments", input.comments)
            .execute(&conn, "variables", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_variable(&conn, id)
    }

    fn delete_variable(&self, id: DbId) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM variables WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn set_variable_comments(&self, id: DbId, comments: bool) -> Result<Option<Variable>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE variables SET comments = ?1 WHERE id = ?2",
            params![comments, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        load_variable(&conn, id)
    }

    // Information operations

    fn list_information(&self) -> Result<Vec<Information>> {
        query_all(
            &self.conn(),
            &format!("{INFORMATION_SELECT} ORDER BY i.id"),
            [],
            information_from_row,
        )
    }

    fn list_template_information(&self, template_id: DbId) -> Result<Vec<Information>> {
        query_all(
            &self.conn(),
            &format!("{INFORMATION_SELECT} WHERE i.template_id = ?1 ORDER BY i.id"),
            params![template_id],
            information_from_row,
        )
    }

    fn get_information(&self, id: DbId) -> Result<Option<Information>> {
        load_information(&self.conn(), id)
    }

    fn create_information(&self, input: &InformationInput) -> Result<Information> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        conn.execute(
            "INSERT INTO information (name, label, description, template_id, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.name,
                input.label,
                input.description,
                input.template_id.clone().into_option(),
                input.comments,
                now(),
            ],
        )?;
        load_information(&conn, conn.last_insert_rowid())?.ok_or(Error::NotFound)
    }

    fn update_information(
        &self,
        id: DbId,
        input: &InformationInput,
    ) -> Result<Option<Information>> {
        let conn = self.conn();
        ensure_target(&conn, EntityKind::Template, &input.template_id)?;
        let rows = SetClause::default()
            .set("name", input.name.clone())
            .set("label", input.label.clone())
            .set("description", input.description.clone())
            .link("template_id", &input.template_id)
            .set("comments", input.comments)
            .execute(&conn, "information", SqlValue::Integer(id))?;
        if rows == 0 {
            return Ok(None);
        }
        load_information(&conn, id)
    }

    fn delete_information(&self, id: DbId) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM information WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn set_information_comments(&self, id: DbId, comments: bool) -> Result<Option<Information>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE information SET comments = ?1 WHERE id = ?2",
            params![comments, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        load_information(&conn, id)
    }
}
