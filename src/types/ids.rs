use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Integer primary key.
pub type DbId = i64;

/// How an entity's primary key is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Integer,
    Uuid,
}

impl IdKind {
    /// Parses a path segment or string value into an id of this kind.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<EntityId> {
        let raw = raw.trim();
        match self {
            IdKind::Integer => raw.parse::<DbId>().ok().map(EntityId::Int),
            IdKind::Uuid => Uuid::parse_str(raw)
                .ok()
                .map(|id| EntityId::Uuid(id.to_string())),
        }
    }

    /// Coerces a JSON value into an id of this kind. Integer ids accept both
    /// numbers and numeric strings.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<EntityId> {
        match (self, value) {
            (IdKind::Integer, Value::Number(n)) => n.as_i64().map(EntityId::Int),
            (_, Value::String(s)) => self.parse(s),
            _ => None,
        }
    }
}

/// A primary key of any entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(DbId),
    Uuid(String),
}

impl EntityId {
    #[must_use]
    pub fn as_int(&self) -> Option<DbId> {
        match self {
            EntityId::Int(id) => Some(*id),
            EntityId::Uuid(_) => None,
        }
    }
}

impl From<DbId> for EntityId {
    fn from(id: DbId) -> Self {
        EntityId::Int(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{id}"),
            EntityId::Uuid(id) => f.write_str(id),
        }
    }
}

impl ToSql for EntityId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            EntityId::Int(id) => id.to_sql(),
            EntityId::Uuid(id) => id.to_sql(),
        }
    }
}

/// Every table the backend manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Template,
    Department,
    Color,
    CompletionType,
    Category,
    ChildCategory,
    Variable,
    Information,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Template,
        EntityKind::Department,
        EntityKind::Color,
        EntityKind::CompletionType,
        EntityKind::Category,
        EntityKind::ChildCategory,
        EntityKind::Variable,
        EntityKind::Information,
    ];

    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Template => "templates",
            EntityKind::Department => "departments",
            EntityKind::Color => "colors",
            EntityKind::CompletionType => "completion_types",
            EntityKind::Category => "categories",
            EntityKind::ChildCategory => "connect_children_categories",
            EntityKind::Variable => "variables",
            EntityKind::Information => "information",
        }
    }

    #[must_use]
    pub fn id_kind(self) -> IdKind {
        match self {
            EntityKind::ChildCategory => IdKind::Uuid,
            _ => IdKind::Integer,
        }
    }

    /// Human readable name used in messages and log fields.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Template => "template",
            EntityKind::Department => "department",
            EntityKind::Color => "color",
            EntityKind::CompletionType => "completion type",
            EntityKind::Category => "category",
            EntityKind::ChildCategory => "children category",
            EntityKind::Variable => "variable",
            EntityKind::Information => "information item",
        }
    }

    /// The label with its first letter capitalized, for message openings.
    #[must_use]
    pub fn title(self) -> String {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    #[must_use]
    pub fn parse_id(self, raw: &str) -> Option<EntityId> {
        self.id_kind().parse(raw)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
