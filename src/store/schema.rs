pub const SCHEMA: &str = r#"
-- Prompt templates
CREATE TABLE IF NOT EXISTS templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,

    -- Optional single links, cleared when the target goes away
    department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
    color_id INTEGER REFERENCES colors(id) ON DELETE SET NULL,

    -- Legacy single completion type link; deleting a referenced completion
    -- type is refused by the store
    completion_type_id INTEGER REFERENCES completion_types(id),

    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    template_id INTEGER REFERENCES templates(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS colors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    hex_value TEXT NOT NULL,  -- always '#'-prefixed
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- template_id carries the template's completion type set
CREATE TABLE IF NOT EXISTS completion_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    template_id INTEGER REFERENCES templates(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    template_id INTEGER REFERENCES templates(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Children categories are keyed by UUID text
CREATE TABLE IF NOT EXISTS connect_children_categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    completion_type_id INTEGER REFERENCES completion_types(id) ON DELETE SET NULL,
    department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS variables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    namn TEXT NOT NULL,
    beskrivning TEXT,
    variabel_namn TEXT NOT NULL,
    exempel_varde TEXT,
    comments INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS information (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    label TEXT,
    description TEXT,
    template_id INTEGER REFERENCES templates(id),
    comments INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_templates_department ON templates(department_id);
CREATE INDEX IF NOT EXISTS idx_templates_color ON templates(color_id);
CREATE INDEX IF NOT EXISTS idx_templates_completion_type ON templates(completion_type_id);
CREATE INDEX IF NOT EXISTS idx_departments_template ON departments(template_id);
CREATE INDEX IF NOT EXISTS idx_categories_template ON categories(template_id);
CREATE INDEX IF NOT EXISTS idx_information_template ON information(template_id);
CREATE INDEX IF NOT EXISTS idx_children_completion_type ON connect_children_categories(completion_type_id);
CREATE INDEX IF NOT EXISTS idx_children_department ON connect_children_categories(department_id);
"#;

/// Index on `completion_types.template_id`, created only when the column exists.
pub const COMPLETION_TYPE_TEMPLATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_completion_types_template ON completion_types(template_id);";
