use thiserror::Error;

use crate::types::{DbId, TemplateRef};

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("completion type {id} is still used by {} template(s)", .templates.len())]
    AssociationConflict { id: DbId, templates: Vec<TemplateRef> },

    #[error("unsupported by the current schema: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
