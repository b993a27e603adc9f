mod field;
mod ids;
mod link;
mod models;

pub use field::FieldUpdate;
pub use ids::{DbId, EntityId, EntityKind, IdKind};
pub use link::Link;
pub use models::*;
