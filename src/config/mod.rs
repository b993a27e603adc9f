mod server;

pub use server::{CompletionTypeLink, DB_FILE, ServerConfig};
