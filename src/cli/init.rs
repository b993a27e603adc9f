use std::fs;
use std::path::Path;

use crate::store::{SqliteStore, Store};

use crate::config::DB_FILE;

/// Creates the data directory and the schema. Running it again on an
/// existing database only adds missing tables and indexes.
pub fn run_init(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DB_FILE);
    let existed = db_path.exists();

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let capabilities = store.capabilities()?;
    tracing::debug!(
        completion_type_link = capabilities.completion_type_template_link,
        "Resolved schema capabilities"
    );

    if existed {
        println!("Database already initialized at {}", db_path.display());
    } else {
        println!("Initialized database at {}", db_path.display());
    }

    Ok(())
}
