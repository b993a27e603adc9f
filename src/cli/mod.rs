mod commands;
mod info;
mod init;
mod serve;

pub use commands::{AdminCommands, ServeArgs};
pub use info::run_info;
pub use init::run_init;
pub use serve::{resolve_config, run_serve};

use std::path::Path;

use crate::config::DB_FILE;
use crate::store::SqliteStore;

/// Opens the store in an existing data directory.
pub fn init_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = data_dir.join(DB_FILE);

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'promptdesk admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
