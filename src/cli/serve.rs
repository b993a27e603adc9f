use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::{AppState, create_router};
use crate::store::SqliteStore;

use super::ServeArgs;

/// Merges defaults, the optional TOML file and the command line, in that
/// order of precedence.
pub fn resolve_config(args: ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(environment) = args.environment {
        config.environment = environment;
    }
    if !args.cors_origins.is_empty() {
        config.cors_origins = args.cors_origins;
    }
    if let Some(link) = args.completion_type_link {
        config.completion_type_link = link;
    }

    Ok(config)
}

pub async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!(
            "Server not initialized. Run 'promptdesk admin init --data-dir {}' first.",
            config.data_dir.display()
        );
    }

    let store = SqliteStore::new(&db_path)?
        .with_completion_type_link(config.completion_type_link.forced());

    let addr = config.socket_addr()?;
    info!(
        environment = %config.environment,
        database = %db_path.display(),
        "Starting server on {}",
        addr
    );

    let state = Arc::new(AppState::new(Arc::new(store), config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletionTypeLink;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = resolve_config(ServeArgs::default()).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port = 6000\nenvironment = \"staging\"\ncompletion_type_link = \"off\""
        )
        .unwrap();

        let args = ServeArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(7000),
            data_dir: Some(PathBuf::from("/tmp/pd")),
            ..ServeArgs::default()
        };
        let config = resolve_config(args).unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.environment, "staging");
        assert_eq!(config.completion_type_link, CompletionTypeLink::Off);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/pd/promptdesk.db"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = ServeArgs {
            config: Some(PathBuf::from("/nonexistent/promptdesk.toml")),
            ..ServeArgs::default()
        };
        assert!(resolve_config(args).is_err());
    }
}
