use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::CompletionTypeLink;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Create the data directory and database schema
    Init {
        /// Data directory for the database
        #[arg(long, env = "PROMPTDESK_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Show row counts and schema capabilities
    Info {
        /// Data directory for the database
        #[arg(long, env = "PROMPTDESK_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Flags for `serve`. Every flag overrides the config file when given.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long, env = "PROMPTDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "PROMPTDESK_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long, short, env = "PROMPTDESK_PORT")]
    pub port: Option<u16>,

    /// Data directory for the database
    #[arg(long, env = "PROMPTDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Environment name reported by /api/status
    #[arg(long = "env", env = "PROMPTDESK_ENV")]
    pub environment: Option<String>,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin", env = "PROMPTDESK_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Use completion_types.template_id: detect it, or force it on or off
    #[arg(long, value_enum, env = "PROMPTDESK_COMPLETION_TYPE_LINK")]
    pub completion_type_link: Option<CompletionTypeLink>,
}
