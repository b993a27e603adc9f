use std::path::Path;

use serde::Serialize;

use crate::config::DB_FILE;
use crate::store::Store;
use crate::types::{SchemaCapabilities, TableCounts};

use super::init_store;

#[derive(Serialize)]
struct ServerInfo {
    database: String,
    counts: TableCounts,
    capabilities: SchemaCapabilities,
}

pub fn run_info(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let store = init_store(data_dir)?;

    let info = ServerInfo {
        database: data_dir.join(DB_FILE).display().to_string(),
        counts: store.table_counts()?,
        capabilities: store.capabilities()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let counts = &info.counts;
    let link = if info.capabilities.completion_type_template_link {
        "completion_types.template_id"
    } else {
        "templates.completion_type_id only"
    };

    println!();
    println!("Promptdesk Database Status");
    println!("{}", "─".repeat(26));
    println!("Database:             {}", info.database);
    println!("Templates:            {}", counts.templates);
    println!("Departments:          {}", counts.departments);
    println!("Colors:               {}", counts.colors);
    println!("Completion types:     {}", counts.completion_types);
    println!("Categories:           {}", counts.categories);
    println!("Children categories:  {}", counts.children_categories);
    println!("Variables:            {}", counts.variables);
    println!("Information items:    {}", counts.information);
    println!("Completion type link: {link}");
    println!();

    Ok(())
}
