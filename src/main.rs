//! macrotrack
//!
//! An MCP server for food logging and nutrition goals.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use macrotrack::config::{self, DEFAULT_LOG_DIRECTIVE};
use macrotrack::db::{self, Database};
use macrotrack::diet::DietModelRegistry;
use macrotrack::mcp::MacrotrackService;
use macrotrack::build_info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = config::database_path();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok::<_, db::DbError>(())
    })?;

    let registry = DietModelRegistry::with_builtin_models();
    tracing::info!(models = ?registry.names(), "diet models registered");

    let service = MacrotrackService::new(db_path, database, registry);

    // Create stdio transport
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
