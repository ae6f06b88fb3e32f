//! Binary entry point: resolve configuration, start file logging, open the
//! SQLite store and hand the loaded library to the TUI.
use anyhow::Context;
use library_tracker::{init_logging, run_app, App, AppConfig, Library, SqliteStorage};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = init_logging(&config)?;
    info!(database = %config.database_path.display(), "starting library tracker");

    let storage = SqliteStorage::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let library = Library::load(storage)?;

    let mut app = App::new(library);
    let result = run_app(&mut app);
    info!("library tracker exited");
    result
}
