mod cache;
mod db;
mod mcp;
mod models;
mod settings;
mod state;
mod store;
mod tui;
mod views;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::LocalCache;
use crate::db::Database;
use crate::settings::Settings;
use crate::state::{AppState, DataSource};
use crate::store::{RemoteStore, Store};

const DEFAULT_LOG_FILTER: &str = "grasos=info";
const LOG_FILE: &str = "grasos.log";

#[derive(Parser)]
#[command(name = "grasos", about = "Family projects and shopping lists", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the terminal UI (default)
    Tui,
    /// Start the MCP server on stdio
    Serve,
    /// Print the home overview
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show, select or clear the current user
    User {
        /// Name to select
        name: Option<String>,
        /// Forget the selected user
        #[arg(long, conflicts_with = "name")]
        clear: bool,
        /// Also save the name as the default in .grasos/setting.json
        #[arg(long, requires = "name")]
        remember: bool,
    },
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// stdout carries protocol data and command output, so logs go to stderr.
fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The terminal UI owns the screen; logs go to a file next to the database.
fn init_file_logging(db_path: &Path) -> Result<()> {
    let dir = db_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(log_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// A store that cannot be opened or migrated leaves the state running from
/// the cache mirror.
fn open_state(
    db_path: &Path,
    cache_dir: PathBuf,
    default_user: Option<&str>,
) -> AppState<Store<Database>> {
    let store = Store::connect(|| {
        let db = Database::open(db_path)?;
        db.migrate()?;
        Ok(db)
    });
    let cache = LocalCache::new(cache_dir);
    info!(
        db = %db_path.display(),
        cache = %cache.dir().display(),
        online = store.is_ready(),
        "opening data"
    );

    let mut state = AppState::new(store, cache);
    state.load();

    if state.current_user().is_none()
        && let Some(name) = default_user
        && let Err(e) = state.select_user(name)
    {
        warn!("ignoring configured user: {e:#}");
    }
    state
}

fn print_status<S: RemoteStore>(state: &AppState<S>, json: bool) -> Result<()> {
    let summary = views::overview(
        state.current_user(),
        state.projects(),
        state.shopping_lists(),
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if state.source() == DataSource::Cache {
        println!("(store unreachable, showing cached data)");
    }
    println!(
        "User: {}",
        summary.user.as_deref().unwrap_or("no user selected")
    );
    println!("Projects: {}", summary.project_count);
    for p in &summary.recent_projects {
        println!(
            "  {:>3}%  {}  ({}/{})",
            p.progress, p.title, p.done, p.total
        );
    }
    println!("Shopping lists: {}", summary.shopping_list_count);
    for l in &summary.shopping_lists {
        println!("  {}  ({} of {} left)", l.name, l.remaining, l.total);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();
    let db_path = settings.db_path()?;
    let command = cli.command.unwrap_or(Commands::Tui);

    match command {
        Commands::Tui => init_file_logging(&db_path)?,
        _ => init_stderr_logging(),
    }

    let mut state = open_state(&db_path, settings.cache_dir()?, settings.user.as_deref());

    match command {
        Commands::Tui => tui::run(state)?,
        Commands::Serve => mcp::McpServer::new(state).run().await?,
        Commands::Status { json } => print_status(&state, json)?,
        Commands::User {
            name,
            clear,
            remember,
        } => {
            if clear {
                state.clear_user()?;
                println!("User cleared");
            } else if let Some(name) = name {
                let user = state.select_user(&name)?;
                println!("Selected {}", user.name);
                if remember {
                    let cwd = std::env::current_dir()?;
                    let updated = Settings {
                        user: Some(user.name.clone()),
                        ..settings
                    };
                    updated
                        .save_to(&cwd)
                        .context("failed to write settings file")?;
                    println!("Saved to {}", Settings::path_in(&cwd).display());
                }
            } else {
                match state.current_user() {
                    Some(user) => println!("{}", user.name),
                    None => println!(
                        "No user selected. Choose one of: {}",
                        models::FAMILY_MEMBERS.join(", ")
                    ),
                }
            }
        }
    }

    Ok(())
}
