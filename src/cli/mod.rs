use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::editor::EditorContext;
use crate::note::{SystemCalendar, UuidGenerator};
use crate::storage::{self, MemoryStore, NoteStore};

pub mod commands;

use self::commands::{DeleteArgs, EditArgs, ListArgs, NewArgs, ShowArgs};

#[derive(Parser, Debug)]
#[command(
    name = "colornotes",
    version,
    about = "Color-tagged notes you can edit in place"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over COLORNOTES_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over COLORNOTES_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Keep notes in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Create a note from the command line
    New(NewArgs),
    /// Print notes, optionally filtered
    List(ListArgs),
    /// Print a single note
    Show(ShowArgs),
    /// Change fields of an existing note and save it
    Edit(EditArgs),
    /// Delete a note
    Delete(DeleteArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;

    let ids = Arc::new(UuidGenerator);
    let calendar = Arc::new(SystemCalendar);
    let store: Arc<dyn NoteStore> = if cli.ephemeral {
        tracing::info!("using in-memory note store");
        Arc::new(MemoryStore::default())
    } else {
        Arc::new(storage::init(&paths, &config.storage, ids.as_ref(), calendar.as_ref())?)
    };
    let ctx = EditorContext {
        store,
        ids,
        calendar,
        identity: config.identity,
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => {
            let mut app = App::new(&config, ctx)?;
            commands::run_tui(&mut app)
        }
        Commands::New(args) => commands::print(commands::new_note(&ctx, args)),
        Commands::List(args) => commands::print(commands::list_notes(&ctx, &config, &args)),
        Commands::Show(args) => commands::print(commands::show_note(&ctx, &args)),
        Commands::Edit(args) => commands::print(commands::edit_note(&ctx, args)),
        Commands::Delete(args) => commands::print(commands::delete_note(&ctx, &args)),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err))
    })
    .map(|_| ())
}
