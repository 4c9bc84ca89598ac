mod display;
mod shell;

use chrono::Utc;
use clap::{Parser, Subcommand};
use notdeep_core::{
    ClientConfig, FileStore, HttpBackend, KeyValueStore, LinkSection, MemoryStore, QueryHistoryStore,
    SearchController, StorageError, ViewState, VoiceCapability,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "notdeep", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Search backend base URL
    #[arg(long, env = "NOTDEEP_BACKEND_URL", default_value = "http://localhost:5000")]
    backend_url: Url,

    /// Directory holding local query history
    #[arg(long, env = "NOTDEEP_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Keep query history in memory only
    #[arg(long, default_value_t = false)]
    ephemeral: bool,

    /// Request timeout in seconds, 0 waits forever
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Disable colored score badges
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one query and print the result cards.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Print child and parent links of every result.
        #[arg(long, default_value_t = false)]
        expand_links: bool,
    },
    /// Print autosuggest candidates for partial input.
    Suggest {
        #[arg(long)]
        query: String,
    },
    /// Print the backend's whole stemmed vocabulary.
    Stems,
    /// Inspect or edit the local query history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Print the backend's query log, newest first.
    RemoteHistory,
    /// Interactive search session.
    Shell,
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    /// Remove every entry equal to the query.
    Delete {
        #[arg(long)]
        query: String,
    },
    Clear,
}

enum LocalStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::File(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Self::File(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }
}

fn open_store(cli: &Cli, config: &ClientConfig) -> anyhow::Result<LocalStore> {
    if cli.ephemeral {
        return Ok(LocalStore::Memory(MemoryStore::new()));
    }

    let state_dir = match &cli.state_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("no local data directory, pass --state-dir"))?
            .join("notdeep"),
    };

    let store = FileStore::for_origin(&state_dir, &config.origin())?;
    info!(path = %store.path().display(), origin = %config.origin(), "local state");
    Ok(LocalStore::File(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let timeout = (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs));
    let config = ClientConfig::new(cli.backend_url.clone()).with_timeout(timeout);
    let history = QueryHistoryStore::open(open_store(&cli, &config)?)?;
    let color = display::use_color(cli.no_color);

    info!(
        version = app_version,
        backend = %config.base_url,
        started_at = %Utc::now().to_rfc3339(),
        "notdeep boot"
    );

    if let Command::History { action } = &cli.command {
        let mut history = history;
        match action {
            HistoryAction::List => display::print_history(history.entries(), None),
            HistoryAction::Delete { query } => {
                let removed = history.delete(query)?;
                println!("removed {removed} entries matching {query:?}");
            }
            HistoryAction::Clear => {
                history.clear()?;
                println!("history cleared");
            }
        }
        return Ok(());
    }

    let backend = HttpBackend::new(&config)?;
    let mut controller = SearchController::new(backend, history, VoiceCapability::Unavailable);

    match cli.command {
        Command::Search {
            query,
            expand_links,
        } => {
            controller.search_for(query).await;

            match controller.state() {
                ViewState::Results => {
                    if expand_links {
                        for index in 0..controller.cards().len() {
                            controller.toggle_links(index, LinkSection::Children);
                            controller.toggle_links(index, LinkSection::Parents);
                        }
                    }
                    display::print_cards(controller.cards(), color);
                }
                ViewState::Idle => println!("query is empty"),
                _ => println!("no results"),
            }
        }
        Command::Suggest { query } => {
            controller.type_text(query).await;
            display::print_numbered(controller.suggestions());
        }
        Command::Stems => {
            controller.toggle_stemmed_words().await;
            display::print_numbered(controller.vocabulary());
        }
        Command::RemoteHistory => {
            for entry in controller.remote_history().await {
                println!("{}  {}", entry.timestamp.to_rfc3339(), entry.query);
            }
        }
        Command::Shell => shell::run(&mut controller, color).await?,
        Command::History { .. } => {}
    }

    Ok(())
}
