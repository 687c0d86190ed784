mod config;
mod guidance;
mod repl;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coherence_core::{SentimentScorer, Trigger, unix_ms_to_iso8601};
use coherence_session::CoherenceSession;
use coherence_store::{JOURNAL_FILE, Store};

use crate::config::{AppConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "coherence", about = "Coherence engine over a local journal")]
struct Cli {
    /// Journal database (default: <data dir>/journal.db)
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    /// Config file (default: <data dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an entry and report the score and any trigger it caused
    Write {
        /// Entry text
        text: String,
    },

    /// Print the current coherence score
    Score,

    /// List journal entries, oldest first
    Log {
        /// Only the newest N entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Interactive journal session
    Session,

    /// Export the journal to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Append entries from a JSON export
    Import {
        /// Input file path
        path: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn data_dir() -> PathBuf {
    std::env::var("COHERENCE_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(coherence_store::default_base_dir)
}

fn load_config(cli: &Cli) -> AppConfig {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir().join(CONFIG_FILE));
    AppConfig::load(&path)
}

fn open_store(cli: &Cli) -> Result<Store> {
    let path = cli
        .journal
        .clone()
        .unwrap_or_else(|| data_dir().join(JOURNAL_FILE));
    Store::open(&path).with_context(|| format!("failed to open journal {}", path.display()))
}

/// Start a session over the journal as it stands.
fn start_session(config: &AppConfig, store: &Store) -> Result<CoherenceSession> {
    let sources = guidance::sources(&config.guidance).context("failed to build guidance source")?;
    let snapshot = store.snapshot().context("failed to read journal")?;
    let session = CoherenceSession::builder(sources)
        .config(config.engine.clone())
        .fetch_timeout(Duration::from_millis(config.guidance.fetch_timeout_ms))
        .init(&snapshot)?;
    Ok(session)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Write { text } => cmd_write(&cli, text).await,
        Commands::Score => cmd_score(&cli),
        Commands::Log { limit } => cmd_log(&cli, *limit),
        Commands::Session => cmd_session(&cli).await,
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path).await,
        Commands::Config => cmd_config(&cli),
    }
}

fn print_outcome(session: &CoherenceSession) {
    println!("score:   {:.2}", session.current_score());
    match session.current_trigger() {
        Trigger::None => println!("trigger: none"),
        Trigger::Suggestion { text } => {
            println!("trigger: suggestion");
            println!("  {text}");
        }
        Trigger::DissonanceEvent { practice_text } => {
            println!("trigger: dissonance");
            println!("  {practice_text}");
        }
    }
}

async fn cmd_write(cli: &Cli, text: &str) -> Result<()> {
    let config = load_config(cli);
    let mut store = open_store(cli)?;
    let session = start_session(&config, &store)?;
    store.subscribe(session.listener());

    let entry = store.append(text).context("failed to append entry")?;
    session.settle().await;

    println!("entry:   {}", entry.id);
    print_outcome(&session);
    session.dispose();
    Ok(())
}

fn cmd_score(cli: &Cli) -> Result<()> {
    let config = load_config(cli);
    let store = open_store(cli)?;
    let snapshot = store.snapshot().context("failed to read journal")?;
    let score = coherence_core::aggregate_with(&snapshot, &config.engine.scorer(), &config.engine);

    println!("score:   {score:.2}");
    println!("entries: {}", snapshot.len());
    Ok(())
}

fn cmd_log(cli: &Cli, limit: Option<usize>) -> Result<()> {
    let config = load_config(cli);
    let store = open_store(cli)?;
    let entries = match limit {
        Some(n) => store.tail(n),
        None => store.snapshot(),
    }
    .context("failed to read journal")?;

    if entries.is_empty() {
        println!("(journal is empty)");
        return Ok(());
    }
    let scorer = config.engine.scorer();
    for entry in &entries {
        println!(
            "{}  {:>2}  {}",
            unix_ms_to_iso8601(entry.timestamp),
            scorer.score(&entry.text),
            entry.text
        );
    }
    Ok(())
}

async fn cmd_session(cli: &Cli) -> Result<()> {
    let config = load_config(cli);
    let store = open_store(cli)?;
    let session = start_session(&config, &store)?;
    repl::run(store, session).await
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let store = open_store(cli)?;
    store
        .export_json_file(path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!(
        "exported {} entries to {}",
        store.len().context("failed to count entries")?,
        path.display()
    );
    Ok(())
}

async fn cmd_import(cli: &Cli, path: &Path) -> Result<()> {
    let config = load_config(cli);
    let mut store = open_store(cli)?;
    let session = start_session(&config, &store)?;
    store.subscribe(session.listener());

    let appended = store
        .import_json_file(path)
        .context("failed to import JSON")?;
    session.settle().await;

    println!(
        "imported {} entries from {}",
        appended.len(),
        path.display()
    );
    print_outcome(&session);
    session.dispose();
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    print!("{}", load_config(cli).to_toml()?);
    Ok(())
}
