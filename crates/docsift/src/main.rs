//! # docsift CLI
//!
//! ## Usage
//!
//! ```bash
//! docsift --config ./config/docsift.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsift init` | Create the SQLite database and schema |
//! | `docsift analyze <id>` | Analyze a document (stats, plagiarism, optional word cloud) |
//! | `docsift wordcloud <location> --output <path>` | Write a stored word-cloud image to a file |
//! | `docsift similar <id>` | List documents recorded as similar to `<id>` |
//!
//! Ctrl-C cancels an in-flight analysis; nothing is written for it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use docsift::{commands, config, db, logger, migrate};

/// docsift: document statistics, plagiarism detection, and word clouds.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docsift.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docsift",
    about = "Document statistics, plagiarism detection, and word clouds over a local corpus",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docsift.toml`.
    #[arg(long, global = true, default_value = "./config/docsift.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Analyze a document.
    ///
    /// Prints paragraph, word and character counts and whether the document
    /// closely matches one already analyzed. A document analyzed before is
    /// answered from the stored result.
    Analyze {
        /// Document id (a file name under `[content].root`).
        id: String,

        /// Also render a word cloud of the document's significant words.
        #[arg(long)]
        wordcloud: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a stored word-cloud image to a file.
    Wordcloud {
        /// Location returned by `analyze --wordcloud`.
        location: String,

        /// Destination file.
        #[arg(long, short)]
        output: PathBuf,
    },

    /// List documents recorded as similar to a document.
    Similar {
        /// Document id.
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(&cli.config)?;
    logger::init(&cfg.logging.level)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Analyze {
            id,
            wordcloud,
            json,
        } => {
            commands::run_analyze(&cfg, &id, wordcloud, json, &cancel).await?;
        }
        Commands::Wordcloud { location, output } => {
            commands::run_wordcloud(&cfg, &location, &output, &cancel).await?;
        }
        Commands::Similar { id } => {
            commands::run_similar(&cfg, &id).await?;
        }
    }

    Ok(())
}
