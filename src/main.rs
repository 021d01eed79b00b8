//! # Study Coach CLI (`coach`)
//!
//! ## Usage
//!
//! ```bash
//! coach --config ./config/coach.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `coach plan --owner <id> --minutes <n>` | Generate a study plan and print it as JSON |
//! | `coach plan ... --dry-run` | Print the prompt that would be sent, without generating |
//! | `coach materials --owner <id>` | List an owner's uploaded files and chunk counts |
//! | `coach serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # 90-minute plan for user u1
//! MISTRAL_API_KEY=... coach plan --owner u1 --minutes 90
//!
//! # Inspect what the model would see
//! coach plan --owner u1 --minutes 90 --dry-run
//!
//! # Serve POST /study/plan on [server].bind
//! RUST_LOG=debug coach serve
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use study_coach::config;
use study_coach::{plan_cmd, server};

/// Study Coach: time-boxed study plans from your uploaded material.
///
/// Reads the material store and generation settings from a TOML
/// configuration file. See `config/coach.example.toml`.
#[derive(Parser)]
#[command(
    name = "coach",
    about = "Study Coach: time-boxed study plans from your uploaded material",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/coach.toml`. Built-in defaults are used when
    /// the default file does not exist.
    #[arg(long, global = true, default_value = "./config/coach.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a study plan for an owner's uploaded material.
    ///
    /// Prints the JSON response body on stdout. Exits non-zero if the
    /// request is rejected or generation fails.
    Plan {
        /// Owner (user) identifier the material was uploaded under.
        #[arg(long)]
        owner: String,

        /// Total available study time in minutes (at least 10).
        #[arg(long, allow_hyphen_values = true)]
        minutes: i64,

        /// Print the rendered prompt instead of calling the generation service.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the files and chunk counts stored for an owner.
    Materials {
        #[arg(long)]
        owner: String,
    },

    /// Start the HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load(&cli.config)?;

    match cli.command {
        Commands::Plan {
            owner,
            minutes,
            dry_run,
        } => {
            plan_cmd::run_plan(&cfg, &owner, minutes, dry_run).await?;
        }
        Commands::Materials { owner } => {
            plan_cmd::run_materials(&cfg, &owner).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

/// Load the config file; a missing file at the default location falls
/// back to built-in defaults, any other failure is fatal.
fn load(path: &Path) -> anyhow::Result<config::Config> {
    if !path.exists() && path == Path::new("./config/coach.toml") {
        tracing::debug!("no config file at {}; using defaults", path.display());
        return Ok(config::Config::minimal());
    }
    config::load_config(path)
}
