//! Savedata CLI - inspect and manage save data on a host memory stick
//!
//! # Commands
//!
//! - `savedata list` - Reconcile a slot list and print each slot
//! - `savedata sfo` - Dump a PARAM.SFO manifest
//! - `savedata sizes` - Print free, existing and required space
//! - `savedata delete` - Remove a save slot
//!
//! # Usage
//!
//! ```bash
//! # Slots of a game, trying three candidate names
//! savedata --host-dir ./memstick list --game ULUS10000 --names DATA00,DATA01,DATA02
//!
//! # Space a 200 KB save with an icon would need
//! savedata sizes --game ULUS10000 --save DATA00 --data-size 204800 --icon0-size 9000
//! ```

mod delete;
mod list;
mod session;
mod sfo;
mod sizes;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Savedata CLI - inspect and manage save data on a host memory stick
#[derive(Parser)]
#[command(name = "savedata")]
#[command(about = "Inspect and manage save data on a host memory stick")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Host directory backing ms0: (overrides [storage].host_dir)
    #[arg(long, global = true)]
    host_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a slot list and print each slot
    List(list::ListArgs),

    /// Dump a PARAM.SFO manifest from the host
    Sfo(sfo::SfoArgs),

    /// Print free, existing and required space for a save
    Sizes(sizes::SizesArgs),

    /// Remove a save slot and everything in it
    Delete(delete::DeleteArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Cli {
        config,
        host_dir,
        command,
    } = Cli::parse();

    match command {
        Commands::List(args) => list::execute(&session::Context::load(config, host_dir)?, args),
        Commands::Sfo(args) => sfo::execute(args),
        Commands::Sizes(args) => sizes::execute(&session::Context::load(config, host_dir)?, args),
        Commands::Delete(args) => {
            delete::execute(&session::Context::load(config, host_dir)?, args)
        }
    }
}
