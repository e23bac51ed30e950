//! Delete command - remove a save slot

use anyhow::{Context as _, Result};
use clap::Args;
use savedata_core::{SaveRequest, SavedataMode};

use crate::session::Context;

/// Arguments for the delete command
#[derive(Args)]
pub struct DeleteArgs {
    /// Game identifier (directory prefix)
    #[arg(long)]
    pub game: String,

    /// Save name to remove
    #[arg(long)]
    pub save: String,

    /// Data file name inside the slot
    #[arg(long, default_value = "DATA.BIN")]
    pub file: String,
}

/// Execute the delete command
pub fn execute(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let mut sd = ctx.open()?;

    let request = SaveRequest::new(SavedataMode::Delete, &args.game, &args.save, &args.file);
    sd.set_request(Some(request))
        .context("Failed to look up slot")?;

    let dir = sd.save_dir_path(Some(0))?;
    sd.delete(Some(0))
        .with_context(|| format!("Failed to delete {}", dir))?;

    println!("Deleted {}", dir);
    Ok(())
}
