//! List command - reconcile a slot list and print each slot

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use savedata_core::{SaveRequest, SavedataMode};

use crate::session::{self, Context};

/// Request mode used for reconciliation
#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    AutoLoad,
    AutoSave,
    Load,
    Save,
    ListLoad,
    ListSave,
    ListDelete,
    Delete,
    Sizes,
}

impl From<ModeArg> for SavedataMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::AutoLoad => Self::AutoLoad,
            ModeArg::AutoSave => Self::AutoSave,
            ModeArg::Load => Self::Load,
            ModeArg::Save => Self::Save,
            ModeArg::ListLoad => Self::ListLoad,
            ModeArg::ListSave => Self::ListSave,
            ModeArg::ListDelete => Self::ListDelete,
            ModeArg::Delete => Self::Delete,
            ModeArg::Sizes => Self::Sizes,
        }
    }
}

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Game identifier (directory prefix)
    #[arg(long)]
    pub game: String,

    /// Save name used when no candidate list is given
    #[arg(long, default_value = "")]
    pub save: String,

    /// Candidate save names, comma separated
    #[arg(long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Request mode; list modes hide missing slots
    #[arg(long, value_enum, default_value = "list-load")]
    pub mode: ModeArg,

    /// Data file name inside each slot
    #[arg(long, default_value = "DATA.BIN")]
    pub file: String,
}

/// Execute the list command
pub fn execute(ctx: &Context, args: ListArgs) -> Result<()> {
    let mut sd = ctx.open()?;

    let mut request = SaveRequest::new(args.mode.into(), &args.game, &args.save, &args.file);
    if !args.names.is_empty() {
        request.save_name_list = session::write_candidates(sd.memory_mut(), &args.names)?;
    }

    let count = sd
        .set_request(Some(request))
        .context("Failed to build slot list")?;

    println!("{} slot(s) for {}", count, args.game);
    for (i, slot) in sd.slots().iter().enumerate() {
        if !slot.exists {
            println!("  [{}] {:<20} (empty)", i, slot.save_name);
            continue;
        }

        let modified = slot
            .mtime
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{}] {:<20} {:>10} bytes  {}",
            i, slot.save_name, slot.size, modified
        );
        if !slot.title.is_empty() {
            println!("      Title:  {}", slot.title);
        }
        if !slot.save_title.is_empty() {
            println!("      Save:   {}", slot.save_title);
        }
        if !slot.save_detail.is_empty() {
            println!("      Detail: {}", slot.save_detail);
        }
        if slot.icon().is_some() {
            println!("      Icon:   {}x{}", slot.icon_width, slot.icon_height);
        }
    }

    Ok(())
}
