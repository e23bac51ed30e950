//! Sfo command - dump a PARAM.SFO manifest

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use savedata_core::ParamSfo;
use savedata_core::sfo::SfoValue;

/// Arguments for the sfo command
#[derive(Args)]
pub struct SfoArgs {
    /// Path to a PARAM.SFO file on the host
    pub path: PathBuf,
}

/// Execute the sfo command
pub fn execute(args: SfoArgs) -> Result<()> {
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let sfo = ParamSfo::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse {}", args.path.display()))?;

    println!("{} ({} entries)", args.path.display(), sfo.len());
    for (key, value) in sfo.iter() {
        match value {
            SfoValue::Str { bytes, max_len } => {
                println!(
                    "  {:<20} = {:?} (max {})",
                    key,
                    String::from_utf8_lossy(bytes),
                    max_len
                );
            }
            SfoValue::Int(n) => println!("  {:<20} = {}", key, n),
        }
    }

    Ok(())
}
