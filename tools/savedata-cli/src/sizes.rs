//! Sizes command - print free, existing and required space for a save

use anyhow::{Context as _, Result};
use clap::Args;
use savedata_core::memory::GuestBuffer;
use savedata_core::{GuestMemory, SaveRequest, SavedataMode};

use crate::session::{Context, DATA_ADDR, MS_DATA_ADDR, MS_FREE_ADDR, UTILITY_DATA_ADDR};

/// Arguments for the sizes command
#[derive(Args)]
pub struct SizesArgs {
    /// Game identifier (directory prefix)
    #[arg(long)]
    pub game: String,

    /// Save name
    #[arg(long)]
    pub save: String,

    /// Data file name inside the slot
    #[arg(long, default_value = "DATA.BIN")]
    pub file: String,

    /// Size of the data file to be saved
    #[arg(long, default_value_t = 0)]
    pub data_size: u32,

    /// Size of ICON0 to be saved
    #[arg(long, default_value_t = 0)]
    pub icon0_size: u32,

    /// Size of ICON1 to be saved
    #[arg(long, default_value_t = 0)]
    pub icon1_size: u32,

    /// Size of PIC1 to be saved
    #[arg(long, default_value_t = 0)]
    pub pic1_size: u32,

    /// Size of SND0 to be saved
    #[arg(long, default_value_t = 0)]
    pub snd0_size: u32,
}

/// Buffer of `size` bytes; the size query never reads its contents.
fn sized(size: u32) -> GuestBuffer {
    if size == 0 {
        GuestBuffer::none()
    } else {
        GuestBuffer::new(DATA_ADDR, size)
    }
}

/// Execute the sizes command
pub fn execute(ctx: &Context, args: SizesArgs) -> Result<()> {
    let mut sd = ctx.open()?;

    let mut request = SaveRequest::new(SavedataMode::Sizes, &args.game, &args.save, &args.file);
    request.data = GuestBuffer::new(DATA_ADDR, args.data_size);
    request.icon0 = sized(args.icon0_size);
    request.icon1 = sized(args.icon1_size);
    request.pic1 = sized(args.pic1_size);
    request.snd0 = sized(args.snd0_size);
    request.ms_free = MS_FREE_ADDR;
    request.ms_data = MS_DATA_ADDR;
    request.utility_data = UTILITY_DATA_ADDR;

    sd.set_request(Some(request))
        .context("Failed to look up slot")?;
    let report = sd.get_sizes().context("Failed to compute sizes")?;

    let mem = sd.memory();
    println!("Cluster size: {} bytes", report.cluster_size);
    println!(
        "Free:     {:>10} clusters  {}",
        mem.read_u32(MS_FREE_ADDR + 4)?,
        mem.read_cstr(MS_FREE_ADDR + 12, 8)?
    );
    match report.existing_bytes {
        Some(_) => println!(
            "Existing: {:>10} clusters  {}",
            mem.read_u32(MS_DATA_ADDR + 36)?,
            mem.read_cstr(MS_DATA_ADDR + 44, 8)?
        ),
        None => println!("Existing: (no save)"),
    }
    println!(
        "Required: {:>10} clusters  {}",
        mem.read_u32(UTILITY_DATA_ADDR)?,
        mem.read_cstr(UTILITY_DATA_ADDR + 8, 8)?
    );

    if report.required_bytes > report.free_bytes + report.existing_bytes.unwrap_or(0) {
        tracing::warn!(
            required = report.required_bytes,
            free = report.free_bytes,
            "not enough space for this save"
        );
    }

    Ok(())
}
