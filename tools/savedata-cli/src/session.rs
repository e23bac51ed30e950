//! Shared setup: configuration, host memory stick and a scratch guest RAM

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use savedata_core::config::{self, SavedataConfig};
use savedata_core::memory::{BlockAllocator, GuestMemory, GuestRam};
use savedata_core::request::SAVE_NAME_ENTRY_LEN;
use savedata_core::{HostFileSystem, Savedata};

/// Base of the scratch guest RAM the CLI builds requests in.
pub const RAM_BASE: u32 = 0x0880_0000;
const RAM_SIZE: usize = 0x80_0000;

/// Candidate name list.
pub const LIST_ADDR: u32 = RAM_BASE + 0x100;
/// Size query output regions.
pub const MS_FREE_ADDR: u32 = RAM_BASE + 0x4000;
pub const MS_DATA_ADDR: u32 = RAM_BASE + 0x4100;
pub const UTILITY_DATA_ADDR: u32 = RAM_BASE + 0x4200;
/// Payload and asset buffers.
pub const DATA_ADDR: u32 = RAM_BASE + 0x1_0000;

/// Icons go in the upper half.
const ARENA_BASE: u32 = RAM_BASE + 0x40_0000;
const ARENA_SIZE: u32 = 0x40_0000;

/// Most candidate names accepted on the command line.
const MAX_NAMES: usize = (MS_FREE_ADDR - LIST_ADDR) as usize / SAVE_NAME_ENTRY_LEN - 1;

pub type CliSavedata = Savedata<HostFileSystem, GuestRam, BlockAllocator>;

/// Resolved configuration and memory stick location.
pub struct Context {
    pub config: SavedataConfig,
    pub host_dir: PathBuf,
}

impl Context {
    /// Load the configuration file and resolve the host directory.
    pub fn load(config_path: Option<PathBuf>, host_dir: Option<PathBuf>) -> Result<Self> {
        let config = match config_path.or_else(config::config_path) {
            Some(path) => config::load(&path),
            None => SavedataConfig::default(),
        };

        let host_dir = host_dir
            .or_else(|| config.storage.resolved_host_dir())
            .context("No host directory given and no platform data directory available")?;

        tracing::debug!(host_dir = %host_dir.display(), "using memory stick directory");
        Ok(Self { config, host_dir })
    }

    /// Open a session over the host directory, creating the save root.
    pub fn open(&self) -> Result<CliSavedata> {
        let fs = HostFileSystem::from_config(&self.host_dir, &self.config.storage);
        let mut session = Savedata::new(
            self.config.clone(),
            fs,
            GuestRam::new(RAM_BASE, RAM_SIZE),
            BlockAllocator::new(ARENA_BASE, ARENA_SIZE),
        );
        session
            .init()
            .with_context(|| format!("Failed to prepare {}", self.host_dir.display()))?;
        Ok(session)
    }
}

/// Write `names` as a candidate list at [`LIST_ADDR`] and return its address.
pub fn write_candidates<M: GuestMemory>(memory: &mut M, names: &[String]) -> Result<u32> {
    if names.len() > MAX_NAMES {
        anyhow::bail!("Too many save names ({}, max {})", names.len(), MAX_NAMES);
    }
    for (i, name) in names.iter().map(String::as_str).chain([""]).enumerate() {
        let addr = LIST_ADDR + (i * SAVE_NAME_ENTRY_LEN) as u32;
        memory.write_cstr_field(addr, SAVE_NAME_ENTRY_LEN, name)?;
    }
    Ok(LIST_ADDR)
}
