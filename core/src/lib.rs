//! Savedata Core - save slot management for an emulated handheld
//!
//! This crate implements the storage side of a save data dialog: it turns
//! a guest request into a cache of save slots, moves bundles between guest
//! memory and a virtual memory stick, and answers space queries.
//!
//! # Architecture
//!
//! - [`Savedata`] - Session holding the active request and slot cache
//! - [`SaveFileSystem`] - Virtual filesystem the bundles live on
//! - [`GuestMemory`] / [`ArenaAllocator`] - Emulated address space and the
//!   arena icon pixels are placed in
//! - [`ParamSfo`] - The `PARAM.SFO` manifest written beside each save

pub mod bounded;
pub mod config;
pub mod error;
pub mod icon;
#[cfg(test)]
mod integration;
pub mod memory;
pub mod path;
pub mod request;
pub mod savedata;
pub mod sfo;
pub mod space;
#[cfg(test)]
pub mod test_utils;
pub mod vfs;

// Re-export core traits and types
pub use bounded::{BoundedStr, FileName, GameName, SaveName, Title};
pub use config::SavedataConfig;
pub use error::{Result, SavedataError};
pub use icon::{DecodedIcon, IconDecoder, PngIconDecoder};
pub use memory::{ArenaAllocator, BlockAllocator, GuestBuffer, GuestMemory, GuestRam};
pub use request::{SaveRequest, SavedataMode, SfoParams};
pub use savedata::{SaveSlot, Savedata, SizesReport, SlotCache};
pub use sfo::ParamSfo;
pub use vfs::{FileAccess, FileInfo, HostFileSystem, SaveFileSystem};
