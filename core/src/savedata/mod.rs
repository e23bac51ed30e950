//! Save data session
//!
//! [`Savedata`] holds the active [`SaveRequest`] and the slot cache built from
//! it, and performs the save, load, delete and size queries a save dialog
//! issues.
//!
//! # Lifecycle
//!
//! 1. [`Savedata::set_request`] discards the previous cache (returning its
//!    icons to the allocator) and reconciles a new one.
//! 2. [`Savedata::save`], [`Savedata::load`], [`Savedata::delete`],
//!    [`Savedata::get_sizes`] and [`Savedata::get_list`] act on that request.
//! 3. [`Savedata::clear`] or dropping the session releases all icons.
//!
//! Calls are synchronous and must be serialized by the host; there is no
//! internal locking.

mod metadata;
mod reconcile;
mod sizes;
mod slot;
mod transfer;

#[cfg(test)]
mod tests;

use crate::bounded::SaveName;
use crate::config::SavedataConfig;
use crate::error::{Result, SavedataError};
use crate::icon::{IconDecoder, PngIconDecoder};
use crate::memory::{ArenaAllocator, GuestMemory};
use crate::path::{PathResolver, save_dir};
use crate::request::SaveRequest;
use crate::vfs::SaveFileSystem;

pub use sizes::SizesReport;
pub use slot::{SaveSlot, SlotCache};
pub use transfer::build_manifest;

/// Save data state for one emulated application.
pub struct Savedata<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> {
    config: SavedataConfig,
    fs: F,
    memory: M,
    allocator: A,
    decoder: Box<dyn IconDecoder>,
    request: Option<SaveRequest>,
    cache: SlotCache,
    selected_save: usize,
}

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Savedata<F, M, A> {
    /// Create a session over the given collaborators, decoding icons as PNG.
    pub fn new(config: SavedataConfig, fs: F, memory: M, allocator: A) -> Self {
        Self {
            config,
            fs,
            memory,
            allocator,
            decoder: Box::new(PngIconDecoder),
            request: None,
            cache: SlotCache::new(),
            selected_save: 0,
        }
    }

    /// Replace the icon decoder.
    pub fn with_decoder(mut self, decoder: impl IconDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Create the save root if it does not exist yet.
    pub fn init(&mut self) -> Result<()> {
        let root = self.config.paths.root.clone();
        if !self.fs.file_info(&root).exists {
            tracing::info!(root = %root, "creating save data root");
            self.fs
                .mkdir(&root)
                .map_err(|e| SavedataError::io(root, e))?;
        }
        Ok(())
    }

    pub fn config(&self) -> &SavedataConfig {
        &self.config
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn request(&self) -> Option<&SaveRequest> {
        self.request.as_ref()
    }

    pub fn cache(&self) -> &SlotCache {
        &self.cache
    }

    pub fn slot_count(&self) -> usize {
        self.cache.len()
    }

    pub fn slot(&self, idx: usize) -> Option<&SaveSlot> {
        self.cache.get(idx)
    }

    pub fn slots(&self) -> &[SaveSlot] {
        self.cache.as_slice()
    }

    pub fn slot_name(&self, idx: usize) -> Option<SaveName> {
        self.cache.get(idx).map(|s| s.save_name)
    }

    pub fn selected_save(&self) -> usize {
        self.selected_save
    }

    pub fn set_selected_save(&mut self, idx: usize) {
        self.selected_save = idx;
    }

    /// Release every cached icon and empty the cache.
    pub fn clear(&mut self) {
        self.cache.clear(&mut self.allocator);
    }

    pub(crate) fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.config.paths)
    }

    fn active_request(&self) -> Result<&SaveRequest> {
        self.request.as_ref().ok_or(SavedataError::NullRequest)
    }

    /// Cached slot addressed by `selector`, when the cache is populated.
    fn selected_slot(&self, selector: Option<usize>) -> Result<Option<&SaveSlot>> {
        match selector {
            Some(idx) if !self.cache.is_empty() => self
                .cache
                .get(idx)
                .map(Some)
                .ok_or(SavedataError::InvalidSlot(idx)),
            _ => Ok(None),
        }
    }

    /// Slot directory name for the active request.
    ///
    /// With a populated cache and a selector, the selected slot's name is
    /// used; otherwise the request's own save name.
    pub fn save_dir(&self, selector: Option<usize>) -> Result<String> {
        let request = self.active_request()?;
        let name = match self.selected_slot(selector)? {
            Some(slot) => slot.save_name,
            None => request.save_name,
        };
        Ok(save_dir(&request.game_name, &name))
    }

    /// Full virtual path of the selected slot directory.
    pub fn save_dir_path(&self, selector: Option<usize>) -> Result<String> {
        let dir = self.save_dir(selector)?;
        Ok(self.resolver().dir_path(&dir))
    }

    /// Refuse selectors naming a slot known to hold no data.
    fn ensure_populated(&self, selector: Option<usize>) -> Result<()> {
        if let (Some(idx), Some(slot)) = (selector, self.selected_slot(selector)?) {
            if slot.size == 0 {
                tracing::debug!(idx, save_name = %slot.save_name, "selected slot is empty");
                return Err(SavedataError::EmptySlot(idx));
            }
        }
        Ok(())
    }
}

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Drop for Savedata<F, M, A> {
    fn drop(&mut self) {
        self.clear();
    }
}
