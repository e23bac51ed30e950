//! Slot cache reconciliation

use super::{SaveSlot, Savedata};
use crate::bounded::SaveName;
use crate::error::{Result, SavedataError};
use crate::memory::{ArenaAllocator, GuestMemory};
use crate::path::save_dir;
use crate::request::SaveRequest;
use crate::vfs::SaveFileSystem;

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Savedata<F, M, A> {
    /// Make `request` the active request and rebuild the slot cache from it.
    ///
    /// The previous cache is always discarded first. Passing `None` leaves the
    /// session inactive and reports [`SavedataError::NullRequest`].
    ///
    /// Returns the number of cached slots.
    pub fn set_request(&mut self, request: Option<SaveRequest>) -> Result<usize> {
        self.clear();
        self.request = None;

        let Some(request) = request else {
            return Err(SavedataError::NullRequest);
        };

        let slots = match request.read_candidates(&self.memory) {
            Some(candidates) => self.reconcile_list(&request, &candidates),
            None => self.reconcile_single(&request),
        };
        self.cache.fill(slots);
        self.request = Some(request);

        tracing::debug!(slots = self.cache.len(), "slot cache rebuilt");
        Ok(self.cache.len())
    }

    /// One slot per candidate that exists; missing candidates become
    /// placeholders unless the mode hides empty slots.
    fn reconcile_list(&mut self, request: &SaveRequest, candidates: &[SaveName]) -> Vec<SaveSlot> {
        let list_empty = request.mode.lists_empty_slots();
        let mut slots = Vec::with_capacity(candidates.len());

        for (idx, name) in candidates.iter().enumerate() {
            if let Some(slot) = self.probe_slot(request, *name, idx, list_empty) {
                slots.push(slot);
            }
        }
        slots
    }

    fn reconcile_single(&mut self, request: &SaveRequest) -> Vec<SaveSlot> {
        let list_empty = request.mode.lists_empty_slots();
        self.probe_slot(request, request.save_name, 0, list_empty)
            .into_iter()
            .collect()
    }

    fn probe_slot(
        &mut self,
        request: &SaveRequest,
        name: SaveName,
        idx: usize,
        list_empty: bool,
    ) -> Option<SaveSlot> {
        let dir = save_dir(&request.game_name, &name);
        let data_path = self
            .resolver()
            .file_path(&dir, &request.file_name.to_string_lossy());
        let info = self.fs.file_info(&data_path);

        if info.exists {
            tracing::debug!(path = %data_path, "slot exists");
            Some(self.load_slot_info(&dir, name, idx, &info))
        } else if list_empty {
            tracing::debug!(path = %data_path, "slot missing, listing as empty");
            Some(SaveSlot::placeholder(name, idx))
        } else {
            tracing::debug!(path = %data_path, "slot missing, skipped");
            None
        }
    }
}
