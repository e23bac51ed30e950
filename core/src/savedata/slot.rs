//! Slot descriptors and the slot cache

use chrono::{DateTime, Utc};

use crate::bounded::{SaveName, Title};
use crate::memory::{ArenaAllocator, IconAllocation};

/// Display metadata for one save slot.
#[derive(Debug, Default)]
pub struct SaveSlot {
    pub save_name: SaveName,
    /// Whether the slot's data file was found on storage.
    pub exists: bool,
    /// Size of the data file; 0 for placeholders.
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
    pub title: Title,
    pub save_title: Title,
    pub save_detail: Title,
    pub icon_width: u32,
    pub icon_height: u32,
    /// Position in the candidate list this slot came from.
    pub list_index: usize,
    icon: Option<IconAllocation>,
}

impl SaveSlot {
    /// Empty, creatable slot: name set, no data, no icon.
    pub fn placeholder(save_name: SaveName, list_index: usize) -> Self {
        Self {
            save_name,
            list_index,
            ..Self::default()
        }
    }

    pub fn icon(&self) -> Option<&IconAllocation> {
        self.icon.as_ref()
    }

    /// Guest address of the decoded RGBA icon, if one was loaded.
    pub fn icon_addr(&self) -> Option<u32> {
        self.icon.as_ref().map(IconAllocation::addr)
    }

    pub(crate) fn set_icon(&mut self, icon: IconAllocation, width: u32, height: u32) {
        self.icon = Some(icon);
        self.icon_width = width;
        self.icon_height = height;
    }

    fn take_icon(&mut self) -> Option<IconAllocation> {
        self.icon.take()
    }
}

/// Ordered slot list for the active request.
///
/// Owns every icon allocation of its slots. Never edited in place: it is
/// cleared (returning icons to the allocator) and refilled as a whole.
#[derive(Debug, Default)]
pub struct SlotCache {
    slots: Vec<SaveSlot>,
}

impl SlotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&SaveSlot> {
        self.slots.get(idx)
    }

    pub fn as_slice(&self) -> &[SaveSlot] {
        &self.slots
    }

    /// Number of icon allocations currently owned.
    pub fn icon_count(&self) -> usize {
        self.slots.iter().filter(|s| s.icon.is_some()).count()
    }

    /// Release every icon allocation, then drop all slots.
    pub fn clear<A: ArenaAllocator + ?Sized>(&mut self, allocator: &mut A) {
        for slot in &mut self.slots {
            if let Some(icon) = slot.take_icon() {
                icon.release(allocator);
            }
        }
        self.slots.clear();
    }

    /// Replace the contents wholesale. The cache must already be cleared.
    pub(crate) fn fill(&mut self, slots: Vec<SaveSlot>) {
        debug_assert!(self.slots.is_empty(), "slot cache refilled without clearing");
        self.slots = slots;
    }
}
