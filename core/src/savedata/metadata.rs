//! Per-slot metadata loading
//!
//! Icon and manifest problems are never fatal: the slot is still listed,
//! just without an icon or with empty titles.

use super::{SaveSlot, Savedata};
use crate::bounded::{SaveName, Title};
use crate::icon::MAX_ICON_BYTES;
use crate::memory::{ArenaAllocator, GuestMemory, IconAllocation};
use crate::sfo::{ParamSfo, keys};
use crate::vfs::{self, FileInfo, SaveFileSystem};

/// Largest manifest read from storage.
pub const MAX_SFO_BYTES: u64 = 64 * 1024;

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Savedata<F, M, A> {
    /// Build the descriptor for a slot whose data file exists.
    pub(super) fn load_slot_info(
        &mut self,
        dir: &str,
        save_name: SaveName,
        list_index: usize,
        info: &FileInfo,
    ) -> SaveSlot {
        let mut slot = SaveSlot::placeholder(save_name, list_index);
        slot.exists = true;
        slot.size = info.size;
        slot.mtime = info.mtime;

        self.load_icon(dir, &mut slot);
        self.load_titles(dir, &mut slot);
        slot
    }

    fn load_icon(&mut self, dir: &str, slot: &mut SaveSlot) {
        let path = self.resolver().icon0_path(dir);
        let bytes = match vfs::read_all(&mut self.fs, &path, MAX_ICON_BYTES) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "no icon for slot");
                return;
            }
        };

        let icon = match self.decoder.decode(&bytes) {
            Ok(icon) => icon,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to decode save icon");
                return;
            }
        };

        if icon.pixels.len() != icon.byte_len() {
            tracing::warn!(
                path = %path,
                width = icon.width,
                height = icon.height,
                bytes = icon.pixels.len(),
                "decoded icon size does not match its dimensions"
            );
            return;
        }
        let Ok(block_size) = u32::try_from(icon.byte_len()) else {
            tracing::warn!(path = %path, bytes = icon.byte_len(), "save icon too large");
            return;
        };

        let Some(alloc) = IconAllocation::allocate(&mut self.allocator, block_size) else {
            tracing::warn!(path = %path, bytes = icon.byte_len(), "no arena space for save icon");
            return;
        };

        if let Err(e) = self.memory.write_bytes(alloc.addr(), &icon.pixels) {
            tracing::warn!(path = %path, error = %e, "failed to copy save icon into guest memory");
            alloc.release(&mut self.allocator);
            return;
        }

        slot.set_icon(alloc, icon.width, icon.height);
    }

    fn load_titles(&mut self, dir: &str, slot: &mut SaveSlot) {
        let path = self.resolver().sfo_path(dir);
        let bytes = match vfs::read_all(&mut self.fs, &path, MAX_SFO_BYTES) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "no manifest for slot");
                return;
            }
        };

        match ParamSfo::from_bytes(&bytes) {
            Ok(sfo) => {
                let field = |key| Title::from_bytes(sfo.get_bytes(key).unwrap_or_default());
                slot.title = field(keys::TITLE);
                slot.save_title = field(keys::SAVEDATA_TITLE);
                slot.save_detail = field(keys::SAVEDATA_DETAIL);
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to parse save manifest");
            }
        }
    }
}
