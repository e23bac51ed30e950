//! Caller-owned save data request

use crate::bounded::{BoundedStr, FileName, GameName, SaveName};
use crate::memory::{GuestBuffer, GuestMemory};

/// Width of one candidate list entry in guest memory.
pub const SAVE_NAME_ENTRY_LEN: usize = 20;

/// Upper bound on candidate entries scanned before giving up on a terminator.
pub const MAX_CANDIDATES: usize = 1024;

/// Operation the caller is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SavedataMode {
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

impl SavedataMode {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::AutoLoad,
            1 => Self::AutoSave,
            2 => Self::Load,
            3 => Self::Save,
            4 => Self::ListLoad,
            5 => Self::ListSave,
            6 => Self::ListDelete,
            7 => Self::Delete,
            8 => Self::Sizes,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::AutoLoad => 0,
            Self::AutoSave => 1,
            Self::Load => 2,
            Self::Save => 3,
            Self::ListLoad => 4,
            Self::ListSave => 5,
            Self::ListDelete => 6,
            Self::Delete => 7,
            Self::Sizes => 8,
        }
    }

    /// Whether empty candidate slots are shown as creatable placeholders.
    ///
    /// List-load and list-delete only ever present slots that hold data.
    pub fn lists_empty_slots(self) -> bool {
        !matches!(self, Self::ListLoad | Self::ListDelete)
    }
}

/// Manifest fields supplied with a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfoParams {
    pub title: BoundedStr<128>,
    pub savedata_title: BoundedStr<128>,
    pub detail: BoundedStr<1024>,
    pub parental_level: u32,
}

/// Everything a caller hands over for one save data operation.
///
/// Buffers and output regions are guest addresses; 0 means absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub mode: SavedataMode,
    pub game_name: GameName,
    pub save_name: SaveName,
    pub file_name: FileName,
    /// Primary payload.
    pub data: GuestBuffer,
    pub sfo: SfoParams,
    pub icon0: GuestBuffer,
    pub icon1: GuestBuffer,
    pub pic1: GuestBuffer,
    pub snd0: GuestBuffer,
    /// Candidate list: consecutive 20-byte names ending with an empty entry.
    pub save_name_list: u32,
    pub ms_free: u32,
    pub ms_data: u32,
    pub utility_data: u32,
    pub id_list: u32,
}

impl SaveRequest {
    pub fn new(mode: SavedataMode, game_name: &str, save_name: &str, file_name: &str) -> Self {
        Self {
            mode,
            game_name: GameName::from(game_name),
            save_name: SaveName::from(save_name),
            file_name: FileName::from(file_name),
            data: GuestBuffer::none(),
            sfo: SfoParams::default(),
            icon0: GuestBuffer::none(),
            icon1: GuestBuffer::none(),
            pic1: GuestBuffer::none(),
            snd0: GuestBuffer::none(),
            save_name_list: 0,
            ms_free: 0,
            ms_data: 0,
            utility_data: 0,
            id_list: 0,
        }
    }

    /// Sizes of the four optional assets, 0 for absent ones.
    pub fn asset_sizes(&self) -> [u64; 4] {
        [self.icon0, self.icon1, self.pic1, self.snd0]
            .map(|b| if b.is_null() { 0 } else { b.size as u64 })
    }

    /// Read the candidate names up to (not including) the first empty entry.
    ///
    /// Returns `None` when no list is attached. Scanning stops early at
    /// unmapped memory or after [`MAX_CANDIDATES`] entries.
    pub fn read_candidates<M: GuestMemory + ?Sized>(&self, memory: &M) -> Option<Vec<SaveName>> {
        if self.save_name_list == 0 {
            return None;
        }

        let mut names = Vec::new();
        for i in 0..MAX_CANDIDATES {
            let addr = self
                .save_name_list
                .wrapping_add((i * SAVE_NAME_ENTRY_LEN) as u32);
            let Ok(entry) = memory.slice(addr, SAVE_NAME_ENTRY_LEN) else {
                tracing::warn!(addr, index = i, "candidate list runs into unmapped memory");
                break;
            };
            let name = SaveName::from_bytes(entry);
            if name.is_empty() {
                break;
            }
            names.push(name);
        }
        Some(names)
    }
}
