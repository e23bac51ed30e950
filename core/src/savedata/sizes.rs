//! Size queries written back to guest memory

use super::Savedata;
use crate::error::{Result, SavedataError};
use crate::memory::{ArenaAllocator, GuestMemory};
use crate::path::PathResolver;
use crate::space::{bundle_usage, normalize, space_text};
use crate::vfs::SaveFileSystem;

/// Bytes in the guest's "KB" counters.
const KB: u64 = 0x400;
/// Width of the text fields in the size structures.
const TEXT_LEN: usize = 8;

const MS_FREE_LEN: usize = 12 + TEXT_LEN;
const MS_DATA_LEN: usize = 56 + TEXT_LEN;
const UTILITY_DATA_LEN: usize = 20 + TEXT_LEN;

/// Figures computed by [`Savedata::get_sizes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizesReport {
    pub cluster_size: u32,
    pub free_bytes: u64,
    /// Cluster-rounded usage of the bundle currently on storage, if any.
    pub existing_bytes: Option<u64>,
    /// Cluster-rounded usage the request's bundle would need.
    pub required_bytes: u64,
}

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Savedata<F, M, A> {
    /// Compute free, existing and required space and write each result into
    /// its output region. Output regions at invalid addresses are skipped.
    pub fn get_sizes(&mut self) -> Result<SizesReport> {
        // First cached slot when a list is active, else the request's own name.
        let dir = self.save_dir(Some(0))?;
        let request = self.request.as_ref().ok_or(SavedataError::NullRequest)?;
        let cluster = self.fs.cluster_size().max(1);
        let free = self.fs.free_space();

        let existing = existing_usage(
            &self.fs,
            &PathResolver::new(&self.config.paths),
            &dir,
            &request.file_name.to_string_lossy(),
        );
        let required = bundle_usage(request.data.size as u64, &request.asset_sizes(), cluster);

        let report = SizesReport {
            cluster_size: cluster,
            free_bytes: free,
            existing_bytes: existing,
            required_bytes: required,
        };
        let (ms_free, ms_data, utility_data) =
            (request.ms_free, request.ms_data, request.utility_data);

        if self.memory.is_valid_range(ms_free, MS_FREE_LEN) {
            let mem = &mut self.memory;
            mem.write_u32(ms_free, cluster)?;
            mem.write_u32(ms_free + 4, saturate(free / cluster as u64))?;
            mem.write_u32(ms_free + 8, saturate(free / KB))?;
            mem.write_cstr_field(ms_free + 12, TEXT_LEN, &space_text(free))?;
        }

        if self.memory.is_valid_range(ms_data, MS_DATA_LEN) {
            let used = existing.unwrap_or(0);
            let text = if existing.is_some() {
                space_text(used)
            } else {
                String::new()
            };
            let mem = &mut self.memory;
            mem.write_u32(ms_data + 36, saturate(used / cluster as u64))?;
            mem.write_u32(ms_data + 40, saturate(used / KB))?;
            mem.write_cstr_field(ms_data + 44, TEXT_LEN, &text)?;
            mem.write_u32(ms_data + 52, saturate(used / KB))?;
            mem.write_cstr_field(ms_data + 56, TEXT_LEN, &text)?;
        }

        if self.memory.is_valid_range(utility_data, UTILITY_DATA_LEN) {
            let text = space_text(required);
            let mem = &mut self.memory;
            mem.write_u32(utility_data, saturate(required / cluster as u64))?;
            mem.write_u32(utility_data + 4, saturate(required / KB))?;
            mem.write_cstr_field(utility_data + 8, TEXT_LEN, &text)?;
            mem.write_u32(utility_data + 16, saturate(required / KB))?;
            mem.write_cstr_field(utility_data + 20, TEXT_LEN, &text)?;
        }

        tracing::debug!(?report, "save data sizes");
        Ok(report)
    }

    /// Report the id list result count. Listing entries is not supported, so
    /// the count is always 0.
    pub fn get_list(&mut self) -> Result<()> {
        let request = self.request.as_ref().ok_or(SavedataError::NullRequest)?;
        let count_addr = request.id_list.wrapping_add(4);
        if request.id_list != 0 && self.memory.is_valid_range(count_addr, 4) {
            self.memory.write_u32(count_addr, 0)?;
        }
        Ok(())
    }
}

/// Guest counters are 32-bit; larger values clamp to `u32::MAX`.
fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Cluster-rounded size of the files of a bundle present on storage, or
/// `None` if the slot directory does not exist.
fn existing_usage<F: SaveFileSystem>(
    fs: &F,
    resolver: &PathResolver<'_>,
    dir: &str,
    file_name: &str,
) -> Option<u64> {
    if !fs.file_info(&resolver.dir_path(dir)).exists {
        return None;
    }
    let cluster = fs.cluster_size();
    let mut names = vec![file_name, resolver.sfo_name()];
    names.extend(resolver.asset_names());

    let total = names
        .into_iter()
        .map(|name| fs.file_info(&resolver.file_path(dir, name)))
        .filter(|info| info.exists)
        .map(|info| normalize(info.size, cluster))
        .sum();
    Some(total)
}
