//! Shared test utilities for integration and unit tests

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;

use chrono::{DateTime, TimeZone, Utc};
use hashbrown::HashMap;

use crate::config::SavedataConfig;
use crate::memory::{BlockAllocator, GuestMemory, GuestRam};
use crate::request::{SAVE_NAME_ENTRY_LEN, SaveRequest, SavedataMode};
use crate::savedata::Savedata;
use crate::vfs::{FileAccess, FileHandle, FileInfo, SaveFileSystem};

// ============================================================================
// In-memory filesystem
// ============================================================================

struct OpenFile {
    path: String,
    pos: usize,
}

/// In-memory [`SaveFileSystem`] that counts calls and can fail writes.
pub struct MemoryFileSystem {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    handles: HashMap<u32, OpenFile>,
    next_handle: u32,
    fail_writes: HashSet<String>,
    pub cluster_size: u32,
    pub free_space: u64,
    pub mkdir_calls: usize,
    pub rmdir_calls: usize,
    pub open_calls: usize,
}

fn normalize(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}

fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|i| &path[..i])
}

pub fn test_mtime() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            dirs: BTreeSet::new(),
            files: BTreeMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            fail_writes: HashSet::new(),
            cluster_size: 0x8000,
            free_space: 1024 * 1024 * 1024,
            mkdir_calls: 0,
            rmdir_calls: 0,
            open_calls: 0,
        }
    }

    /// Make every write to `path` fail.
    pub fn fail_writes_to(&mut self, path: &str) {
        self.fail_writes.insert(normalize(path));
    }

    /// Place a file directly, creating its parent directories.
    pub fn insert_file(&mut self, path: &str, data: &[u8]) {
        let path = normalize(path);
        if let Some(dir) = parent(&path) {
            self.add_dir_all(dir);
        }
        self.files.insert(path, data.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&normalize(path)).map(Vec::as_slice)
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    fn add_dir_all(&mut self, dir: &str) {
        let mut current = dir;
        loop {
            self.dirs.insert(current.to_string());
            match parent(current) {
                Some(p) if !p.is_empty() && !p.ends_with(':') => current = p,
                _ => break,
            }
        }
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveFileSystem for MemoryFileSystem {
    fn file_info(&self, path: &str) -> FileInfo {
        let path = normalize(path);
        if let Some(data) = self.files.get(&path) {
            FileInfo {
                exists: true,
                is_dir: false,
                size: data.len() as u64,
                mtime: Some(test_mtime()),
            }
        } else if self.dirs.contains(&path) {
            FileInfo {
                exists: true,
                is_dir: true,
                size: 0,
                mtime: Some(test_mtime()),
            }
        } else {
            FileInfo::missing()
        }
    }

    fn mkdir(&mut self, path: &str) -> io::Result<()> {
        self.mkdir_calls += 1;
        self.add_dir_all(&normalize(path));
        Ok(())
    }

    fn rmdir(&mut self, path: &str) -> io::Result<()> {
        self.rmdir_calls += 1;
        let path = normalize(path);
        if !self.dirs.remove(&path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, path));
        }
        let prefix = format!("{path}/");
        self.dirs.retain(|d| !d.starts_with(&prefix));
        self.files.retain(|f, _| !f.starts_with(&prefix));
        Ok(())
    }

    fn open_file(&mut self, path: &str, access: FileAccess) -> io::Result<FileHandle> {
        self.open_calls += 1;
        let path = normalize(path);

        if !self.files.contains_key(&path) {
            if !access.contains(FileAccess::CREATE) {
                return Err(io::Error::new(io::ErrorKind::NotFound, path));
            }
            let dir_exists = parent(&path).is_some_and(|d| self.dirs.contains(d));
            if !dir_exists {
                return Err(io::Error::new(io::ErrorKind::NotFound, path));
            }
            self.files.insert(path.clone(), Vec::new());
        } else if access.contains(FileAccess::TRUNCATE) {
            self.files.insert(path.clone(), Vec::new());
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, OpenFile { path, pos: 0 });
        Ok(FileHandle(handle))
    }

    fn read_file(&mut self, handle: FileHandle, buf: &mut [u8]) -> io::Result<usize> {
        let open = self
            .handles
            .get_mut(&handle.0)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "bad handle"))?;
        let data = self.files.get(&open.path).map(Vec::as_slice).unwrap_or_default();
        let available = data.len().saturating_sub(open.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&data[open.pos..open.pos + n]);
        open.pos += n;
        Ok(n)
    }

    fn write_file(&mut self, handle: FileHandle, buf: &[u8]) -> io::Result<usize> {
        let open = self
            .handles
            .get_mut(&handle.0)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "bad handle"))?;
        if self.fail_writes.contains(&open.path) {
            return Err(io::Error::other("injected write failure"));
        }
        let data = self.files.entry(open.path.clone()).or_default();
        let end = open.pos + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[open.pos..end].copy_from_slice(buf);
        open.pos = end;
        Ok(buf.len())
    }

    fn close_file(&mut self, handle: FileHandle) {
        self.handles.remove(&handle.0);
    }

    fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    fn free_space(&self) -> u64 {
        self.free_space
    }
}

// ============================================================================
// Session helpers
// ============================================================================

pub const RAM_BASE: u32 = 0x0880_0000;
pub const RAM_SIZE: usize = 0x20_0000;
/// Icons are allocated from the upper half of test RAM.
pub const ARENA_BASE: u32 = RAM_BASE + 0x10_0000;
pub const ARENA_SIZE: u32 = 0x10_0000;

/// Scratch area for request buffers in test RAM.
pub const DATA_ADDR: u32 = RAM_BASE + 0x1000;
pub const LIST_ADDR: u32 = RAM_BASE + 0x100;
pub const OUT_ADDR: u32 = RAM_BASE + 0x800;

pub type TestSavedata = Savedata<MemoryFileSystem, GuestRam, BlockAllocator>;

pub fn test_session() -> TestSavedata {
    Savedata::new(
        SavedataConfig::default(),
        MemoryFileSystem::new(),
        GuestRam::new(RAM_BASE, RAM_SIZE),
        BlockAllocator::new(ARENA_BASE, ARENA_SIZE),
    )
}

pub fn request(mode: SavedataMode, save_name: &str) -> SaveRequest {
    SaveRequest::new(mode, "ULUS10000", save_name, "DATA.BIN")
}

/// Write a candidate list (terminated by an empty entry) at [`LIST_ADDR`].
pub fn write_candidates<M: GuestMemory>(memory: &mut M, names: &[&str]) -> u32 {
    for (i, name) in names.iter().chain(std::iter::once(&"")).enumerate() {
        let mut entry = [0u8; SAVE_NAME_ENTRY_LEN];
        entry[..name.len()].copy_from_slice(name.as_bytes());
        let addr = LIST_ADDR + (i * SAVE_NAME_ENTRY_LEN) as u32;
        memory.write_bytes(addr, &entry).unwrap();
    }
    LIST_ADDR
}

/// Path of a data file for game `ULUS10000` under the default root.
pub fn data_path(save_name: &str) -> String {
    format!("ms0:/PSP/SAVEDATA/ULUS10000{save_name}/DATA.BIN")
}

pub fn slot_file(save_name: &str, file: &str) -> String {
    format!("ms0:/PSP/SAVEDATA/ULUS10000{save_name}/{file}")
}
