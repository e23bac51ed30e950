//! Host directory backing for the memory stick

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;

use super::{FileAccess, FileHandle, FileInfo, SaveFileSystem};
use crate::config::StorageConfig;

/// Device prefix accepted on virtual paths.
pub const DEVICE_PREFIX: &str = "ms0:";

/// [`SaveFileSystem`] backed by a host directory.
///
/// `ms0:/PSP/SAVEDATA/X` maps to `<root>/PSP/SAVEDATA/X`. Paths that would
/// leave the root are rejected.
pub struct HostFileSystem {
    root: PathBuf,
    cluster_size: u32,
    free_space: u64,
    files: HashMap<u32, File>,
    next_handle: u32,
}

impl HostFileSystem {
    pub fn new(root: impl Into<PathBuf>, cluster_size: u32, free_space: u64) -> Self {
        Self {
            root: root.into(),
            cluster_size: cluster_size.max(1),
            free_space,
            files: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Build from the `[storage]` config section, rooted at `root`.
    pub fn from_config(root: impl Into<PathBuf>, storage: &StorageConfig) -> Self {
        Self::new(root, storage.cluster_size, storage.free_space)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.files.len()
    }

    /// Resolve a virtual path to a host path inside the root.
    pub fn host_path(&self, path: &str) -> io::Result<PathBuf> {
        let rel = path.strip_prefix(DEVICE_PREFIX).unwrap_or(path);
        let mut out = self.root.clone();
        for component in Path::new(rel.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes storage root: {path}"),
                    ));
                }
            }
        }
        Ok(out)
    }

    fn file(&mut self, handle: FileHandle) -> io::Result<&mut File> {
        self.files
            .get_mut(&handle.0)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "unknown file handle"))
    }
}

impl SaveFileSystem for HostFileSystem {
    fn file_info(&self, path: &str) -> FileInfo {
        let Ok(host) = self.host_path(path) else {
            return FileInfo::missing();
        };
        match fs::metadata(&host) {
            Ok(meta) => FileInfo {
                exists: true,
                is_dir: meta.is_dir(),
                size: if meta.is_dir() { 0 } else { meta.len() },
                mtime: meta.modified().ok().map(DateTime::<Utc>::from),
            },
            Err(_) => FileInfo::missing(),
        }
    }

    fn mkdir(&mut self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.host_path(path)?)
    }

    fn rmdir(&mut self, path: &str) -> io::Result<()> {
        fs::remove_dir_all(self.host_path(path)?)
    }

    fn open_file(&mut self, path: &str, access: FileAccess) -> io::Result<FileHandle> {
        let host = self.host_path(path)?;
        let file = OpenOptions::new()
            .read(access.contains(FileAccess::READ))
            .write(access.intersects(FileAccess::WRITE | FileAccess::CREATE))
            .create(access.contains(FileAccess::CREATE))
            .truncate(access.contains(FileAccess::TRUNCATE))
            .open(&host)?;

        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        self.files.insert(handle, file);
        Ok(FileHandle(handle))
    }

    fn read_file(&mut self, handle: FileHandle, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file(handle)?;
        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn write_file(&mut self, handle: FileHandle, buf: &[u8]) -> io::Result<usize> {
        self.file(handle)?.write_all(buf)?;
        Ok(buf.len())
    }

    fn close_file(&mut self, handle: FileHandle) {
        self.files.remove(&handle.0);
    }

    fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    fn free_space(&self) -> u64 {
        self.free_space
    }
}
