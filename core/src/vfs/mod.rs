//! Virtual filesystem seam
//!
//! Save data lives on an emulated storage medium addressed with POSIX-style
//! paths such as `ms0:/PSP/SAVEDATA/ULUS10000DATA00/DATA.BIN`. The core talks
//! to it only through [`SaveFileSystem`]; [`HostFileSystem`] backs it with a
//! directory on the host.

mod host;

use std::io;

use bitflags::bitflags;
use chrono::{DateTime, Utc};

pub use host::HostFileSystem;

bitflags! {
    /// Open mode for [`SaveFileSystem::open_file`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAccess: u8 {
        const READ = 0b0001;
        const WRITE = 0b0010;
        const CREATE = 0b0100;
        const TRUNCATE = 0b1000;
    }
}

/// Result of probing a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub exists: bool,
    pub is_dir: bool,
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
}

impl FileInfo {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Opaque open-file handle issued by a [`SaveFileSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

/// Storage collaborator used by the save data core.
///
/// Reads and writes may transfer fewer bytes than requested; callers decide
/// whether a short transfer is a failure.
pub trait SaveFileSystem {
    fn file_info(&self, path: &str) -> FileInfo;

    fn mkdir(&mut self, path: &str) -> io::Result<()>;

    /// Remove a directory and everything in it.
    fn rmdir(&mut self, path: &str) -> io::Result<()>;

    fn open_file(&mut self, path: &str, access: FileAccess) -> io::Result<FileHandle>;

    fn read_file(&mut self, handle: FileHandle, buf: &mut [u8]) -> io::Result<usize>;

    fn write_file(&mut self, handle: FileHandle, buf: &[u8]) -> io::Result<usize>;

    fn close_file(&mut self, handle: FileHandle);

    /// Allocation unit of the medium in bytes.
    fn cluster_size(&self) -> u32;

    /// Free bytes on the medium.
    fn free_space(&self) -> u64;
}

/// Read a whole file, capped at `max_bytes`.
pub fn read_all<F: SaveFileSystem + ?Sized>(
    fs: &mut F,
    path: &str,
    max_bytes: u64,
) -> io::Result<Vec<u8>> {
    let info = fs.file_info(path);
    if !info.exists {
        return Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()));
    }
    if info.size > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{path}: {} bytes exceeds limit of {max_bytes}", info.size),
        ));
    }

    let handle = fs.open_file(path, FileAccess::READ)?;
    let mut buf = vec![0u8; info.size as usize];
    let result = fs.read_file(handle, &mut buf);
    fs.close_file(handle);

    let n = result?;
    buf.truncate(n);
    Ok(buf)
}

/// Create or truncate `path` and write `data` fully.
pub fn write_all<F: SaveFileSystem + ?Sized>(fs: &mut F, path: &str, data: &[u8]) -> io::Result<()> {
    let handle = fs.open_file(
        path,
        FileAccess::WRITE | FileAccess::CREATE | FileAccess::TRUNCATE,
    )?;
    let result = fs.write_file(handle, data);
    fs.close_file(handle);

    let n = result?;
    if n != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("{path}: wrote {n} of {} bytes", data.len()),
        ));
    }
    Ok(())
}
