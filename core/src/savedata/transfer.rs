//! Bundle save, load and delete

use std::io;

use super::Savedata;
use crate::error::{Result, SavedataError};
use crate::memory::{ArenaAllocator, GuestMemory, MemoryError};
use crate::path::PathResolver;
use crate::request::SfoParams;
use crate::sfo::{ParamSfo, keys};
use crate::vfs::{self, FileAccess, SaveFileSystem};

/// Manifest written alongside a save.
///
/// `SAVEDATA_FILE_LIST` and `SAVEDATA_PARAMS` are reserved with their full
/// capacity but left empty; no integrity hashes are computed.
pub fn build_manifest(params: &SfoParams, dir: &str) -> ParamSfo {
    let mut sfo = ParamSfo::new();
    sfo.set_string(keys::TITLE, params.title.as_bytes(), 128);
    sfo.set_string(keys::SAVEDATA_TITLE, params.savedata_title.as_bytes(), 128);
    sfo.set_string(keys::SAVEDATA_DETAIL, params.detail.as_bytes(), 1024);
    sfo.set_int(keys::PARENTAL_LEVEL, params.parental_level);
    sfo.set_string(keys::CATEGORY, "MS", 4);
    sfo.set_string(keys::SAVEDATA_DIRECTORY, dir, 64);
    sfo.set_string(keys::SAVEDATA_FILE_LIST, "", 3168);
    sfo.set_string(keys::SAVEDATA_PARAMS, "", 128);
    sfo
}

fn storage_error(path: String, e: io::Error) -> SavedataError {
    if e.kind() == io::ErrorKind::NotFound {
        SavedataError::NotFound { path }
    } else {
        SavedataError::io(path, e)
    }
}

impl<F: SaveFileSystem, M: GuestMemory, A: ArenaAllocator> Savedata<F, M, A> {
    /// Write the request's bundle into the selected slot.
    ///
    /// Only the primary data file is required to succeed. The manifest and the
    /// four optional assets are written best effort; their failures are logged
    /// and the save still succeeds.
    pub fn save(&mut self, selector: Option<usize>) -> Result<()> {
        let dir = self.save_dir(selector)?;
        // Field borrows only, so storage and memory stay mutably reachable.
        let resolver = PathResolver::new(&self.config.paths);
        let request = self.request.as_ref().ok_or(SavedataError::NullRequest)?;
        let dir_path = resolver.dir_path(&dir);
        let file_path = resolver.file_path(&dir, &request.file_name.to_string_lossy());

        let payload = self
            .memory
            .read_bytes(request.data.addr, request.data.size as usize)?;

        if !self.fs.file_info(&dir_path).exists {
            self.fs.mkdir(&dir_path).map_err(|e| {
                tracing::error!(path = %dir_path, error = %e, "failed to create save directory");
                SavedataError::io(dir_path.clone(), e)
            })?;
        }

        tracing::info!(size = payload.len(), path = %file_path, "saving file");
        if let Err(e) = vfs::write_all(&mut self.fs, &file_path, &payload) {
            tracing::error!(path = %file_path, error = %e, "failed to write save data");
            return Err(SavedataError::io(file_path, e));
        }

        let sfo_path = resolver.sfo_path(&dir);
        let sfo = build_manifest(&request.sfo, &dir).to_bytes();
        if let Err(e) = vfs::write_all(&mut self.fs, &sfo_path, &sfo) {
            tracing::warn!(path = %sfo_path, error = %e, "failed to write save manifest");
        }

        let assets = [request.icon0, request.icon1, request.pic1, request.snd0];
        for (buffer, name) in assets.iter().zip(resolver.asset_names()) {
            if buffer.is_null() {
                continue;
            }
            let path = resolver.file_path(&dir, name);
            let bytes = match self.memory.read_bytes(buffer.addr, buffer.size as usize) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "asset buffer not readable, skipped");
                    continue;
                }
            };
            if let Err(e) = vfs::write_all(&mut self.fs, &path, &bytes) {
                tracing::warn!(path = %path, error = %e, "failed to write save asset");
            }
        }

        Ok(())
    }

    /// Read the selected slot's data file into the request's data buffer.
    ///
    /// The destination range is checked before storage is touched. Exactly
    /// `data.size` bytes must be read. Assets are not reloaded; the
    /// slot cache already holds the icon and titles.
    pub fn load(&mut self, selector: Option<usize>) -> Result<()> {
        self.ensure_populated(selector)?;

        let dir = self.save_dir(selector)?;
        let request = self.active_request()?;
        let file_path = self
            .resolver()
            .file_path(&dir, &request.file_name.to_string_lossy());
        let (addr, size) = (request.data.addr, request.data.size as usize);
        if !self.memory.is_valid_range(addr, size) {
            tracing::error!(addr, size, "load destination is not mapped guest memory");
            return Err(MemoryError { addr, len: size }.into());
        }

        tracing::info!(size, path = %file_path, "loading file");
        let handle = self.fs.open_file(&file_path, FileAccess::READ).map_err(|e| {
            tracing::error!(path = %file_path, error = %e, "failed to open save data");
            storage_error(file_path.clone(), e)
        })?;

        let mut buf = vec![0u8; size];
        let result = self.fs.read_file(handle, &mut buf);
        self.fs.close_file(handle);

        let read = result.map_err(|e| {
            tracing::error!(path = %file_path, error = %e, "failed to read save data");
            SavedataError::io(file_path.clone(), e)
        })?;
        if read < size {
            tracing::error!(path = %file_path, expected = size, actual = read, "short read on save data");
            return Err(SavedataError::ShortRead {
                path: file_path,
                expected: size,
                actual: read,
            });
        }

        self.memory.write_bytes(addr, &buf)?;
        Ok(())
    }

    /// Remove the selected slot's directory and everything in it.
    pub fn delete(&mut self, selector: Option<usize>) -> Result<()> {
        self.ensure_populated(selector)?;

        let dir_path = self.save_dir_path(selector)?;
        if !self.fs.file_info(&dir_path).exists {
            tracing::warn!(path = %dir_path, "nothing to delete");
            return Err(SavedataError::NotFound { path: dir_path });
        }

        tracing::info!(path = %dir_path, "deleting save");
        self.fs.rmdir(&dir_path).map_err(|e| {
            tracing::error!(path = %dir_path, error = %e, "failed to delete save");
            SavedataError::io(dir_path.clone(), e)
        })
    }
}
