//! Flat guest RAM window

use super::{GuestMemory, MemoryError};

/// Contiguous guest RAM mapped at `base`.
pub struct GuestRam {
    base: u32,
    bytes: Vec<u8>,
}

impl GuestRam {
    /// Zero-filled RAM of `size` bytes starting at guest address `base`.
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn offset(&self, addr: u32, len: usize) -> Result<usize, MemoryError> {
        let err = MemoryError { addr, len };
        let start = addr.checked_sub(self.base).ok_or(err)? as usize;
        let end = start.checked_add(len).ok_or(err)?;
        if end > self.bytes.len() {
            return Err(err);
        }
        Ok(start)
    }
}

impl GuestMemory for GuestRam {
    fn slice(&self, addr: u32, len: usize) -> Result<&[u8], MemoryError> {
        let start = self.offset(addr, len)?;
        Ok(&self.bytes[start..start + len])
    }

    fn slice_mut(&mut self, addr: u32, len: usize) -> Result<&mut [u8], MemoryError> {
        let start = self.offset(addr, len)?;
        Ok(&mut self.bytes[start..start + len])
    }
}
