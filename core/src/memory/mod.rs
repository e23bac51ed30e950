//! Guest memory access
//!
//! The save data core never dereferences guest addresses itself. Everything
//! goes through [`GuestMemory`], which checks each access against the mapped
//! range before handing out a native slice.
//!
//! # Key Types
//!
//! - [`GuestMemory`] - Capability-checked view of the emulated address space
//! - [`GuestRam`] - Flat RAM window at a base address
//! - [`ArenaAllocator`] - Kernel-style block allocator inside guest memory
//! - [`IconAllocation`] - Move-only handle for an allocated icon block

mod allocator;
mod ram;

use byteorder::{ByteOrder, LittleEndian};

pub use allocator::{ArenaAllocator, BlockAllocator, ICON_ALLOC_TAG, IconAllocation};
pub use ram::GuestRam;

/// Out-of-range guest memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid guest memory access at {addr:#010x} (len {len})")]
pub struct MemoryError {
    pub addr: u32,
    pub len: usize,
}

/// Capability-checked accessor bridging guest addresses and native buffers.
///
/// Implementors only provide the two slice accessors; all typed access is
/// built on top of them. Multi-byte values are little endian.
pub trait GuestMemory {
    /// Borrow `len` bytes at `addr`, or fail if any byte is unmapped.
    fn slice(&self, addr: u32, len: usize) -> Result<&[u8], MemoryError>;

    /// Mutably borrow `len` bytes at `addr`, or fail if any byte is unmapped.
    fn slice_mut(&mut self, addr: u32, len: usize) -> Result<&mut [u8], MemoryError>;

    fn is_valid_address(&self, addr: u32) -> bool {
        addr != 0 && self.slice(addr, 1).is_ok()
    }

    fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        addr != 0 && self.slice(addr, len).is_ok()
    }

    fn read_u8(&self, addr: u32) -> Result<u8, MemoryError> {
        Ok(self.slice(addr, 1)?[0])
    }

    fn read_u32(&self, addr: u32) -> Result<u32, MemoryError> {
        Ok(LittleEndian::read_u32(self.slice(addr, 4)?))
    }

    fn write_u8(&mut self, addr: u32, value: u8) -> Result<(), MemoryError> {
        self.slice_mut(addr, 1)?[0] = value;
        Ok(())
    }

    fn write_u32(&mut self, addr: u32, value: u32) -> Result<(), MemoryError> {
        LittleEndian::write_u32(self.slice_mut(addr, 4)?, value);
        Ok(())
    }

    /// Copy `len` guest bytes out into a native buffer.
    fn read_bytes(&self, addr: u32, len: usize) -> Result<Vec<u8>, MemoryError> {
        Ok(self.slice(addr, len)?.to_vec())
    }

    fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        self.slice_mut(addr, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn fill(&mut self, addr: u32, value: u8, len: usize) -> Result<(), MemoryError> {
        self.slice_mut(addr, len)?.fill(value);
        Ok(())
    }

    /// Read a NUL-terminated string of at most `max_len` bytes.
    fn read_cstr(&self, addr: u32, max_len: usize) -> Result<String, MemoryError> {
        let mut bytes = Vec::new();
        for i in 0..max_len {
            let b = self.read_u8(addr.wrapping_add(i as u32))?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write `text` into a fixed field of `field_len` bytes, zero padded.
    ///
    /// The text is cut so at least one NUL terminator always fits.
    fn write_cstr_field(
        &mut self,
        addr: u32,
        field_len: usize,
        text: &str,
    ) -> Result<(), MemoryError> {
        let field = self.slice_mut(addr, field_len)?;
        field.fill(0);
        let n = text.len().min(field_len.saturating_sub(1));
        field[..n].copy_from_slice(&text.as_bytes()[..n]);
        Ok(())
    }
}

/// A guest buffer reference: address plus declared size.
///
/// Address 0 means the caller supplied no buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuestBuffer {
    pub addr: u32,
    pub size: u32,
}

impl GuestBuffer {
    pub const fn new(addr: u32, size: u32) -> Self {
        Self { addr, size }
    }

    pub const fn none() -> Self {
        Self { addr: 0, size: 0 }
    }

    pub fn is_null(&self) -> bool {
        self.addr == 0
    }
}
