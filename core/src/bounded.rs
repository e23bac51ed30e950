//! Fixed-capacity byte strings
//!
//! Guest structures carry names in fixed-width fields (13-byte game ids,
//! 20-byte save names, 128-byte titles). [`BoundedStr`] keeps that capacity
//! in the type and truncates on every copy, so a value can never outgrow the
//! field it came from or will be written back to.

use std::fmt;

/// Byte string holding at most `N` bytes.
///
/// Construction stops at the first NUL and truncates to `N` bytes. The
/// contents are raw bytes; guest names are not guaranteed to be UTF-8.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundedStr<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> BoundedStr<N> {
    /// Capacity in bytes.
    pub const CAPACITY: usize = N;

    /// Empty string.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Copy from raw bytes, stopping at the first NUL and truncating to `N`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let len = end.min(N);
        let mut buf = [0; N];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self { buf, len }
    }

    /// Copy from a string, truncating to `N` bytes.
    pub fn from_str_truncated(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Re-bound a string of a different capacity.
    pub fn from_bounded<const M: usize>(other: &BoundedStr<M>) -> Self {
        Self::from_bytes(other.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lossy UTF-8 view, for paths and display.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// The full zero-padded field, as stored in guest memory.
    pub fn to_field(&self) -> [u8; N] {
        self.buf
    }
}

impl<const N: usize> Default for BoundedStr<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> From<&str> for BoundedStr<N> {
    fn from(s: &str) -> Self {
        Self::from_str_truncated(s)
    }
}

impl<const N: usize> PartialEq<&str> for BoundedStr<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> fmt::Display for BoundedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<const N: usize> fmt::Debug for BoundedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Game id field width.
pub type GameName = BoundedStr<13>;
/// Save name field width (also the candidate list entry width).
pub type SaveName = BoundedStr<20>;
/// Data file name field width.
pub type FileName = BoundedStr<13>;
/// Title fields shown per slot.
pub type Title = BoundedStr<128>;
