//! PARAM.SFO manifest container
//!
//! Every save bundle carries a small binary key/value manifest describing it.
//! [`ParamSfo`] is the in-memory form; [`reader`] and [`writer`] convert to
//! and from the on-disk container.
//!
//! # File Structure
//!
//! ```text
//! +--------------------------------------------+
//! | Header (20 bytes)                          |
//! |  magic "\0PSF", version 0x0101             |
//! |  key_table: u32, data_table: u32, n: u32   |
//! +--------------------------------------------+
//! | Index (16 bytes x n)                       |
//! |  key_off: u16, fmt: u16, len: u32,         |
//! |  max_len: u32, data_off: u32               |
//! +--------------------------------------------+
//! | Key table (NUL-terminated, padded to 4)    |
//! +--------------------------------------------+
//! | Data table (max_len per entry, padded)     |
//! +--------------------------------------------+
//! ```
//!
//! All integers are little endian. Entries are stored sorted by key.

mod reader;
mod writer;

use std::collections::BTreeMap;

pub use reader::read_sfo;
pub use writer::write_sfo;

/// `"\0PSF"` read as a little-endian u32.
pub const SFO_MAGIC: u32 = 0x4653_5000;
pub const SFO_VERSION: u32 = 0x0000_0101;
pub const HEADER_SIZE: usize = 20;
pub const INDEX_ENTRY_SIZE: usize = 16;

/// UTF-8 string without terminator.
pub const FMT_UTF8_SPECIAL: u16 = 0x0004;
/// NUL-terminated UTF-8 string.
pub const FMT_UTF8: u16 = 0x0204;
/// 32-bit unsigned integer.
pub const FMT_INT32: u16 = 0x0404;

/// Manifest keys written for every save.
pub mod keys {
    pub const TITLE: &str = "TITLE";
    pub const SAVEDATA_TITLE: &str = "SAVEDATA_TITLE";
    pub const SAVEDATA_DETAIL: &str = "SAVEDATA_DETAIL";
    pub const PARENTAL_LEVEL: &str = "PARENTAL_LEVEL";
    pub const CATEGORY: &str = "CATEGORY";
    pub const SAVEDATA_DIRECTORY: &str = "SAVEDATA_DIRECTORY";
    pub const SAVEDATA_FILE_LIST: &str = "SAVEDATA_FILE_LIST";
    pub const SAVEDATA_PARAMS: &str = "SAVEDATA_PARAMS";
}

/// Malformed manifest data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SfoError {
    #[error("manifest too short ({0} bytes)")]
    TooShort(usize),

    #[error("bad manifest magic {0:#010x}")]
    BadMagic(u32),

    #[error("manifest {0} out of bounds")]
    OutOfBounds(&'static str),

    #[error("manifest key at offset {0} is not valid")]
    InvalidKey(usize),

    #[error("unknown format {fmt:#06x} for key {key}")]
    UnknownFormat { key: String, fmt: u16 },
}

/// A manifest value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfoValue {
    /// String content (no terminator) and its declared capacity.
    Str { bytes: Vec<u8>, max_len: u32 },
    Int(u32),
}

/// Ordered key/value manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSfo {
    values: BTreeMap<String, SfoValue>,
}

impl ParamSfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string value with capacity `max_len`, truncating the content.
    pub fn set_string(&mut self, key: &str, value: impl AsRef<[u8]>, max_len: u32) {
        let value = value.as_ref();
        let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
        let len = end.min(max_len as usize);
        self.values.insert(
            key.to_string(),
            SfoValue::Str {
                bytes: value[..len].to_vec(),
                max_len,
            },
        );
    }

    pub fn set_int(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), SfoValue::Int(value));
    }

    pub fn get(&self, key: &str) -> Option<&SfoValue> {
        self.values.get(key)
    }

    /// Raw string content for `key`, if it holds a string.
    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.values.get(key)? {
            SfoValue::Str { bytes, .. } => Some(bytes),
            SfoValue::Int(_) => None,
        }
    }

    /// String value for `key`; empty if absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        self.get_bytes(key)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    pub fn get_int(&self, key: &str) -> Option<u32> {
        match self.values.get(key)? {
            SfoValue::Int(v) => Some(*v),
            SfoValue::Str { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SfoValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize to the binary container.
    pub fn to_bytes(&self) -> Vec<u8> {
        write_sfo(self)
    }

    /// Parse the binary container.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SfoError> {
        read_sfo(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_round_trip() {
        let mut sfo = ParamSfo::new();
        sfo.set_string(keys::TITLE, "Test Game", 128);
        sfo.set_string(keys::SAVEDATA_TITLE, "Slot A", 128);

        let parsed = ParamSfo::from_bytes(&sfo.to_bytes()).unwrap();
        assert_eq!(parsed.get_string(keys::TITLE), "Test Game");
        assert_eq!(parsed.get_string(keys::SAVEDATA_TITLE), "Slot A");
    }

    #[test]
    fn long_values_truncate_to_capacity() {
        let long = "x".repeat(300);
        let mut sfo = ParamSfo::new();
        sfo.set_string(keys::TITLE, &long, 128);
        assert_eq!(sfo.get_bytes(keys::TITLE).unwrap().len(), 128);

        let parsed = ParamSfo::from_bytes(&sfo.to_bytes()).unwrap();
        assert_eq!(parsed.get_string(keys::TITLE), "x".repeat(128));
    }

    #[test]
    fn integers_and_placeholders_survive() {
        let mut sfo = ParamSfo::new();
        sfo.set_int(keys::PARENTAL_LEVEL, 5);
        sfo.set_string(keys::SAVEDATA_FILE_LIST, "", 3168);

        let parsed = ParamSfo::from_bytes(&sfo.to_bytes()).unwrap();
        assert_eq!(parsed.get_int(keys::PARENTAL_LEVEL), Some(5));
        assert_eq!(parsed.get_string(keys::PARENTAL_LEVEL), "");
        assert_eq!(
            parsed.get(keys::SAVEDATA_FILE_LIST),
            Some(&SfoValue::Str {
                bytes: Vec::new(),
                max_len: 3168
            })
        );
    }

    #[test]
    fn missing_key_reads_empty() {
        let sfo = ParamSfo::new();
        assert_eq!(sfo.get_string(keys::TITLE), "");
        assert!(sfo.get_int(keys::TITLE).is_none());
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut sfo = ParamSfo::new();
        sfo.set_string(keys::TITLE, "t", 8);
        sfo.set_string(keys::CATEGORY, "MS", 4);
        sfo.set_int(keys::PARENTAL_LEVEL, 1);
        let keys: Vec<_> = sfo.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["CATEGORY", "PARENTAL_LEVEL", "TITLE"]);
    }
}
