//! PARAM.SFO reader

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    FMT_INT32, FMT_UTF8, FMT_UTF8_SPECIAL, HEADER_SIZE, INDEX_ENTRY_SIZE, ParamSfo, SFO_MAGIC,
    SfoError,
};

struct IndexEntry {
    key_off: u16,
    fmt: u16,
    len: u32,
    max_len: u32,
    data_off: u32,
}

/// Parse a manifest from its binary container.
///
/// Every offset is bounds-checked against `data`; nothing is trusted.
pub fn read_sfo(data: &[u8]) -> Result<ParamSfo, SfoError> {
    if data.len() < HEADER_SIZE {
        return Err(SfoError::TooShort(data.len()));
    }

    let mut cursor = Cursor::new(data);
    let header = read_header(&mut cursor).map_err(|_| SfoError::TooShort(data.len()))?;
    let [magic, _version, key_table, data_table, count] = header;

    if magic != SFO_MAGIC {
        return Err(SfoError::BadMagic(magic));
    }

    let key_table = key_table as usize;
    let data_table = data_table as usize;
    let count = count as usize;

    let index_end = count
        .checked_mul(INDEX_ENTRY_SIZE)
        .and_then(|n| n.checked_add(HEADER_SIZE))
        .ok_or(SfoError::OutOfBounds("index table"))?;
    if index_end > data.len() {
        return Err(SfoError::OutOfBounds("index table"));
    }
    if key_table > data.len() {
        return Err(SfoError::OutOfBounds("key table"));
    }
    if data_table > data.len() {
        return Err(SfoError::OutOfBounds("data table"));
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let entry = read_entry(&mut cursor).map_err(|_| SfoError::OutOfBounds("index entry"))?;
        entries.push(entry);
    }

    let mut sfo = ParamSfo::new();
    for entry in entries {
        let key = read_key(data, key_table + entry.key_off as usize)?;

        let start = data_table + entry.data_off as usize;
        let end = start
            .checked_add(entry.len as usize)
            .ok_or(SfoError::OutOfBounds("value"))?;
        let raw = data.get(start..end).ok_or(SfoError::OutOfBounds("value"))?;

        match entry.fmt {
            FMT_INT32 => {
                let value = raw
                    .get(..4)
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .ok_or(SfoError::OutOfBounds("value"))?;
                sfo.set_int(&key, value);
            }
            FMT_UTF8 | FMT_UTF8_SPECIAL => {
                sfo.set_string(&key, raw, entry.max_len);
            }
            fmt => return Err(SfoError::UnknownFormat { key, fmt }),
        }
    }

    Ok(sfo)
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> io::Result<[u32; 5]> {
    let mut header = [0u32; 5];
    cursor.read_u32_into::<LittleEndian>(&mut header)?;
    Ok(header)
}

fn read_entry(cursor: &mut Cursor<&[u8]>) -> io::Result<IndexEntry> {
    Ok(IndexEntry {
        key_off: cursor.read_u16::<LittleEndian>()?,
        fmt: cursor.read_u16::<LittleEndian>()?,
        len: cursor.read_u32::<LittleEndian>()?,
        max_len: cursor.read_u32::<LittleEndian>()?,
        data_off: cursor.read_u32::<LittleEndian>()?,
    })
}

fn read_key(data: &[u8], offset: usize) -> Result<String, SfoError> {
    let tail = data.get(offset..).ok_or(SfoError::InvalidKey(offset))?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(SfoError::InvalidKey(offset))?;
    if len == 0 {
        return Err(SfoError::InvalidKey(offset));
    }
    std::str::from_utf8(&tail[..len])
        .map(str::to_string)
        .map_err(|_| SfoError::InvalidKey(offset))
}
