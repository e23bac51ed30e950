//! PARAM.SFO writer

use super::{
    FMT_INT32, FMT_UTF8, HEADER_SIZE, INDEX_ENTRY_SIZE, ParamSfo, SFO_MAGIC, SFO_VERSION, SfoValue,
};

fn put_u16(dst: &mut Vec<u8>, v: u16) {
    dst.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(dst: &mut Vec<u8>, v: u32) {
    dst.extend_from_slice(&v.to_le_bytes());
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// (format, used length, allotted length) for one value.
fn layout(value: &SfoValue) -> (u16, u32, u32) {
    match value {
        SfoValue::Int(_) => (FMT_INT32, 4, 4),
        SfoValue::Str { bytes, max_len } => {
            // The terminator is stored only if it fits in the capacity.
            let used = (bytes.len() as u32 + 1).min(*max_len);
            (FMT_UTF8, used, align4(*max_len as usize) as u32)
        }
    }
}

/// Serialize a manifest to its binary container.
pub fn write_sfo(sfo: &ParamSfo) -> Vec<u8> {
    let count = sfo.len();

    let key_table_start = HEADER_SIZE + INDEX_ENTRY_SIZE * count;
    let key_table_len: usize = sfo.iter().map(|(k, _)| k.len() + 1).sum();
    let data_table_start = align4(key_table_start + key_table_len);
    let data_table_len: usize = sfo.iter().map(|(_, v)| layout(v).2 as usize).sum();

    let mut out = Vec::with_capacity(data_table_start + data_table_len);

    put_u32(&mut out, SFO_MAGIC);
    put_u32(&mut out, SFO_VERSION);
    put_u32(&mut out, key_table_start as u32);
    put_u32(&mut out, data_table_start as u32);
    put_u32(&mut out, count as u32);

    let mut key_off = 0usize;
    let mut data_off = 0usize;
    for (key, value) in sfo.iter() {
        let (fmt, used, max) = layout(value);
        put_u16(&mut out, key_off as u16);
        put_u16(&mut out, fmt);
        put_u32(&mut out, used);
        put_u32(&mut out, max);
        put_u32(&mut out, data_off as u32);
        key_off += key.len() + 1;
        data_off += max as usize;
    }

    for (key, _) in sfo.iter() {
        out.extend_from_slice(key.as_bytes());
        out.push(0);
    }
    out.resize(data_table_start, 0);

    for (_, value) in sfo.iter() {
        let (_, _, max) = layout(value);
        let start = out.len();
        match value {
            SfoValue::Int(v) => put_u32(&mut out, *v),
            SfoValue::Str { bytes, .. } => out.extend_from_slice(bytes),
        }
        out.resize(start + max as usize, 0);
    }

    out
}
