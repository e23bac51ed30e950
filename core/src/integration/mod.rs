//! Integration tests for the save data session
//!
//! Drives full request cycles (reconcile, save, load, delete, size queries)
//! against the in-memory filesystem and a host directory.


#[cfg(test)]
pub(crate) mod test_utils {
    use crate::memory::{GuestBuffer, GuestMemory};
    use crate::request::{SaveRequest, SavedataMode};
    use crate::test_utils::{DATA_ADDR, request};

    /// Recognizable payload of `len` bytes.
    pub fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    /// Request whose data buffer at [`DATA_ADDR`] holds `data`.
    pub fn request_with_data<M: GuestMemory>(
        memory: &mut M,
        mode: SavedataMode,
        save_name: &str,
        data: &[u8],
    ) -> SaveRequest {
        memory.write_bytes(DATA_ADDR, data).unwrap();
        let mut req = request(mode, save_name);
        req.data = GuestBuffer::new(DATA_ADDR, data.len() as u32);
        req
    }
}
