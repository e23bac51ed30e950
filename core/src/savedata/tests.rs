//! Tests for slot reconciliation and metadata loading

use super::*;
use crate::icon::{DecodedIcon, IconDecodeError, IconDecoder, encode_test_png};
use crate::request::SavedataMode;
use crate::sfo::keys;
use crate::test_utils::*;

fn sfo_bytes(title: &str, save_title: &str, detail: &str) -> Vec<u8> {
    let mut sfo = crate::sfo::ParamSfo::new();
    sfo.set_string(keys::TITLE, title, 128);
    sfo.set_string(keys::SAVEDATA_TITLE, save_title, 128);
    sfo.set_string(keys::SAVEDATA_DETAIL, detail, 1024);
    sfo.to_bytes()
}

// ============================================================================
// Explicit candidate lists
// ============================================================================

#[test]
fn list_load_drops_missing_candidates() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");

    let mut req = request(SavedataMode::ListLoad, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B"]);

    assert_eq!(sd.set_request(Some(req)).unwrap(), 1);
    assert_eq!(sd.slot(0).unwrap().save_name, "A");
    assert!(sd.slot(0).unwrap().exists);
}

#[test]
fn list_delete_drops_missing_candidates() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("B"), b"data");

    let mut req = request(SavedataMode::ListDelete, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B", "C"]);

    assert_eq!(sd.set_request(Some(req)).unwrap(), 1);
    let slot = sd.slot(0).unwrap();
    assert_eq!(slot.save_name, "B");
    assert_eq!(slot.list_index, 1);
}

#[test]
fn other_modes_keep_empty_placeholders() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");

    let mut req = request(SavedataMode::ListSave, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B"]);

    assert_eq!(sd.set_request(Some(req)).unwrap(), 2);
    let a = sd.slot(0).unwrap();
    let b = sd.slot(1).unwrap();
    assert!(a.exists);
    assert_eq!(a.size, 4);
    assert_eq!(b.save_name, "B");
    assert!(!b.exists);
    assert_eq!(b.size, 0);
    assert!(b.icon_addr().is_none());
    assert_eq!(b.list_index, 1);
}

#[test]
fn empty_candidate_list_gives_empty_cache() {
    let mut sd = test_session();
    let mut req = request(SavedataMode::ListSave, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &[]);
    assert_eq!(sd.set_request(Some(req)).unwrap(), 0);
}

// ============================================================================
// Implicit single slot
// ============================================================================

#[test]
fn single_slot_existing() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("DATA00"), &[7; 100]);

    let req = request(SavedataMode::Load, "DATA00");
    assert_eq!(sd.set_request(Some(req)).unwrap(), 1);
    let slot = sd.slot(0).unwrap();
    assert_eq!(slot.size, 100);
    assert_eq!(slot.mtime, Some(test_mtime()));
}

#[test]
fn single_slot_missing_is_placeholder_outside_list_modes() {
    let mut sd = test_session();
    assert_eq!(sd.set_request(Some(request(SavedataMode::Save, "NEW"))).unwrap(), 1);
    assert_eq!(sd.slot(0).unwrap().save_name, "NEW");
    assert_eq!(sd.slot(0).unwrap().size, 0);

    assert_eq!(sd.set_request(Some(request(SavedataMode::ListLoad, "NEW"))).unwrap(), 0);
}

#[test]
fn null_request_clears_and_reports() {
    let mut sd = test_session();
    sd.set_request(Some(request(SavedataMode::Save, "X"))).unwrap();
    assert_eq!(sd.slot_count(), 1);

    assert!(matches!(sd.set_request(None), Err(SavedataError::NullRequest)));
    assert_eq!(sd.slot_count(), 0);
    assert!(sd.request().is_none());
    assert!(matches!(sd.save(None), Err(SavedataError::NullRequest)));
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn existing_slot_loads_icon_into_arena() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");
    sd.fs_mut()
        .insert_file(&slot_file("A", "ICON0.PNG"), &encode_test_png(4, 2, [1, 2, 3, 4]));

    sd.set_request(Some(request(SavedataMode::Load, "A"))).unwrap();
    let slot = sd.slot(0).unwrap();
    let icon = slot.icon().unwrap();
    assert_eq!((slot.icon_width, slot.icon_height), (4, 2));
    assert_eq!(icon.size(), 4 * 2 * 4);
    assert_eq!(sd.allocator().tag_of(icon.addr()), Some("SaveData Icon"));

    let pixels = sd.memory().slice(icon.addr(), 32).unwrap();
    assert_eq!(&pixels[..4], &[1, 2, 3, 4]);
    assert_eq!(&pixels[28..32], &[1, 2, 3, 4]);
}

#[test]
fn manifest_titles_are_copied() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");
    sd.fs_mut().insert_file(
        &slot_file("A", "PARAM.SFO"),
        &sfo_bytes("Test Game", "Slot A", "Chapter 3"),
    );

    sd.set_request(Some(request(SavedataMode::Load, "A"))).unwrap();
    let slot = sd.slot(0).unwrap();
    assert_eq!(slot.title, "Test Game");
    assert_eq!(slot.save_title, "Slot A");
    assert_eq!(slot.save_detail, "Chapter 3");
}

#[test]
fn long_detail_truncates_to_title_capacity() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");
    sd.fs_mut()
        .insert_file(&slot_file("A", "PARAM.SFO"), &sfo_bytes("T", "S", &"d".repeat(600)));

    sd.set_request(Some(request(SavedataMode::Load, "A"))).unwrap();
    assert_eq!(sd.slot(0).unwrap().save_detail.len(), 128);
}

#[test]
fn metadata_is_read_from_each_candidates_own_directory() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"a");
    sd.fs_mut().insert_file(&data_path("B"), b"bb");
    sd.fs_mut()
        .insert_file(&slot_file("A", "PARAM.SFO"), &sfo_bytes("Game", "First", ""));
    sd.fs_mut()
        .insert_file(&slot_file("B", "PARAM.SFO"), &sfo_bytes("Game", "Second", ""));

    let mut req = request(SavedataMode::ListLoad, "A");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B"]);
    sd.set_request(Some(req)).unwrap();

    assert_eq!(sd.slot(0).unwrap().save_title, "First");
    assert_eq!(sd.slot(1).unwrap().save_title, "Second");
    assert_eq!(sd.slot(1).unwrap().size, 2);
}

#[test]
fn broken_icon_and_manifest_are_not_fatal() {
    let mut sd = test_session();
    sd.fs_mut().insert_file(&data_path("A"), b"data");
    sd.fs_mut().insert_file(&slot_file("A", "ICON0.PNG"), b"not a png");
    sd.fs_mut().insert_file(&slot_file("A", "PARAM.SFO"), b"\0PSF garbage");

    assert_eq!(sd.set_request(Some(request(SavedataMode::Load, "A"))).unwrap(), 1);
    let slot = sd.slot(0).unwrap();
    assert!(slot.exists);
    assert!(slot.icon().is_none());
    assert!(slot.title.is_empty());
    assert_eq!(sd.allocator().live_blocks(), 0);
}

/// Decodes any file to a 1x1 icon filled with its first byte. Files starting
/// with 0xBB claim 1x1 but return 64 bytes of pixels.
struct FirstByteDecoder;

impl IconDecoder for FirstByteDecoder {
    fn decode(&self, bytes: &[u8]) -> std::result::Result<DecodedIcon, IconDecodeError> {
        let fill = *bytes.first().ok_or(IconDecodeError::Empty)?;
        let len = if fill == 0xBB { 64 } else { 4 };
        Ok(DecodedIcon {
            width: 1,
            height: 1,
            pixels: vec![fill; len],
        })
    }
}

#[test]
fn icon_with_inconsistent_size_is_rejected() {
    let mut sd = test_session().with_decoder(FirstByteDecoder);
    for (name, fill) in [("A", 0xAA), ("B", 0xBB)] {
        sd.fs_mut().insert_file(&data_path(name), b"data");
        sd.fs_mut().insert_file(&slot_file(name, "ICON0.PNG"), &[fill]);
    }

    let mut req = request(SavedataMode::ListLoad, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B"]);
    assert_eq!(sd.set_request(Some(req)).unwrap(), 2);

    let a = sd.slot(0).unwrap().icon().unwrap();
    assert_eq!(a.size(), 4);
    assert_eq!(sd.memory().slice(a.addr(), 4).unwrap(), &[0xAA; 4]);
    assert!(sd.slot(1).unwrap().icon().is_none());
    assert_eq!(sd.allocator().live_blocks(), 1);
}

// ============================================================================
// Icon ownership
// ============================================================================

#[test]
fn rebuild_releases_previous_icons() {
    let mut sd = test_session();
    let png = encode_test_png(8, 8, [9, 9, 9, 9]);
    for name in ["A", "B"] {
        sd.fs_mut().insert_file(&data_path(name), b"data");
        sd.fs_mut().insert_file(&slot_file(name, "ICON0.PNG"), &png);
    }

    let mut req = request(SavedataMode::ListLoad, "");
    req.save_name_list = write_candidates(sd.memory_mut(), &["A", "B"]);
    sd.set_request(Some(req.clone())).unwrap();
    assert_eq!(sd.cache().icon_count(), 2);
    assert_eq!(sd.allocator().live_blocks(), 2);

    // Same parameters again: no leak, no duplication.
    sd.set_request(Some(req)).unwrap();
    assert_eq!(sd.allocator().live_blocks(), 2);

    sd.set_request(Some(request(SavedataMode::Load, "A"))).unwrap();
    assert_eq!(sd.allocator().live_blocks(), 1);

    sd.clear();
    assert_eq!(sd.allocator().live_blocks(), 0);
    assert_eq!(sd.slot_count(), 0);
}

// ============================================================================
// Paths and selection
// ============================================================================

#[test]
fn save_dir_without_list_concatenates() {
    let mut sd = test_session();
    sd.set_request(Some(request(SavedataMode::Save, "DATA00"))).unwrap();
    assert_eq!(sd.save_dir(None).unwrap(), "ULUS10000DATA00");
    assert_eq!(
        sd.save_dir_path(None).unwrap(),
        "ms0:/PSP/SAVEDATA/ULUS10000DATA00"
    );
}

#[test]
fn save_dir_with_list_uses_selected_slot() {
    let mut sd = test_session();
    let mut req = request(SavedataMode::ListSave, "IGNORED");
    req.save_name_list = write_candidates(sd.memory_mut(), &["S0", "S1"]);
    sd.set_request(Some(req)).unwrap();

    assert_eq!(sd.save_dir(Some(1)).unwrap(), "ULUS10000S1");
    assert_eq!(sd.slot_name(0).unwrap(), "S0");
    assert!(matches!(sd.save_dir(Some(5)), Err(SavedataError::InvalidSlot(5))));
}

#[test]
fn selected_save_is_tracked() {
    let mut sd = test_session();
    assert_eq!(sd.selected_save(), 0);
    sd.set_selected_save(3);
    assert_eq!(sd.selected_save(), 3);
}

#[test]
fn init_creates_root_once() {
    let mut sd = test_session();
    sd.init().unwrap();
    sd.init().unwrap();
    assert_eq!(sd.fs().mkdir_calls, 1);
    assert!(sd.fs().file_info("ms0:/PSP/SAVEDATA/").is_dir);
}
