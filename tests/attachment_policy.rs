use std::fs;

use jobmail::mail::{MAX_ATTACHMENT_SIZE, load_attachment};

#[test]
fn small_attachment_is_loaded_with_guessed_mime_type() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("resume.pdf");
    fs::write(&path, b"%PDF-1.4 fake resume").expect("write attachment");

    let attachment = load_attachment(&path).expect("attachment should load");
    assert_eq!(attachment.filename, "resume.pdf");
    assert_eq!(attachment.mime_type, "application/pdf");
    assert_eq!(attachment.data, b"%PDF-1.4 fake resume");
}

#[test]
fn unknown_extension_defaults_to_octet_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("resume.zzz9");
    fs::write(&path, b"opaque").expect("write attachment");

    let attachment = load_attachment(&path).expect("attachment should load");
    assert_eq!(attachment.mime_type, "application/octet-stream");
}

#[test]
fn missing_file_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_attachment(&dir.path().join("nope.pdf")).is_none());
}

#[test]
fn attachment_at_the_ceiling_is_kept() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("exactly.pdf");
    fs::write(&path, vec![0_u8; MAX_ATTACHMENT_SIZE as usize]).expect("write attachment");

    assert!(load_attachment(&path).is_some());
}

#[test]
fn attachment_one_byte_over_the_ceiling_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("oversized.pdf");
    fs::write(&path, vec![0_u8; MAX_ATTACHMENT_SIZE as usize + 1]).expect("write attachment");

    assert!(load_attachment(&path).is_none());
}
