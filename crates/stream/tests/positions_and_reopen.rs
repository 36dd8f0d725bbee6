//! Position accounting, counters, and the reopen lifecycle on real files.

use std::io::{Read, Seek, SeekFrom, Write};

use stream::{GzFile, OpenMode, StreamError};

fn read_back(path: &std::path::Path) -> Vec<u8> {
    let mut zf = GzFile::open_path(0, path, OpenMode::READ).expect("reopen for reading");
    let mut out = Vec::new();
    zf.read_to_end(&mut out).expect("read back");
    out
}

#[test]
fn write_position_advances_by_exactly_the_bytes_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("positions.gz");

    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    zf.write_all(&[b'a'; 100]).expect("first write");
    zf.write_all(&[b'b'; 200]).expect("second write");
    assert_eq!(zf.tell_write(), 300);
    assert_eq!(zf.seek(SeekFrom::Current(0)).expect("tell"), 300);
    zf.close();
    assert_eq!(zf.tell_write(), 0, "positions reset on close");
}

#[test]
fn read_position_tracks_consumed_plaintext() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("readpos.gz");

    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    zf.write_all(&vec![b'r'; 300]).expect("write");
    zf.close();

    let mut zf = GzFile::open_path(0, &path, OpenMode::READ).expect("reopen");
    let mut buf = [0u8; 50];
    zf.read_exact(&mut buf).expect("read 50");
    assert_eq!(zf.tell_read(), 50);
    assert_eq!(zf.seek(SeekFrom::Current(0)).expect("tell"), 50);
}

#[test]
fn reopen_writes_two_independent_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("first.gz");
    let second = dir.path().join("second.gz");

    let mut zf = GzFile::open_path(0, &first, OpenMode::WRITE).expect("open first");
    zf.write_all(b"first").expect("write first");
    zf.close();
    assert!(zf.is_closed());

    zf.open(&second, OpenMode::WRITE).expect("reopen second");
    assert!(zf.is_open());
    zf.write_all(b"second").expect("write second");
    zf.close();

    assert_eq!(read_back(&first), b"first");
    assert_eq!(read_back(&second), b"second");
}

#[test]
fn counters_reflect_both_sides_and_reset_on_close() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("counters.gz");

    let payload = b"counted payload ".repeat(256);
    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    zf.write_all(&payload).expect("write");
    zf.final_flush().expect("final flush");

    let stream = zf.stream();
    assert_eq!(stream.total_plain_out(), payload.len() as u64);
    assert!(stream.total_compressed_out() > 0);
    assert!(stream.total_compressed_out() < payload.len() as u64);
    zf.close();
    assert_eq!(zf.stream().total_plain_out(), 0);

    let mut zf = GzFile::open_path(0, &path, OpenMode::READ).expect("reopen");
    let mut out = Vec::new();
    zf.read_to_end(&mut out).expect("read");
    assert_eq!(out, payload);
    assert_eq!(zf.stream().total_plain_in(), payload.len() as u64);
    assert!(zf.stream().total_compressed_in() > 0);
}

#[test]
fn final_flush_latch_clears_on_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("latch.gz");

    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    zf.write_all(b"before final").expect("write");
    zf.final_flush().expect("final flush");

    let err = zf.write_all(b"after final").expect_err("write after final");
    let inner = err.get_ref().expect("structured source");
    assert!(matches!(
        inner.downcast_ref::<StreamError>(),
        Some(StreamError::WriteAfterFinal)
    ));

    zf.open(&path, OpenMode::WRITE).expect("reopen");
    zf.write_all(b"fresh stream").expect("write after reopen");
    zf.close();
    assert_eq!(read_back(&path), b"fresh stream");
}

#[test]
fn native_handle_present_while_open_on_unix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("handle.gz");

    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    if cfg!(unix) {
        assert!(zf.native_handle().is_some());
    }
    zf.close();
    assert_eq!(zf.native_handle(), None);
}

#[test]
fn close_after_close_preserves_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("idempotent.gz");

    let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE).expect("open");
    zf.write_all(b"closed twice").expect("write");
    zf.close();
    zf.close();

    assert_eq!(read_back(&path), b"closed twice");
}
