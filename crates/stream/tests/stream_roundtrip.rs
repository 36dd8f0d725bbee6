//! Streaming round trips through the adapter over in-memory channels.

use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

use stream::{GzStream, OpenMode};

/// Write-capturing channel: appends everything written into shared storage
/// that outlives the stream owning the channel. Reads report end of input.
#[derive(Clone, Default)]
struct CaptureBuf(Rc<RefCell<Vec<u8>>>);

impl CaptureBuf {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut self.0.borrow_mut())
    }
}

impl Read for CaptureBuf {
    fn read(&mut self, _dst: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for CaptureBuf {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(src);
        Ok(src.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(buf_size: usize, capture: &CaptureBuf) -> GzStream {
    GzStream::with_channel(
        buf_size,
        OpenMode::WRITE,
        Box::new(capture.clone()),
        None,
    )
}

fn reader(buf_size: usize, frame: Vec<u8>) -> GzStream {
    GzStream::with_channel(buf_size, OpenMode::READ, Box::new(Cursor::new(frame)), None)
}

fn jabberwocky(total: usize) -> Vec<u8> {
    let verse: &[u8] = b"'Twas brillig, and the slithy toves / \
                         Did gyre and gimble in the wabe: / \
                         All mimsy were the borogoves, / \
                         And the mome raths outgrabe.\n";
    verse.iter().copied().cycle().take(total).collect()
}

fn compress_in_chunks(payload: &[u8], chunk: usize, buf_size: usize) -> Vec<u8> {
    let capture = CaptureBuf::default();
    let mut zs = writer(buf_size, &capture);
    for piece in payload.chunks(chunk.max(1)) {
        zs.write_all(piece).expect("write chunk");
    }
    zs.close();
    CaptureBuf::take(&capture)
}

fn decompress_in_chunks(frame: Vec<u8>, chunk: usize, buf_size: usize) -> Vec<u8> {
    let mut zs = reader(buf_size, frame);
    let mut out = Vec::new();
    let mut piece = vec![0u8; chunk.max(1)];
    loop {
        let n = zs.read(&mut piece).expect("read chunk");
        if n == 0 {
            break;
        }
        out.extend_from_slice(&piece[..n]);
    }
    out
}

#[test]
fn small_payload_round_trips() {
    let payload = b"The quick brown fox jumps over the lazy dog";
    let frame = compress_in_chunks(payload, payload.len(), GzStream::DEFAULT_BUF_SIZE);
    assert_eq!(&frame[..2], &[0x1f, 0x8b]);
    let back = decompress_in_chunks(frame, 4096, GzStream::DEFAULT_BUF_SIZE);
    assert_eq!(back, payload);
}

#[test]
fn chunk_grid_reproduces_128kib_exactly() {
    let payload = jabberwocky(128 * 1024);
    for write_chunk in [1usize, 16, 129, 65536] {
        let frame = compress_in_chunks(&payload, write_chunk, GzStream::DEFAULT_BUF_SIZE);
        for read_chunk in [1usize, 16, 129, 65536] {
            let back = decompress_in_chunks(frame.clone(), read_chunk, GzStream::DEFAULT_BUF_SIZE);
            assert_eq!(
                back, payload,
                "write chunk {write_chunk}, read chunk {read_chunk}"
            );
        }
    }
}

#[test]
fn buffer_size_one_exercises_every_refill_path() {
    let payload = b"tiny buffers, many refills";
    let frame = compress_in_chunks(payload, 7, 1);
    let back = decompress_in_chunks(frame, 3, 1);
    assert_eq!(back, payload);
}

#[test]
fn single_byte_stream_produces_a_valid_frame() {
    let frame = compress_in_chunks(b"x", 1, GzStream::DEFAULT_BUF_SIZE);
    assert_eq!(codec::decompress_to_vec(&frame).expect("decode"), b"x");
}

#[test]
fn empty_write_stream_still_emits_a_decodable_frame() {
    let capture = CaptureBuf::default();
    let mut zs = writer(GzStream::DEFAULT_BUF_SIZE, &capture);
    zs.close();

    let frame = CaptureBuf::take(&capture);
    assert!(!frame.is_empty());
    assert!(codec::decompress_to_vec(&frame).expect("decode").is_empty());
}

#[test]
fn sync_commits_without_finalizing() {
    let capture = CaptureBuf::default();
    let mut zs = writer(GzStream::DEFAULT_BUF_SIZE, &capture);
    zs.write_all(b"first part").expect("write");
    zs.flush().expect("sync");
    assert!(!zs.is_final_flushed());

    zs.write_all(b" second part").expect("write continues after sync");
    zs.close();

    let back = codec::decompress_to_vec(&CaptureBuf::take(&capture)).expect("decode");
    assert_eq!(back, b"first part second part");
}

#[test]
fn dropping_the_stream_finalizes_like_close() {
    let capture = CaptureBuf::default();
    {
        let mut zs = writer(GzStream::DEFAULT_BUF_SIZE, &capture);
        zs.write_all(b"flushed by drop").expect("write");
    }
    let back = codec::decompress_to_vec(&CaptureBuf::take(&capture)).expect("decode");
    assert_eq!(back, b"flushed by drop");
}

#[test]
fn bufread_surface_exposes_decoded_bytes_zero_copy() {
    use std::io::BufRead;

    let frame = compress_in_chunks(b"peek me", 1024, GzStream::DEFAULT_BUF_SIZE);
    let mut zs = reader(GzStream::DEFAULT_BUF_SIZE, frame);

    assert_eq!(zs.peek().expect("peek"), Some(b'p'));
    assert_eq!(zs.tell_read(), 0, "peek must not consume");

    let visible = zs.fill_buf().expect("fill").to_vec();
    assert_eq!(visible, b"peek me");
    zs.consume(5);
    assert_eq!(zs.tell_read(), 5);
    assert_eq!(zs.get_byte().expect("get"), Some(b'm'));
    assert_eq!(zs.get_byte().expect("get"), Some(b'e'));
    assert_eq!(zs.get_byte().expect("get"), None);
}
