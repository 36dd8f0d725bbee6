//! Round-trip properties over arbitrary payloads and chunkings.

use codec::{BufferedDeflate, BufferedInflate, CodecError};
use proptest::prelude::*;

/// Compresses `input`, feeding the plaintext in chunks of `chunk` bytes and
/// draining compressed output after every chunk.
fn deflate_chunked(input: &[u8], chunk: usize) -> Result<Vec<u8>, CodecError> {
    assert!(chunk > 0);
    let mut zs = BufferedDeflate::new(BufferedDeflate::DEFAULT_BUF_SIZE);
    let mut out = Vec::new();

    for piece in input.chunks(chunk) {
        let mut rest = piece;
        while !rest.is_empty() {
            let avail = zs.plain_avail();
            let n = rest.len().min(avail.len());
            zs.plain_avail_mut()[..n].copy_from_slice(&rest[..n]);
            zs.plain_produce(avail.prefix(n));
            rest = &rest[n..];

            loop {
                zs.step(false)?;
                let span = zs.compressed_contents_span();
                if span.is_empty() {
                    break;
                }
                out.extend_from_slice(zs.compressed_contents());
                zs.compressed_consume(span);
            }
        }
    }

    loop {
        zs.step(true)?;
        let span = zs.compressed_contents_span();
        if span.is_empty() {
            break;
        }
        out.extend_from_slice(zs.compressed_contents());
        zs.compressed_consume(span);
    }

    Ok(out)
}

/// Decompresses `frame`, feeding the compressed bytes in chunks of `chunk`
/// bytes.
fn inflate_chunked(frame: &[u8], chunk: usize) -> Result<Vec<u8>, CodecError> {
    assert!(chunk > 0);
    let mut zs = BufferedInflate::new(BufferedInflate::DEFAULT_BUF_SIZE);
    let mut out = Vec::new();

    'feed: for piece in frame.chunks(chunk) {
        let mut rest = piece;
        while !rest.is_empty() {
            if zs.is_stream_end() {
                break 'feed;
            }
            let avail = zs.compressed_avail();
            let n = rest.len().min(avail.len());
            zs.compressed_avail_mut()[..n].copy_from_slice(&rest[..n]);
            zs.compressed_produce(avail.prefix(n));
            rest = &rest[n..];

            loop {
                let produced = zs.step()?;
                out.extend_from_slice(zs.plain_contents());
                zs.plain_consume_all();
                if produced == 0 {
                    break;
                }
            }
        }
    }

    if zs.is_stream_end() {
        Ok(out)
    } else {
        Err(CodecError::CorruptedInput("stream did not finish".into()))
    }
}

#[test]
fn fox_sentence_round_trips() {
    let payload = b"The quick brown fox jumps over the lazy dog";
    let frame = deflate_chunked(payload, payload.len()).expect("compress");
    let back = inflate_chunked(&frame, frame.len()).expect("decompress");
    assert_eq!(back, payload);
}

#[test]
fn chunk_size_grid_round_trips() {
    let payload: Vec<u8> = b"Beware the Jabberwock, my son! ".repeat(512);
    for write_chunk in [1usize, 16, 129, 65536] {
        let frame = deflate_chunked(&payload, write_chunk).expect("compress");
        for read_chunk in [1usize, 16, 129, 65536] {
            let back = inflate_chunked(&frame, read_chunk).expect("decompress");
            assert_eq!(
                back, payload,
                "write chunk {write_chunk}, read chunk {read_chunk}"
            );
        }
    }
}

proptest! {
    #[test]
    fn arbitrary_payloads_round_trip(
        payload in proptest::collection::vec(any::<u8>(), 0..16_384),
        write_chunk in 1usize..2048,
        read_chunk in 1usize..2048,
    ) {
        let frame = deflate_chunked(&payload, write_chunk).unwrap();
        let back = inflate_chunked(&frame, read_chunk).unwrap();
        prop_assert_eq!(back, payload);
    }

    #[test]
    fn compressed_frames_always_carry_the_gzip_magic(
        payload in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let frame = deflate_chunked(&payload, 512).unwrap();
        prop_assert!(frame.len() >= 18, "header and trailer are always present");
        prop_assert_eq!(&frame[..2], &[0x1f, 0x8b][..]);
    }
}
