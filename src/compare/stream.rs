// Chunked byte-for-byte stream comparison.
//
// Both streams are read in lock-step, one chunk at a time. Each chunk is
// filled completely before it is compared, so a reader that returns short
// reads (decompressors do) yields the same chunk boundaries as one that
// does not. The result is therefore plain whole-stream equality, whatever
// the chunk size.

use std::io::{self, ErrorKind, Read};

/// Chunk size used by [`compare_streams_default`].
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Largest chunk [`compare_streams`] will allocate.
pub const MAX_CHUNK_SIZE: usize = 1 << 26; // 64 MiB

/// Compare two streams with the default chunk size.
pub fn compare_streams_default<A: Read, B: Read>(a: A, b: B) -> io::Result<bool> {
    compare_streams(a, b, DEFAULT_CHUNK_SIZE)
}

/// Compare two streams chunk by chunk.
///
/// Returns `Ok(false)` as soon as two chunks differ in length or content
/// and `Ok(true)` only when both streams are exhausted at the same offset.
/// `chunk_size` is clamped to `1..=MAX_CHUNK_SIZE`.
pub fn compare_streams<A: Read, B: Read>(
    mut a: A,
    mut b: B,
    chunk_size: usize,
) -> io::Result<bool> {
    let chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let n_a = read_chunk(&mut a, &mut buf_a)?;
        let n_b = read_chunk(&mut b, &mut buf_b)?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
