//! Buffered reading of non-upload request bodies.
//!
//! Form submissions are small, so they are read fully into memory: the
//! leftover bytes from the head read come first, then fixed-size socket
//! pulls until the declared `Content-Length` is reached or the peer
//! closes. Upload bodies never come through here; they stream through
//! [`crate::multipart`].

use std::io::{self, Read};

use crate::request::ReadConfig;

/// Read the remainder of a declared-length body into memory.
///
/// `leftover` holds bytes already pulled past the head terminator. If it
/// already covers `content_length`, no socket read is issued at all. An
/// early peer close returns the bytes received so far.
///
/// # Errors
///
/// Propagates socket read failures.
pub fn read_body<R: Read>(
    stream: &mut R,
    leftover: Vec<u8>,
    content_length: u64,
    config: &ReadConfig,
) -> io::Result<Vec<u8>> {
    let mut body = leftover;
    let mut chunk = vec![0u8; config.body_chunk()];

    while (body.len() as u64) < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(body)
}
