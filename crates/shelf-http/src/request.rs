//! Request head reading and tolerant parsing.
//!
//! [`read_head`] accumulates raw socket bytes in fixed-size pulls until the
//! `\r\n\r\n` terminator appears, then splits the block into a request line
//! and a header map. Parsing is deliberately lenient: a malformed request
//! line falls back to `GET /`, header lines without a colon are ignored.
//! Bytes already read past the terminator are returned for body
//! consumption.

use std::io::{self, Read};

use log::debug;
use memchr::memmem;

use crate::fields::FieldMap;
use crate::percent::percent_decode;

/// Default pull size while reading the request head.
pub const DEFAULT_HEAD_CHUNK: usize = 1024;
/// Default pull size while reading a buffered body.
pub const DEFAULT_BODY_CHUNK: usize = 1024;
/// Default pull size while streaming an upload body.
pub const DEFAULT_UPLOAD_CHUNK: usize = 4096;

/// Socket read sizes for the three read phases.
#[derive(Debug, Clone, Copy)]
pub struct ReadConfig {
    head_chunk: usize,
    body_chunk: usize,
    upload_chunk: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            head_chunk: DEFAULT_HEAD_CHUNK,
            body_chunk: DEFAULT_BODY_CHUNK,
            upload_chunk: DEFAULT_UPLOAD_CHUNK,
        }
    }
}

impl ReadConfig {
    /// Create a config with the default pull sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the head pull size.
    #[must_use]
    pub fn with_head_chunk(mut self, size: usize) -> Self {
        self.head_chunk = size;
        self
    }

    /// Set the buffered-body pull size.
    #[must_use]
    pub fn with_body_chunk(mut self, size: usize) -> Self {
        self.body_chunk = size;
        self
    }

    /// Set the upload pull size.
    #[must_use]
    pub fn with_upload_chunk(mut self, size: usize) -> Self {
        self.upload_chunk = size;
        self
    }

    /// Head pull size in bytes.
    #[must_use]
    pub fn head_chunk(&self) -> usize {
        self.head_chunk
    }

    /// Buffered-body pull size in bytes.
    #[must_use]
    pub fn body_chunk(&self) -> usize {
        self.body_chunk
    }

    /// Upload pull size in bytes.
    #[must_use]
    pub fn upload_chunk(&self) -> usize {
        self.upload_chunk
    }
}

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Any method other than GET or POST; routed to 404.
    Other(String),
}

impl Method {
    /// Parse a method token. Unknown tokens are preserved for logging.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "POST" => Self::Post,
            other => Self::Other(other.to_string()),
        }
    }

    /// The method name as sent by the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request head.
///
/// `path` is percent-decoded once; `query` stays raw (parameter values are
/// decoded when parsed, see [`crate::parse_params`]).
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: FieldMap,
}

impl RequestHead {
    /// The declared body length.
    ///
    /// Absent → 0. Present but unparseable → 0 as well, logged at
    /// debug level; the body is then treated as empty.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        let Some(value) = self.headers.get("content-length") else {
            return 0;
        };
        match value.parse() {
            Ok(len) => len,
            Err(_) => {
                debug!("ignoring unparseable content-length {value:?}");
                0
            }
        }
    }

    /// The declared content type; absent → empty.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers.get("content-type").unwrap_or("")
    }
}

/// Read and parse one request head from the stream.
///
/// Pulls `head_chunk`-sized reads until `\r\n\r\n` is seen or the peer
/// closes. Returns `None` when the peer closed without sending anything,
/// otherwise the parsed head plus any bytes read past the terminator.
/// If the peer closes mid-head, whatever arrived is parsed leniently.
///
/// # Errors
///
/// Propagates socket read failures (including receive timeouts).
pub fn read_head<R: Read>(
    stream: &mut R,
    config: &ReadConfig,
) -> io::Result<Option<(RequestHead, Vec<u8>)>> {
    let mut data = Vec::with_capacity(config.head_chunk());
    let mut chunk = vec![0u8; config.head_chunk()];
    let mut head_end = None;

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        if let Some(pos) = memmem::find(&data, b"\r\n\r\n") {
            head_end = Some(pos);
            break;
        }
    }

    if data.is_empty() {
        return Ok(None);
    }

    let (block, leftover) = match head_end {
        Some(pos) => (&data[..pos], data[pos + 4..].to_vec()),
        None => (&data[..], Vec::new()),
    };

    let head = parse_head(block);
    debug!(
        "request: {} {} query={:?} content-length={}",
        head.method,
        head.path,
        head.query,
        head.content_length()
    );
    Ok(Some((head, leftover)))
}

fn parse_head(block: &[u8]) -> RequestHead {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.split("\r\n");

    let (method, path, query) = parse_request_line(lines.next().unwrap_or(""));

    let mut headers = FieldMap::headers();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim(), value.trim());
        }
    }

    RequestHead {
        method,
        path,
        query,
        headers,
    }
}

/// Split a request line into method, decoded path, and raw query.
///
/// Fewer than two space-separated tokens → `GET /` with no query.
fn parse_request_line(line: &str) -> (Method, String, String) {
    let mut parts = line.split(' ');
    match (parts.next(), parts.next()) {
        (Some(method), Some(target)) if !method.is_empty() => {
            let (path, query) = match target.split_once('?') {
                Some((path, query)) => (path, query),
                None => (target, ""),
            };
            (
                Method::parse(method),
                percent_decode(path).into_owned(),
                query.to_string(),
            )
        }
        _ => (Method::Get, "/".to_string(), String::new()),
    }
}
