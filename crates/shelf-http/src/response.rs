//! HTTP response emission.
//!
//! Responses are either fully buffered or pull-streamed from a
//! [`ChunkSource`]. Every response carries `Connection: close`; the
//! connection is single-use and the close delimits bodies whose length
//! is unknown up front, so chunked transfer encoding is never emitted.

use std::io::{self, Read, Write};

/// The status codes this server sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    SeeOther,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    /// Numeric status code.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::SeeOther => 303,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }

    /// Canonical reason phrase.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::SeeOther => "See Other",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// Pull-based byte source for streamed bodies.
///
/// `next_chunk` returns `Ok(None)` at end of stream. The writer pulls
/// one chunk at a time so a large file is never buffered whole.
pub trait ChunkSource {
    /// Pull the next chunk, or `None` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the underlying read error; the writer abandons the
    /// response mid-body, which the peer observes as a short close.
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Adapts any [`Read`] into a [`ChunkSource`] with a fixed pull size.
pub struct ReadChunks<R> {
    reader: R,
    chunk: usize,
}

impl<R: Read> ReadChunks<R> {
    /// Wrap `reader`, pulling `chunk` bytes at a time.
    pub fn new(reader: R, chunk: usize) -> Self {
        Self { reader, chunk }
    }
}

impl<R: Read> ChunkSource for ReadChunks<R> {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.chunk];
        let n = self.reader.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }
}

/// Response payload.
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    /// Streamed payload; `len` is declared as Content-Length when known
    /// and omitted otherwise.
    Stream {
        len: Option<u64>,
        source: Box<dyn ChunkSource>,
    },
}

/// An outgoing response.
pub struct Response {
    status: Status,
    content_type: Option<String>,
    location: Option<String>,
    body: Body,
}

impl Response {
    /// A 200 page.
    #[must_use]
    pub fn html(body: String) -> Self {
        Self {
            status: Status::Ok,
            content_type: Some("text/html".to_string()),
            location: None,
            body: Body::Bytes(body.into_bytes()),
        }
    }

    /// A 303 redirect with an empty body.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        Self {
            status: Status::SeeOther,
            content_type: None,
            location: Some(location.to_string()),
            body: Body::Empty,
        }
    }

    /// The 404 page.
    #[must_use]
    pub fn not_found() -> Self {
        Self::error_page(Status::NotFound, "404 - Page Not Found")
    }

    /// A 400 response carrying `message` as its page.
    #[must_use]
    pub fn bad_request(message: &str) -> Self {
        Self::error_page(Status::BadRequest, message)
    }

    /// A 500 response carrying `message` as its page.
    #[must_use]
    pub fn server_error(message: &str) -> Self {
        Self::error_page(Status::InternalServerError, message)
    }

    /// A 200 response streamed from `source`.
    #[must_use]
    pub fn stream(content_type: &str, len: Option<u64>, source: Box<dyn ChunkSource>) -> Self {
        Self {
            status: Status::Ok,
            content_type: Some(content_type.to_string()),
            location: None,
            body: Body::Stream { len, source },
        }
    }

    fn error_page(status: Status, message: &str) -> Self {
        Self {
            status,
            content_type: Some("text/html".to_string()),
            location: None,
            body: Body::Bytes(format!("<h1>{message}</h1>").into_bytes()),
        }
    }

    /// Status this response carries.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }
}

/// Serializes responses onto a connection, reusing one head buffer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
}

impl ResponseWriter {
    /// Create a new response writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Write the head and body of `response` to `stream` and flush.
    ///
    /// Buffered bodies go out in one write after the head; streamed
    /// bodies are pulled chunk by chunk.
    ///
    /// # Errors
    ///
    /// Propagates write failures; the connection is unusable afterwards.
    pub fn write_to<W: Write>(&mut self, stream: &mut W, response: Response) -> io::Result<()> {
        let Response {
            status,
            content_type,
            location,
            body,
        } = response;

        self.buffer.clear();

        // Status line
        self.buffer.extend_from_slice(b"HTTP/1.1 ");
        self.buffer
            .extend_from_slice(status.code().to_string().as_bytes());
        self.buffer.push(b' ');
        self.buffer.extend_from_slice(status.reason().as_bytes());
        self.buffer.extend_from_slice(b"\r\n");

        if let Some(value) = &content_type {
            self.buffer.extend_from_slice(b"Content-Type: ");
            self.buffer.extend_from_slice(value.as_bytes());
            self.buffer.extend_from_slice(b"\r\n");
        }
        if let Some(value) = &location {
            self.buffer.extend_from_slice(b"Location: ");
            self.buffer.extend_from_slice(value.as_bytes());
            self.buffer.extend_from_slice(b"\r\n");
        }

        // Content-Length, omitted when a streamed length is unknown.
        if let Some(len) = declared_len(&body) {
            self.buffer.extend_from_slice(b"Content-Length: ");
            self.buffer.extend_from_slice(len.to_string().as_bytes());
            self.buffer.extend_from_slice(b"\r\n");
        }

        self.buffer.extend_from_slice(b"Connection: close\r\n\r\n");
        stream.write_all(&self.buffer)?;

        match body {
            Body::Empty => {}
            Body::Bytes(bytes) => stream.write_all(&bytes)?,
            Body::Stream { mut source, .. } => {
                while let Some(chunk) = source.next_chunk()? {
                    stream.write_all(&chunk)?;
                }
            }
        }

        stream.flush()
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn declared_len(body: &Body) -> Option<u64> {
    match body {
        Body::Empty => Some(0),
        Body::Bytes(bytes) => Some(bytes.len() as u64),
        Body::Stream { len, .. } => *len,
    }
}
