//! Streaming `multipart/form-data` upload decoding.
//!
//! The decoder is a state machine over a working buffer. It never holds a
//! whole file in memory: classified bytes go straight to a [`PartSink`]
//! and, when no boundary marker is found, only a marker-sized tail is
//! retained so a marker split across two socket reads is never missed.
//!
//! [`UploadDecoder`] is I/O-free (it consumes byte slices), which keeps
//! its behavior independent of how TCP happens to chunk the body.
//! [`drive_upload`] layers the socket pull loop on top: fixed-size reads
//! tracked against the declared content length, with a receive timeout
//! aborting the upload quietly.

use std::io::{self, Read};

use log::{debug, warn};
use memchr::memmem;

use crate::request::ReadConfig;

/// Longest boundary token accepted, per RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// Errors raised before or while decoding an upload body.
#[derive(Debug)]
pub enum UploadError {
    /// The request Content-Type is not `multipart/form-data`.
    InvalidContentType,
    /// The Content-Type carries no `boundary` parameter.
    MissingBoundary,
    /// The boundary token is empty or longer than 70 bytes.
    InvalidBoundary,
    /// A sink or socket failure mid-upload.
    Io(io::Error),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidContentType => write!(f, "content type is not multipart/form-data"),
            Self::MissingBoundary => write!(f, "missing boundary in multipart content type"),
            Self::InvalidBoundary => write!(f, "invalid multipart boundary"),
            Self::Io(err) => write!(f, "upload I/O error: {err}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for UploadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl UploadError {
    /// True for errors detected before any body byte is consumed; these
    /// are answered with 400 rather than 500.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Extract the boundary token from a Content-Type header value.
///
/// Format: `multipart/form-data; boundary=----WebKitFormBoundary...`.
/// Quotes around the token are trimmed; the token must be 1–70 bytes.
///
/// # Errors
///
/// [`UploadError::InvalidContentType`] when the media type is wrong,
/// [`UploadError::MissingBoundary`] when no boundary parameter exists,
/// [`UploadError::InvalidBoundary`] when the token is empty or too long.
pub fn parse_boundary(content_type: &str) -> Result<String, UploadError> {
    let content_type = content_type.trim();
    let main = content_type.split(';').next().unwrap_or("").trim();
    if !main.eq_ignore_ascii_case("multipart/form-data") {
        return Err(UploadError::InvalidContentType);
    }

    for param in content_type.split(';').skip(1) {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let boundary = value.trim().trim_matches('"').trim_matches('\'');
            if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
                return Err(UploadError::InvalidBoundary);
            }
            return Ok(boundary.to_string());
        }
    }

    Err(UploadError::MissingBoundary)
}

/// Extract the filename from a part's header block.
///
/// Scans for the `Content-Disposition` line and its `filename="..."`
/// parameter. Any `/` or `\` in the name is stripped so a hostile
/// filename cannot escape the target directory.
#[must_use]
pub fn part_filename(header_text: &str) -> Option<String> {
    // Byte-wise prefix match: the line is client text and may hold
    // multi-byte characters at any offset.
    let disposition = header_text.split("\r\n").find(|line| {
        line.as_bytes()
            .get(..20)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"content-disposition:"))
    })?;
    let after = disposition.split_once("filename=\"")?.1;
    let name = after.split('"').next().unwrap_or("");
    let name: String = name.chars().filter(|c| *c != '/' && *c != '\\').collect();
    if name.is_empty() { None } else { Some(name) }
}

/// Receives the decoded file parts, one open/write*/close cycle each.
pub trait PartSink {
    /// Begin a new output stream for `filename`.
    fn open_part(&mut self, filename: &str) -> io::Result<()>;
    /// Append decoded bytes to the open stream.
    fn write_part(&mut self, data: &[u8]) -> io::Result<()>;
    /// Flush and close the open stream.
    fn close_part(&mut self) -> io::Result<()>;
}

/// Decoder position within the multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Looking for the first `--<boundary>`.
    SearchingStartBoundary,
    /// Accumulating a part's header block up to the blank line.
    ParsingHeaders,
    /// Streaming file bytes to the sink until the next marker.
    WritingFile,
    /// Discarding a non-file part until the next marker.
    SkippingPart,
    /// End marker seen; all further input is ignored.
    Done,
}

/// Bounded-memory streaming decoder for one upload body.
#[derive(Debug)]
pub struct UploadDecoder {
    start_marker: Vec<u8>,
    crlf_marker: Vec<u8>,
    state: UploadState,
    buffer: Vec<u8>,
    stream_open: bool,
}

impl UploadDecoder {
    /// Create a decoder for the given boundary token.
    #[must_use]
    pub fn new(boundary: &str) -> Self {
        let mut start_marker = Vec::with_capacity(boundary.len() + 2);
        start_marker.extend_from_slice(b"--");
        start_marker.extend_from_slice(boundary.as_bytes());
        let mut crlf_marker = Vec::with_capacity(start_marker.len() + 2);
        crlf_marker.extend_from_slice(b"\r\n");
        crlf_marker.extend_from_slice(&start_marker);
        Self {
            start_marker,
            crlf_marker,
            state: UploadState::SearchingStartBoundary,
            buffer: Vec::new(),
            stream_open: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// True once the end marker has been consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == UploadState::Done
    }

    /// Feed one chunk of body bytes, advancing the state machine as far
    /// as the data allows. Input after the end marker is ignored.
    ///
    /// # Errors
    ///
    /// Propagates sink failures; a failed `open_part` leaves no stream
    /// open.
    pub fn feed<S: PartSink>(&mut self, chunk: &[u8], sink: &mut S) -> io::Result<()> {
        if self.is_done() {
            return Ok(());
        }
        self.buffer.extend_from_slice(chunk);
        self.run(sink)
    }

    /// Flush the remaining buffer into a still-open stream and close it.
    ///
    /// Called when input ends without an end marker (truncated body or
    /// receive timeout): whatever was buffered belongs to the open file.
    ///
    /// # Errors
    ///
    /// Propagates sink failures; the stream counts as closed either way.
    pub fn finish<S: PartSink>(&mut self, sink: &mut S) -> io::Result<()> {
        if self.stream_open {
            self.stream_open = false;
            if !self.buffer.is_empty() {
                sink.write_part(&self.buffer)?;
            }
            sink.close_part()?;
        }
        self.buffer.clear();
        Ok(())
    }

    fn run<S: PartSink>(&mut self, sink: &mut S) -> io::Result<()> {
        loop {
            match self.state {
                UploadState::SearchingStartBoundary => {
                    if let Some(pos) = memmem::find(&self.buffer, &self.start_marker) {
                        self.buffer.drain(..pos + self.start_marker.len());
                        self.state = UploadState::ParsingHeaders;
                    } else {
                        // Retain a marker-sized tail to catch a split marker.
                        let keep = self.start_marker.len();
                        if self.buffer.len() > keep {
                            let drain_to = self.buffer.len() - keep;
                            self.buffer.drain(..drain_to);
                        }
                        return Ok(());
                    }
                }
                UploadState::ParsingHeaders => {
                    let Some(pos) = memmem::find(&self.buffer, b"\r\n\r\n") else {
                        return Ok(());
                    };
                    let text = String::from_utf8_lossy(&self.buffer[..pos]).into_owned();
                    self.buffer.drain(..pos + 4);
                    match part_filename(&text) {
                        Some(filename) => {
                            debug!("upload part: {filename}");
                            sink.open_part(&filename)?;
                            self.stream_open = true;
                            self.state = UploadState::WritingFile;
                        }
                        None => self.state = UploadState::SkippingPart,
                    }
                }
                UploadState::WritingFile | UploadState::SkippingPart => {
                    let writing = self.state == UploadState::WritingFile;
                    match memmem::find(&self.buffer, &self.crlf_marker) {
                        Some(pos) => {
                            let marker_end = pos + self.crlf_marker.len();
                            if marker_end + 2 > self.buffer.len() {
                                // Marker found but the next-vs-end decision
                                // needs two more bytes; hold the marker.
                                if writing && pos > 0 {
                                    sink.write_part(&self.buffer[..pos])?;
                                }
                                self.buffer.drain(..pos);
                                return Ok(());
                            }
                            if writing {
                                if pos > 0 {
                                    sink.write_part(&self.buffer[..pos])?;
                                }
                                self.stream_open = false;
                                sink.close_part()?;
                            }
                            if &self.buffer[marker_end..marker_end + 2] == b"--" {
                                self.buffer.drain(..marker_end + 2);
                                self.state = UploadState::Done;
                                return Ok(());
                            }
                            self.buffer.drain(..marker_end);
                            self.state = UploadState::ParsingHeaders;
                        }
                        None => {
                            // Write or discard everything except a tail
                            // long enough to hold a split end marker.
                            let keep = self.crlf_marker.len() + 2;
                            if self.buffer.len() > keep {
                                let flush = self.buffer.len() - keep;
                                if writing {
                                    sink.write_part(&self.buffer[..flush])?;
                                }
                                self.buffer.drain(..flush);
                            }
                            return Ok(());
                        }
                    }
                }
                UploadState::Done => return Ok(()),
            }
        }
    }
}

/// Decode an upload body straight off the socket.
///
/// Starts from the leftover bytes already read past the head terminator,
/// then pulls `upload_chunk`-sized reads while the decoder wants more and
/// fewer than `content_length` body bytes have been seen. A receive
/// timeout aborts the upload quietly; any still-open output stream is
/// flushed and closed on every exit path.
///
/// # Errors
///
/// Propagates sink failures and non-timeout socket failures.
pub fn drive_upload<R: Read, S: PartSink>(
    stream: &mut R,
    leftover: &[u8],
    content_length: u64,
    decoder: &mut UploadDecoder,
    sink: &mut S,
    config: &ReadConfig,
) -> Result<(), UploadError> {
    let mut bytes_read = leftover.len() as u64;
    decoder.feed(leftover, sink)?;

    let mut chunk = vec![0u8; config.upload_chunk()];
    while !decoder.is_done() && bytes_read < content_length {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(err) if is_timeout(&err) => {
                warn!("receive timeout mid-upload, aborting");
                break;
            }
            Err(err) => {
                // Close the open stream best-effort; the read failure
                // is the one to report.
                if let Err(close_err) = decoder.finish(sink) {
                    warn!("upload stream not closed cleanly: {close_err}");
                }
                return Err(err.into());
            }
        };
        if n == 0 {
            break;
        }
        bytes_read = bytes_read.saturating_add(n as u64);
        decoder.feed(&chunk[..n], sink)?;
    }

    decoder.finish(sink)?;
    Ok(())
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
