//! Blocking HTTP/1.1 wire protocol for the shelf file manager.
//!
//! This crate owns everything that touches raw request and response
//! bytes: head accumulation, percent-coding, form fields, streaming
//! multipart upload decoding, and response emission. It performs no
//! filesystem work; uploads flow into a caller-supplied [`PartSink`]
//! and streamed downloads are pulled from a [`ChunkSource`].
//!
//! # Features
//!
//! - Tolerant request-head reading over arbitrary socket chunking
//! - Percent encoding/decoding and form field parsing
//! - Bounded-memory multipart decoding, safe across split markers
//! - Buffered and pull-streamed responses, always `Connection: close`
//!
//! # Example
//!
//! ```ignore
//! use shelf_http::{ReadConfig, read_head};
//!
//! let config = ReadConfig::default();
//! let Some((head, leftover)) = read_head(&mut stream, &config)? else {
//!     return Ok(());
//! };
//! println!("{} {}", head.method, head.path);
//! ```

#![deny(unsafe_code)]

mod body;
mod fields;
mod multipart;
mod percent;
mod request;
mod response;

pub use body::read_body;
pub use fields::{FieldMap, parse_params};
pub use multipart::{
    PartSink, UploadDecoder, UploadError, UploadState, drive_upload, parse_boundary, part_filename,
};
pub use percent::{percent_decode, percent_encode};
pub use request::{
    DEFAULT_BODY_CHUNK, DEFAULT_HEAD_CHUNK, DEFAULT_UPLOAD_CHUNK, Method, ReadConfig, RequestHead,
    read_head,
};
pub use response::{Body, ChunkSource, ReadChunks, Response, ResponseWriter, Status};
