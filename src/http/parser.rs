//! Incremental HTTP/1.1 request parser.
//!
//! The parser accumulates bytes in a [`ParseBuffer`] and advances a
//! [`Request`] through `Initialized -> ParsingHeaders -> Done` as complete
//! lines become available. Chunk boundaries never affect the result: a
//! request fed one byte at a time parses identically to one fed all at once.
//!
//! [`request_from_reader`] is the read loop used by the transport. Reaching
//! end of input before the header section is complete is an error, never a
//! partial success.

use async_std::io::Read;
use async_std::prelude::*;
use thiserror::Error;

use crate::http::buffer::ParseBuffer;
use crate::http::headers::{HeaderError, find_crlf};
use crate::http::request::*;
use crate::http::status::StatusCode;
use crate::http::{CRLF, HTTP_VERSION};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid number of request line parts: expected 3, got {0}")]
    RequestLineParts(usize),
    #[error("method should only contain uppercase letters: {0:?}")]
    InvalidMethod(String),
    #[error("request target is empty")]
    EmptyTarget,
    #[error("invalid HTTP version: {0:?}")]
    InvalidVersion(String),
    #[error("request line is not valid UTF-8")]
    RequestLineNotUtf8,
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("reached end of input before request was complete")]
    Incomplete,
    #[error("parsing after request is done")]
    AlreadyDone,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Status to answer the client with, if the connection is still usable.
    pub fn into_http_status(self) -> StatusCode {
        match self {
            ParseError::Io(_) | ParseError::AlreadyDone => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseLimits {
    /// Starting size of the parse buffer. It doubles whenever it fills up.
    pub initial_buffer_size: usize,
    /// Upper bound on request line plus headers, in bytes.
    pub max_head_size: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            initial_buffer_size: 8,
            max_head_size: 8192,
        }
    }
}

pub struct RequestParser {
    buf: ParseBuffer,
    request: Request,
    head_len: usize,
    max_head_size: usize,
}

impl RequestParser {
    pub fn new(limits: &ParseLimits) -> Self {
        Self {
            buf: ParseBuffer::with_capacity(limits.initial_buffer_size),
            request: Request::new(),
            head_len: 0,
            max_head_size: limits.max_head_size,
        }
    }

    pub fn state(&self) -> RequestState {
        self.request.state
    }

    pub fn is_done(&self) -> bool {
        self.request.is_done()
    }

    /// Appends `bytes` and parses as far as the buffered data allows.
    /// Bytes that don't yet form a complete line are kept for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if self.is_done() {
            return Err(ParseError::AlreadyDone);
        }
        self.buf.extend(bytes);
        self.parse_buffered()
    }

    /// Bytes received past the end of the header section.
    pub fn remaining(&self) -> &[u8] {
        self.buf.filled()
    }

    pub fn into_request(self) -> Result<Request, ParseError> {
        if !self.is_done() {
            return Err(ParseError::Incomplete);
        }
        Ok(self.request)
    }

    fn parse_buffered(&mut self) -> Result<(), ParseError> {
        let data = self.buf.filled();
        let mut total = 0;

        while !self.request.is_done() {
            let n = parse_single(&mut self.request, &data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        self.buf.consume(total);
        self.head_len += total;

        if !self.request.is_done() && self.head_len + self.buf.len() > self.max_head_size {
            return Err(ParseError::HeadTooLarge(self.max_head_size));
        }
        Ok(())
    }
}

/// Runs one step of the state machine. Returns the number of bytes consumed;
/// zero means a complete line isn't buffered yet.
fn parse_single(req: &mut Request, data: &[u8]) -> Result<usize, ParseError> {
    match req.state {
        RequestState::Initialized => {
            let Some((line, n)) = parse_request_line(data)? else {
                return Ok(0);
            };
            req.request_line = line;
            req.state = RequestState::ParsingHeaders;
            Ok(n)
        }
        RequestState::ParsingHeaders => {
            let (n, done) = req.headers.parse_line(data)?;
            if done {
                req.state = RequestState::Done;
            }
            Ok(n)
        }
        RequestState::Done => Err(ParseError::AlreadyDone),
    }
}

/// Parses `METHOD TARGET HTTP/1.1\r\n` from the front of `data`.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end) = find_crlf(data) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&data[..end]).map_err(|_| ParseError::RequestLineNotUtf8)?;
    let parts: Vec<&str> = line.split(' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::RequestLineParts(parts.len()));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod(method.to_string()));
    }

    if target.is_empty() {
        return Err(ParseError::EmptyTarget);
    }

    match version.split_once('/') {
        Some(("HTTP", v)) if v == HTTP_VERSION => {}
        _ => return Err(ParseError::InvalidVersion(version.to_string())),
    }

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        http_version: HTTP_VERSION.to_string(),
    };
    Ok(Some((request_line, end + CRLF.len())))
}

/// Reads from `reader` until a full request head has been parsed.
///
/// Reads go straight into the parser's buffer, which doubles when full.
/// Interrupted reads are retried; any other read error is returned as is.
pub async fn request_from_reader<R>(
    reader: &mut R,
    limits: &ParseLimits,
) -> Result<Request, ParseError>
where
    R: Read + Unpin,
{
    let mut parser = RequestParser::new(limits);

    while !parser.is_done() {
        let n = match reader.read(parser.buf.spare_mut()).await {
            Ok(0) => return Err(ParseError::Incomplete),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ParseError::Io(e)),
        };
        parser.buf.commit(n);
        parser.parse_buffered()?;
    }

    parser.into_request()
}
