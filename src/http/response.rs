//! Response writer enforcing HTTP/1.1 write order.
//!
//! A [`ResponseWriter`] moves through
//! `Initialized -> StatusLineWritten -> HeadersWritten -> BodyWritten`,
//! entering each state exactly once. The body is either written in one piece
//! with [`write_body`](ResponseWriter::write_body), or as a sequence of
//! chunks closed by [`write_chunked_body_done`](ResponseWriter::write_chunked_body_done)
//! and then [`write_trailers`](ResponseWriter::write_trailers).
//!
//! Every call assembles its bytes before touching the stream, so a call made
//! in the wrong state writes nothing, and a failed write leaves the state
//! where it was.

use async_std::io::Write;
use async_std::prelude::*;
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::status::StatusCode;
use crate::http::{CRLF, HTTP_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Initialized,
    StatusLineWritten,
    HeadersWritten,
    /// `trailers_allowed` is set only by the chunked path, after the
    /// terminal chunk, and cleared once the trailers are written.
    BodyWritten { trailers_allowed: bool },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot {operation} in state {state:?}")]
    OrderViolation {
        operation: &'static str,
        state: WriterState,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Baseline headers for a fixed-length response. Callers override or delete
/// entries before handing them to [`ResponseWriter::write_headers`].
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Length", &content_length.to_string());
    headers.insert("Connection", "close");
    headers.insert("Content-Type", "text/plain");
    headers
}

pub struct ResponseWriter<W> {
    stream: W,
    state: WriterState,
}

impl<W> ResponseWriter<W>
where
    W: Write + Unpin,
{
    pub fn new(stream: W) -> Self {
        Self {
            stream,
            state: WriterState::Initialized,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriterState::Initialized, "write status line")?;
        let line = format!(
            "HTTP/{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.emit(line.as_bytes(), WriterState::StatusLineWritten).await
    }

    /// Writes every header as `name: value\r\n` in insertion order, then the
    /// blank line closing the header section. Names are written as stored.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::StatusLineWritten, "write headers")?;
        let mut out = Vec::new();
        headers.write_to(&mut out);
        out.extend_from_slice(CRLF);
        self.emit(&out, WriterState::HeadersWritten).await
    }

    /// Writes a fixed-length body verbatim. Matching `Content-Length` is up
    /// to the caller. Returns the number of bytes written.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::HeadersWritten, "write body")?;
        self.emit(body, WriterState::BodyWritten { trailers_allowed: false }).await?;
        Ok(body.len())
    }

    /// Writes one `<hex-len>\r\n<bytes>\r\n` frame. May be called any number
    /// of times before [`write_chunked_body_done`](Self::write_chunked_body_done).
    /// Returns the number of payload bytes written.
    pub async fn write_chunked_body_chunk(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::HeadersWritten, "write body chunk")?;
        let mut out = Vec::with_capacity(chunk.len() + 12);
        out.extend_from_slice(format!("{:X}", chunk.len()).as_bytes());
        out.extend_from_slice(CRLF);
        out.extend_from_slice(chunk);
        out.extend_from_slice(CRLF);
        self.emit(&out, WriterState::HeadersWritten).await?;
        Ok(chunk.len())
    }

    /// Writes the terminal `0\r\n` chunk. The blank line ending the message
    /// is written by [`write_trailers`](Self::write_trailers), even when
    /// there are no trailers.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriterState::HeadersWritten, "finish chunked body")?;
        self.emit(b"0\r\n", WriterState::BodyWritten { trailers_allowed: true }).await
    }

    /// Writes trailer fields and the final blank line. Only valid after
    /// [`write_chunked_body_done`](Self::write_chunked_body_done).
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::BodyWritten { trailers_allowed: true }, "write trailers")?;
        let mut out = Vec::new();
        trailers.write_to(&mut out);
        out.extend_from_slice(CRLF);
        self.emit(&out, WriterState::BodyWritten { trailers_allowed: false }).await
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.stream.flush().await?;
        Ok(())
    }

    fn expect_state(
        &self,
        expected: WriterState,
        operation: &'static str,
    ) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::OrderViolation {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    async fn emit(&mut self, bytes: &[u8], next: WriterState) -> Result<(), WriteError> {
        self.stream.write_all(bytes).await?;
        self.state = next;
        Ok(())
    }
}
