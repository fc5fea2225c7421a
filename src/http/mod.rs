//! HTTP/1.1 wire codec.
//!
//! - [`headers`]: header collection and header line parsing
//! - [`parser`]: incremental request parser and its read loop
//! - [`response`]: order-enforcing response writer
//!
//! Nothing in here logs. Every failure is returned to the caller, which
//! decides whether to answer the client or drop the connection.

pub mod buffer;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// The only protocol version spoken on either side of the exchange.
pub const HTTP_VERSION: &str = "1.1";
