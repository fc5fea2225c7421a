//! HTTP/1.1 served straight off a TCP stream.
//!
//! [`http`] holds the wire codec: an incremental request parser and a
//! response writer that enforces status line, headers, body and trailer
//! order. [`net`] accepts connections and drives one request/response
//! exchange per connection; [`handler`] decides what to answer.

pub mod config;
pub mod handler;
pub mod http;
pub mod net;
