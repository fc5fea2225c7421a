//! Application logic run once per parsed request.
//!
//! The transport hands over the parsed [`Request`] together with a
//! [`ResponseWriter`] bound to the same connection, and closes the
//! connection once [`handle`] returns.

mod responses;
mod router;
mod stream;

use async_std::io::Write;
use thiserror::Error;

use crate::http::headers::HeaderError;
use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::response::{ResponseWriter, WriteError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Header(#[from] HeaderError),
}

pub async fn handle<W>(w: &mut ResponseWriter<W>, req: &Request) -> Result<(), HandlerError>
where
    W: Write + Unpin,
{
    router::route(w, req).await
}

/// Answers a request that failed to parse.
pub async fn handle_parse_error<W>(
    w: &mut ResponseWriter<W>,
    err: ParseError,
) -> Result<(), HandlerError>
where
    W: Write + Unpin,
{
    responses::parse_error(w, err).await
}
