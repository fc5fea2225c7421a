//! TCP transport around the HTTP codec.
//!
//! This module only deals with connections:
//! - accepting TCP connections, one task per connection,
//! - enforcing read and write deadlines,
//! - closing the connection once the exchange is over.
//!
//! Parsing and response framing live in [`http`](crate::http), and what to
//! answer is decided by [`handler`](crate::handler).
//!
//! ## Connection lifecycle
//!
//! 1. Accept a TCP connection
//! 2. Read and incrementally parse the request head
//!    (delegated to [`request_from_reader`])
//! 3. On a parse failure, answer with a client error and stop
//! 4. Otherwise hand the request and a [`ResponseWriter`] to
//!    [`handler::handle`]
//! 5. Flush and shut the connection down
//!
//! Exactly one request is served per connection.

use async_std::future::timeout;
use async_std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use async_std::task;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::handler;
use crate::http::parser::{ParseError, request_from_reader};
use crate::http::response::ResponseWriter;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener to the configured address and port.
    pub async fn bind(config: ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.address, config.port)).await?;
        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, spawning a task for each client.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!("accepting connection failed: {err}");
                    continue;
                }
            };
            tracing::debug!("accepted connection from {peer}");
            task::spawn(Self::handle_client(stream, peer, Arc::clone(&self.config)));
        }
    }

    async fn handle_client(mut stream: TcpStream, peer: SocketAddr, config: Arc<ServerConfig>) {
        let limits = config.parse_limits();
        let read = request_from_reader(&mut stream, &limits);
        let parsed = match timeout(config.read_timeout, read).await {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("{peer}: timed out reading request");
                return;
            }
        };

        let mut writer = ResponseWriter::new(stream);
        let outcome = match parsed {
            Ok(request) => {
                tracing::info!("{peer}: {} {}", request.method(), request.target());
                timeout(config.write_timeout, handler::handle(&mut writer, &request)).await
            }
            Err(ParseError::Io(err)) => {
                tracing::warn!("{peer}: I/O error while reading request: {err}");
                return;
            }
            Err(err) => {
                tracing::info!("{peer}: bad request: {err}");
                timeout(config.write_timeout, handler::handle_parse_error(&mut writer, err)).await
            }
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("{peer}: failed writing response: {err}"),
            Err(_) => tracing::warn!("{peer}: timed out writing response"),
        }

        if let Err(err) = writer.flush().await {
            tracing::debug!("{peer}: flush failed: {err}");
        }
        if let Err(err) = writer.into_inner().shutdown(Shutdown::Write) {
            tracing::debug!("{peer}: shutdown failed: {err}");
        }
    }
}
