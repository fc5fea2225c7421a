//! Chunked response whose length and digest are only known once the body
//! has been produced, so both travel as trailers.

use async_std::io::Write;
use sha2::{Digest, Sha256};

use crate::handler::HandlerError;
use crate::http::headers::Headers;
use crate::http::response::{ResponseWriter, default_headers};
use crate::http::status::StatusCode;

pub const MAX_LINES: usize = 100;

pub async fn serve<W: Write + Unpin>(
    w: &mut ResponseWriter<W>,
    lines: usize,
) -> Result<(), HandlerError> {
    let mut headers = default_headers(0);
    headers.delete("Content-Length");
    headers.set("Transfer-Encoding", "chunked")?;
    headers.set("Trailer", "X-Content-Sha256, X-Content-Length")?;

    w.write_status_line(StatusCode::OK).await?;
    w.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for i in 0..lines {
        let line = format!("line {i}\n");
        hasher.update(line.as_bytes());
        total += w.write_chunked_body_chunk(line.as_bytes()).await?;
    }
    w.write_chunked_body_done().await?;
    tracing::debug!("streamed {lines} chunks, {total} bytes");

    let mut trailers = Headers::new();
    trailers.set("X-Content-Sha256", &format!("{:x}", hasher.finalize()))?;
    trailers.set("X-Content-Length", &total.to_string())?;
    w.write_trailers(&trailers).await?;
    Ok(())
}
