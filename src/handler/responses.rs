use async_std::io::Write;

use crate::handler::HandlerError;
use crate::http::parser::ParseError;
use crate::http::response::{ResponseWriter, default_headers};
use crate::http::status::StatusCode;

const OK_HTML: &str = r#"<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Request received and understood.</p>
  </body>
</html>"#;

const BAD_REQUEST_HTML: &str = r#"<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>The server could not make sense of this request.</p>
  </body>
</html>"#;

const INTERNAL_SERVER_ERROR_HTML: &str = r#"<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Something went wrong on our side.</p>
  </body>
</html>"#;

pub async fn ok<W: Write + Unpin>(w: &mut ResponseWriter<W>) -> Result<(), HandlerError> {
    html(w, StatusCode::OK, OK_HTML).await
}

pub async fn bad_request<W: Write + Unpin>(w: &mut ResponseWriter<W>) -> Result<(), HandlerError> {
    html(w, StatusCode::BAD_REQUEST, BAD_REQUEST_HTML).await
}

pub async fn internal_server_error<W: Write + Unpin>(
    w: &mut ResponseWriter<W>,
) -> Result<(), HandlerError> {
    html(w, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_HTML).await
}

/// Plain text answer naming the parse failure.
pub async fn parse_error<W: Write + Unpin>(
    w: &mut ResponseWriter<W>,
    err: ParseError,
) -> Result<(), HandlerError> {
    let body = format!("error parsing request: {err}\n");
    w.write_status_line(err.into_http_status()).await?;
    w.write_headers(&default_headers(body.len())).await?;
    w.write_body(body.as_bytes()).await?;
    Ok(())
}

async fn html<W: Write + Unpin>(
    w: &mut ResponseWriter<W>,
    status: StatusCode,
    page: &str,
) -> Result<(), HandlerError> {
    let mut headers = default_headers(page.len());
    headers.set("Content-Type", "text/html")?;

    w.write_status_line(status).await?;
    w.write_headers(&headers).await?;
    w.write_body(page.as_bytes()).await?;
    Ok(())
}
