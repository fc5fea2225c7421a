use async_std::io::Write;

use crate::handler::{HandlerError, responses, stream};
use crate::http::request::Request;
use crate::http::response::ResponseWriter;

pub async fn route<W>(w: &mut ResponseWriter<W>, req: &Request) -> Result<(), HandlerError>
where
    W: Write + Unpin,
{
    let target = req.target();

    if let Some(lines) = target.strip_prefix("/stream/") {
        return match lines.parse::<usize>() {
            Ok(n) if n <= stream::MAX_LINES => stream::serve(w, n).await,
            _ => responses::bad_request(w).await,
        };
    }

    match target {
        "/yourproblem" => responses::bad_request(w).await,
        "/myproblem" => responses::internal_server_error(w).await,
        _ => responses::ok(w).await,
    }
}
