use async_std::net::{Shutdown, SocketAddr, TcpStream};
use async_std::prelude::*;
use async_std::task;

use rawhttp::config::ServerConfig;
use rawhttp::net::server::Server;

async fn start() -> SocketAddr {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    task::spawn(server.run());
    addr
}

async fn exchange(addr: SocketAddr, parts: &[&[u8]], close_write: bool) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for part in parts {
        stream.write_all(part).await.unwrap();
        task::sleep(std::time::Duration::from_millis(5)).await;
    }
    if close_write {
        stream.shutdown(Shutdown::Write).unwrap();
    }
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

#[async_std::test]
async fn serves_request_split_across_writes() {
    let addr = start().await;
    let parts: &[&[u8]] = &[b"GET /your", b"problem HTTP/1.1\r\nHo", b"st: x\r\n\r\n"];
    let res = exchange(addr, parts, false).await;

    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(res.contains("\r\nConnection: close\r\n"));
    assert!(res.ends_with("</html>"));
}

#[async_std::test]
async fn streams_chunked_body() {
    let addr = start().await;
    let res = exchange(addr, &[b"GET /stream/3 HTTP/1.1\r\nHost: x\r\n\r\n"], false).await;

    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"));
    let (head, _) = res.split_once("\r\n\r\n").unwrap();
    assert!(!head.contains("\r\nContent-Length:"));
    assert!(res.contains("\r\n7\r\nline 2\n\r\n0\r\nX-Content-Sha256: "));
    assert!(res.ends_with("X-Content-Length: 21\r\n\r\n"));
}

#[async_std::test]
async fn lowercase_method_is_answered_with_400() {
    let addr = start().await;
    let res = exchange(addr, &[b"get / HTTP/1.1\r\n\r\n"], false).await;

    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(res.ends_with(
        "error parsing request: method should only contain uppercase letters: \"get\"\n"
    ));
}

#[async_std::test]
async fn early_close_is_an_incomplete_request() {
    let addr = start().await;
    let res = exchange(addr, &[b"GET / HTTP/1.1\r\nHost: x\r\n"], true).await;

    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(res.ends_with(
        "error parsing request: reached end of input before request was complete\n"
    ));
}
