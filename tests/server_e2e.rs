//! End-to-end tests over a real TCP connection

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use spa_serve::logger::ServerEvents;
use spa_serve::{Config, Server};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SHELL: &str = "<!doctype html><title>app</title><div id=\"root\"></div>";

struct Silent;

impl ServerEvents for Silent {}

struct Running {
    dir: TempDir,
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Running {
    async fn stop(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

async fn start() -> Running {
    start_with(|_| {}).await
}

async fn start_with(tune: impl FnOnce(&mut Config)) -> Running {
    let dir = tempfile::tempdir().unwrap();
    let static_root = dir.path().join("res");
    let web_root = dir.path().join("web");
    std::fs::create_dir_all(static_root.join("js")).unwrap();
    std::fs::create_dir_all(&web_root).unwrap();
    std::fs::write(web_root.join("index.html"), SHELL).unwrap();
    std::fs::write(static_root.join("js/app.js"), "console.log('ready');\n").unwrap();
    std::fs::write(static_root.join("favicon.ico"), b"icon").unwrap();
    std::fs::write(static_root.join("clip.mp4"), vec![7u8; 4096]).unwrap();

    let mut config = Config::default();
    config.server.port = 0;
    config.paths.static_root = static_root;
    config.paths.web_root = web_root;
    tune(&mut config);

    let server = Server::bind(config, Arc::new(Silent)).unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    Running {
        dir,
        addr,
        stop,
        handle,
    }
}

/// Send one request and read until the server closes the connection
async fn request(addr: SocketAddr, method: &str, path: &str, headers: &[&str]) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    for header in headers {
        head.push_str(header);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    split_response(&raw)
}

fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head");
    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    (head, raw[split + 4..].to_vec())
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then_some(value.trim())
    })
}

#[tokio::test]
async fn favicon_is_not_found() {
    let server = start().await;
    let (head, body) = request(server.addr, "GET", "/favicon.ico", &[]).await;
    assert!(head.starts_with("HTTP/1.1 404"), "{head}");
    assert!(body.is_empty());
    server.stop().await;
}

#[tokio::test]
async fn client_route_gets_shell() {
    let server = start().await;
    let (head, body) = request(server.addr, "GET", "/settings/profile?tab=2", &[]).await;
    assert!(head.starts_with("HTTP/1.1 200"), "{head}");
    assert_eq!(header(&head, "content-type"), Some("text/html"));
    assert_eq!(body, SHELL.as_bytes());
    server.stop().await;
}

#[tokio::test]
async fn script_revalidates_to_304() {
    let server = start().await;
    let (head, body) = request(server.addr, "GET", "/js/app.js", &[]).await;
    assert!(head.starts_with("HTTP/1.1 200"), "{head}");
    assert_eq!(header(&head, "content-type"), Some("application/javascript"));
    assert_eq!(body, b"console.log('ready');\n");

    let etag = header(&head, "etag").unwrap().to_string();
    let (head, body) = request(
        server.addr,
        "GET",
        "/js/app.js",
        &[&format!("If-None-Match: {etag}")],
    )
    .await;
    assert!(head.starts_with("HTTP/1.1 304"), "{head}");
    assert!(body.is_empty());
    server.stop().await;
}

#[tokio::test]
async fn media_range_is_partial() {
    let server = start().await;
    let (head, body) = request(server.addr, "GET", "/clip.mp4", &["Range: bytes=1024-2047"]).await;
    assert!(head.starts_with("HTTP/1.1 206"), "{head}");
    assert_eq!(header(&head, "content-range"), Some("bytes 1024-2047/4096"));
    assert_eq!(header(&head, "accept-ranges"), Some("bytes"));
    assert_eq!(body.len(), 1024);
    server.stop().await;
}

#[tokio::test]
async fn head_request_has_no_body() {
    let server = start().await;
    let (head, body) = request(server.addr, "HEAD", "/", &[]).await;
    assert!(head.starts_with("HTTP/1.1 200"), "{head}");
    assert_eq!(
        header(&head, "content-length"),
        Some(SHELL.len().to_string().as_str())
    );
    assert!(body.is_empty());
    server.stop().await;
}

#[tokio::test]
async fn post_is_rejected() {
    let server = start().await;
    let (head, _) = request(server.addr, "POST", "/", &["Content-Length: 0"]).await;
    assert!(head.starts_with("HTTP/1.1 405"), "{head}");
    assert_eq!(header(&head, "allow"), Some("GET, HEAD"));
    server.stop().await;
}

#[tokio::test]
async fn slow_media_reader_outlives_header_timeout() {
    const SIZE: usize = 24 * 1024 * 1024;
    let server = start_with(|config| config.performance.header_read_timeout = 1).await;
    let movie: Vec<u8> = (0..SIZE).map(|i| (i % 253) as u8).collect();
    std::fs::write(server.dir.path().join("res/movie.mp4"), &movie).unwrap();

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(
            b"GET /movie.mp4 HTTP/1.1\r\nHost: localhost\r\nRange: bytes=0-\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();

    // Read at a pace that keeps the body streaming well past one second
    let started = Instant::now();
    let mut raw = Vec::new();
    let mut chunk = vec![0u8; 256 * 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(started.elapsed() > Duration::from_secs(1));

    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.1 206"), "{head}");
    assert_eq!(
        header(&head, "content-range"),
        Some(format!("bytes 0-{}/{SIZE}", SIZE - 1).as_str())
    );
    assert_eq!(body.len(), SIZE);
    assert!(body == movie);
    server.stop().await;
}
