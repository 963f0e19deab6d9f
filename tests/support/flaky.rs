//! Raw TCP stand-in that breaks the first few connections.
//!
//! wiremock always sends complete responses, so dropped connections and
//! truncated bodies need a hand-driven socket.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How a failing connection misbehaves.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Read the request, then close without answering.
    CloseWithoutResponse,
    /// Answer 200 with a `Content-Length` past the bytes actually sent.
    TruncateBody,
}

/// Handle to a running flaky server.
pub struct FlakyServer {
    /// Base URL, without trailing slash.
    pub url: String,
    hits: Arc<AtomicUsize>,
    watched_present: Arc<AtomicUsize>,
}

impl FlakyServer {
    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Requests that arrived while the watched path existed.
    pub fn watched_present(&self) -> usize {
        self.watched_present.load(Ordering::SeqCst)
    }
}

/// Starts a server whose first `failures` connections hit `fault`; every
/// later request gets `status` with `body`.
///
/// When `watch` is set, each request records whether that path exists at the
/// moment it arrives.
pub async fn start_flaky_server(
    fault: Fault,
    failures: usize,
    status: u16,
    body: &'static [u8],
    watch: Option<PathBuf>,
) -> FlakyServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let watched_present = Arc::new(AtomicUsize::new(0));

    let server_hits = Arc::clone(&hits);
    let server_watched = Arc::clone(&watched_present);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            if read_request(&mut stream).await.is_err() {
                continue;
            }
            if watch.as_ref().is_some_and(|path| path.exists()) {
                server_watched.fetch_add(1, Ordering::SeqCst);
            }
            let hit = server_hits.fetch_add(1, Ordering::SeqCst);
            if hit < failures {
                misbehave(&mut stream, fault, body).await;
            } else {
                let _ = respond(&mut stream, status, body).await;
            }
        }
    });

    FlakyServer {
        url,
        hits,
        watched_present,
    }
}

/// Reads headers and any `Content-Length` body so the client finishes sending.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut received = buffer.len() - header_end;
    while received < content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        received += read;
    }
    Ok(())
}

async fn misbehave(stream: &mut TcpStream, fault: Fault, body: &[u8]) {
    match fault {
        Fault::CloseWithoutResponse => {}
        Fault::TruncateBody => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len() + 100
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body[..body.len().min(3)]).await;
            let _ = stream.flush().await;
        }
    }
    let _ = stream.shutdown().await;
}

async fn respond(stream: &mut TcpStream, status: u16, body: &[u8]) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await?;
    stream.shutdown().await
}
