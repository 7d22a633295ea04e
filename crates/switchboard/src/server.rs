//! Minimal serving loop.
//!
//! A convenience rendition of the serving-loop collaborator: accept,
//! parse the request head, call [`App::handle`], write the response,
//! close. One task per connection; no keep-alive, no TLS, bodies are
//! ignored (routing never matches on them). Embedders with richer
//! transport needs call [`App::handle`] from their own loop instead.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use switchboard_core::{Request, Response, StatusCode};

use crate::app::App;

/// Upper bound on an accepted request head.
const MAX_HEAD_BYTES: usize = 16 * 1024;

impl App {
    /// Bind `addr` and serve requests until the process exits.
    ///
    /// # Errors
    ///
    /// Propagates listener bind/accept failures. Per-connection I/O
    /// failures are logged and do not stop the loop.
    pub async fn serve(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        if let Ok(local) = listener.local_addr() {
            tracing::info!(%local, "server started");
        }

        let app = Arc::new(self);
        loop {
            let (stream, peer) = listener.accept().await?;
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                if let Err(error) = handle_connection(&app, stream).await {
                    tracing::debug!(%peer, %error, "connection error");
                }
            });
        }
    }
}

async fn handle_connection(app: &App, mut stream: TcpStream) -> std::io::Result<()> {
    let head = match read_head(&mut stream).await? {
        Some(head) => head,
        None => return Ok(()),
    };

    let response = match parse_request_head(&head) {
        Some(request) => match app.handle(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "dispatch failure escaped to the serving loop");
                Response::new(StatusCode::INTERNAL_SERVER_ERROR).body_text("500: server error")
            }
        },
        None => Response::new(StatusCode::BAD_REQUEST).body_text("400: bad request"),
    };

    stream.write_all(&encode_response(&response)).await?;
    stream.shutdown().await
}

/// Read up to the end of the request head (`\r\n\r\n`).
///
/// Returns `None` when the peer closes before sending a full head or
/// exceeds the head size limit.
async fn read_head(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_head_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..end]).into_owned();
            return Ok(Some(head));
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Ok(None);
        }
    }
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Parse a request line plus headers into a [`Request`].
fn parse_request_head(head: &str) -> Option<Request> {
    let mut lines = head.split("\r\n");

    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = switchboard_core::Method::parse(parts.next()?)?;
    let target = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }

    let mut request = Request::new(method, target);
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        request.headers_mut().insert(name.trim(), value.trim());
    }
    Some(request)
}

/// Encode a response as HTTP/1.1 bytes with an explicit length and a
/// closing connection.
fn encode_response(response: &Response) -> Vec<u8> {
    let mut out = Vec::with_capacity(256 + response.body().len());
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            response.status().as_u16(),
            response.status().reason()
        )
        .as_bytes(),
    );
    for (name, value) in response.headers().iter() {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(format!("content-length: {}\r\n", response.body().len()).as_bytes());
    out.extend_from_slice(b"connection: close\r\n\r\n");
    out.extend_from_slice(response.body());
    out
}
