//! Local HTTP callback used to talk to the browser wallet page.
//!
//! Binds `127.0.0.1:0`, opens the wallet page with a `callback` URL and waits
//! for a single JSON POST to `/callback`. CORS preflights are answered so the
//! page can post from its own origin.

use std::net::SocketAddr;
use std::time::Duration;

use futures_lite::io::{AsyncReadExt, AsyncWriteExt};
use serde_json::Value;
use smol::channel::{RecvError, Sender};
use smol::net::{TcpListener, TcpStream};
use smol::Task;

const MAX_REQUEST_BYTES: usize = 64 * 1024;
const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) struct CallbackRequest<'a> {
    pub page_url: &'a str,
    pub action: &'static str,
    pub params: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

/// Open the wallet page for `request.action` and wait for its reply.
/// A reply carrying an `error` string is returned as `Err`.
pub(super) async fn run_callback_flow(request: CallbackRequest<'_>) -> Result<Value, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| format!("Failed to bind: {e}"))?;
    let port = listener
        .local_addr()
        .map_err(|e| format!("Failed to get addr: {e}"))?
        .port();
    log::info!("[Wallet] {} callback server on port {}", request.action, port);

    let callback_url = format!("http://127.0.0.1:{port}/callback");
    let page_url = build_page_url(&request, &callback_url);
    log::info!("[Wallet] Opening browser to: {}", page_url);
    open::that(&page_url).map_err(|e| format!("Failed to open browser: {e}"))?;

    let action = request.action;
    let timeout = request.timeout;
    smol::future::race(handle_callback(listener), async move {
        smol::Timer::after(timeout).await;
        Err(format!(
            "Wallet {action} timed out after {}s",
            timeout.as_secs()
        ))
    })
    .await
}

fn build_page_url(request: &CallbackRequest<'_>, callback_url: &str) -> String {
    let mut url = format!(
        "{}?action={}&callback={}",
        request.page_url,
        urlencoding::encode(request.action),
        urlencoding::encode(callback_url)
    );
    for (key, value) in &request.params {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

enum Incoming {
    Connection(std::io::Result<(TcpStream, SocketAddr)>),
    Reply(Result<Result<Value, String>, RecvError>),
}

/// Accept connections until one of them delivers the wallet's reply.
///
/// Every connection is served in its own task with a read deadline, so an
/// idle preconnect or a stray request never holds up the real callback.
/// Connection tasks still running when the reply arrives are cancelled.
async fn handle_callback(listener: TcpListener) -> Result<Value, String> {
    let (reply_tx, reply_rx) = smol::channel::bounded(1);
    let mut connections: Vec<Task<()>> = Vec::new();

    loop {
        let next = smol::future::or(
            async { Incoming::Connection(listener.accept().await) },
            async { Incoming::Reply(reply_rx.recv().await) },
        )
        .await;

        match next {
            Incoming::Reply(Ok(reply)) => return reply,
            Incoming::Reply(Err(_)) => return Err("Callback channel closed".to_string()),
            Incoming::Connection(Ok((stream, _))) => {
                connections.retain(|task| !task.is_finished());
                connections.push(smol::spawn(serve_connection(stream, reply_tx.clone())));
            }
            Incoming::Connection(Err(e)) => {
                log::warn!("[Wallet] Callback accept failed: {}", e);
            }
        }
    }
}

async fn serve_connection(mut stream: TcpStream, replies: Sender<Result<Value, String>>) {
    let read = smol::future::or(async { read_request(&mut stream).await.map(Some) }, async {
        smol::Timer::after(CONNECTION_READ_TIMEOUT).await;
        Ok(None)
    })
    .await;

    let request = match read {
        Ok(Some(request)) => request,
        Ok(None) => {
            log::debug!("[Wallet] Dropping idle callback connection");
            return;
        }
        Err(e) => {
            log::debug!("[Wallet] Dropping callback connection: {}", e);
            return;
        }
    };
    log::debug!(
        "[Wallet] Received callback: {}",
        request.lines().next().unwrap_or("")
    );

    if request.starts_with("OPTIONS") {
        let _ = stream.write_all(build_cors_preflight().as_bytes()).await;
        return;
    }

    if !request.starts_with("POST /callback") {
        let response = "HTTP/1.1 404 Not Found\r\nConnection: close\r\nContent-Length: 0\r\n\r\n";
        let _ = stream.write_all(response.as_bytes()).await;
        return;
    }

    let reply = match parse_callback(&request) {
        Some(body) => {
            let _ = stream.write_all(build_json_response(true).as_bytes()).await;
            match body.get("error").and_then(Value::as_str) {
                Some(err) => Err(err.to_string()),
                None => Ok(body),
            }
        }
        None => {
            log::error!("[Wallet] Failed to parse callback body");
            let _ = stream.write_all(build_json_response(false).as_bytes()).await;
            Err("Invalid wallet callback".to_string())
        }
    };
    let _ = replies.send(reply).await;
}

async fn read_request(stream: &mut TcpStream) -> Result<String, String> {
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| format!("Read failed: {e}"))?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if request_complete(&buffer) || buffer.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

/// True once the headers and the declared `Content-Length` bytes are in.
/// Offsets are taken on the raw bytes; headers are only decoded to read values.
fn request_complete(buffer: &[u8]) -> bool {
    let Some(header_end) = header_end(buffer) else {
        return false;
    };
    let content_length = String::from_utf8_lossy(&buffer[..header_end])
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buffer.len() >= header_end + 4 + content_length
}

fn parse_callback(request: &str) -> Option<Value> {
    let first_line = request.lines().next()?;
    if !first_line.starts_with("POST /callback") {
        return None;
    }

    let body = if let Some(body_start) = request.find("\r\n\r\n") {
        &request[body_start + 4..]
    } else {
        let body_start = request.find("\n\n")?;
        &request[body_start + 2..]
    };
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    value.is_object().then_some(value)
}

fn build_cors_preflight() -> String {
    "HTTP/1.1 204 No Content\r\n\
     Access-Control-Allow-Origin: *\r\n\
     Access-Control-Allow-Methods: POST, OPTIONS\r\n\
     Access-Control-Allow-Headers: Content-Type\r\n\
     Access-Control-Max-Age: 86400\r\n\
     Connection: close\r\n\r\n"
        .to_string()
}

fn build_json_response(success: bool) -> String {
    let body = if success {
        r#"{"ok":true}"#
    } else {
        r#"{"ok":false}"#
    };

    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}
