use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use tracing::{info, warn};

use crate::server::api::ApiContext;

pub mod api;
pub mod routes;

/// Largest request accepted, headers and body together.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub fn run_server(bind_addr: &str, ctx: &ApiContext) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("psi optimizer listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = serve_one(&mut stream, ctx) {
                    warn!(error = %err, "request error");
                }
            }
            Err(err) => warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

/// Request line and body of one HTTP/1.1 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Byte length of the head (up to and including the blank line), once it has arrived.
fn head_len(raw: &[u8]) -> Option<usize> {
    raw.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|at| at + 4)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Split a complete request into method, path and body. None until the head is complete
/// and `Content-Length` bytes of body are present.
pub fn parse_request(raw: &[u8]) -> Option<ParsedRequest> {
    let head_end = head_len(raw)?;
    let head = String::from_utf8_lossy(&raw[..head_end]);
    let body_len = content_length(&head);
    let body = raw.get(head_end..head_end + body_len)?;

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    Some(ParsedRequest {
        method: request_line.next().unwrap_or("GET").to_string(),
        path: request_line.next().unwrap_or("/").to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<ParsedRequest>> {
    let mut raw = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk)?;
        if read == 0 {
            return Ok(None);
        }
        raw.extend_from_slice(&chunk[..read]);
        if let Some(request) = parse_request(&raw) {
            return Ok(Some(request));
        }
        if raw.len() > MAX_REQUEST_BYTES {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "request exceeds size limit",
            ));
        }
    }
}

fn serve_one(stream: &mut TcpStream, ctx: &ApiContext) -> std::io::Result<()> {
    let Some(request) = read_request(stream)? else {
        return Ok(());
    };
    let response = routes::route_request_with(ctx, &request.method, &request.path, &request.body);
    info!(
        method = %request.method,
        path = %request.path,
        status = response.status_code,
        "handled request"
    );
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()
}
