//! Minimal HTTP/1.1 front end that feeds requests to a [`Dispatcher`].
//!
//! One request per connection; the response always carries
//! `connection: close`.

use crate::app::Dispatcher;
use crate::config::ServerConfig;
use crate::error::{RouterError, RouterResult};
use crate::http::{Body, Method, Request, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Binds `config.bind_address` and serves until the listener fails.
pub async fn serve(dispatcher: Dispatcher, config: &ServerConfig) -> RouterResult<()> {
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!(
        address = %listener.local_addr()?,
        mounts = ?dispatcher.mounts().prefixes(),
        "Server running"
    );
    serve_listener(listener, dispatcher, config.max_connections).await
}

pub async fn serve_listener(
    listener: TcpListener,
    dispatcher: Dispatcher,
    max_connections: usize,
) -> RouterResult<()> {
    let permits = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return Ok(()),
        };

        match listener.accept().await {
            Ok((stream, peer)) => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(&dispatcher, stream).await {
                        error!(%peer, "Connection error: {}", e);
                    }
                    drop(permit);
                });
            }
            Err(e) => warn!("Connection failed: {}", e),
        }
    }
}

/// Reads one request from `stream`, dispatches it and writes the response.
pub async fn handle_connection<S>(dispatcher: &Dispatcher, mut stream: S) -> RouterResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf_reader = BufReader::new(&mut stream);
    let mut request_line = String::new();
    buf_reader.read_line(&mut request_line).await?;

    if request_line.is_empty() {
        return Ok(());
    }

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        warn!(line = %request_line.trim_end(), "Malformed request line");
        let mut response = Response::default();
        dispatcher.render_error(&RouterError::BadRequest("Invalid request line".to_string()), &mut response);
        stream.write_all(&serialize(&response)).await?;
        stream.flush().await?;
        return Ok(());
    };
    let method = method.to_string();
    let path = decode_path(target);

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if buf_reader.read_line(&mut line).await? == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.trim().split_once(':') {
            headers.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let mut data = Vec::new();
    if let Some(length) = headers.get("content-length").and_then(|l| l.parse::<u64>().ok()) {
        let mut take = buf_reader.take(length);
        take.read_to_end(&mut data).await?;
    }

    let response = match method.parse::<Method>() {
        Ok(method) => {
            let content_type = headers.get("content-type").cloned().unwrap_or_default();
            let request = Request {
                method,
                path,
                mount_path: None,
                headers,
                body: Body::from_bytes(data).with_content_type(&content_type),
            };
            let mut response = dispatcher.respond(&request);
            debug!(method = %request.method, path = %request.path, status = response.status, "served");
            if request.method == Method::HEAD {
                response.body.clear();
            }
            response
        }
        Err(err) => {
            let mut response = Response::default();
            dispatcher.render_error(&err, &mut response);
            response
        }
    };

    stream.write_all(&serialize(&response)).await?;
    stream.flush().await?;
    Ok(())
}

/// Strips the query string and percent-decodes the path.
fn decode_path(target: &str) -> String {
    let raw = target.split(&['?', '#'][..]).next().unwrap_or("/");
    let decoded = urlencoding::decode(raw)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    if decoded.is_empty() {
        "/".to_string()
    } else {
        decoded
    }
}

fn serialize(response: &Response) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", response.status, reason_phrase(response.status));
    for (name, value) in &response.headers {
        if matches!(name.as_str(), "content-length" | "connection" | "date") {
            continue;
        }
        head += &format!("{}: {}\r\n", name, value);
    }
    if let Some(content_type) = response.content_type() {
        if !response.headers.contains_key("content-type") {
            head += &format!("content-type: {}\r\n", content_type);
        }
    }
    head += &format!("date: {}\r\n", httpdate::fmt_http_date(SystemTime::now()));
    head += "connection: close\r\n";
    head += &format!("content-length: {}\r\n\r\n", response.body.len());

    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(response.body.as_bytes());
    bytes
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_decoded_and_query_dropped() {
        assert_eq!(decode_path("/premium-clients?x=1"), "/premium-clients");
        assert_eq!(decode_path("/a%20b"), "/a b");
        assert_eq!(decode_path("?only=query"), "/");
    }

    #[test]
    fn serialization_writes_status_headers_and_length() {
        let mut res = Response::text("hola");
        res.header("url", "/premium-clients");
        let text = String::from_utf8(serialize(&res)).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("url: /premium-clients\r\n"));
        assert!(text.contains("content-type: text/html; charset=utf-8\r\n"));
        assert!(text.contains("content-length: 4\r\n"));
        assert!(text.contains("date: "));
        assert!(text.ends_with("\r\n\r\nhola"));
    }
}
