use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder};

use crate::error::{Result, WeatherError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("ipweather/", env!("CARGO_PKG_VERSION"));

/// Shared client for all outbound calls of one invocation.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::InvalidArgument(format!("cannot build HTTP client: {e}")))
}

/// Sends `request` and returns the body of a successful response.
pub(crate) async fn fetch_text(service: &'static str, request: RequestBuilder) -> Result<String> {
    let res = request.send().await.map_err(WeatherError::network(service))?;

    let status = res.status();
    debug!("{service} answered {status} for {}", res.url());

    let body = res.text().await.map_err(WeatherError::network(service))?;

    if !status.is_success() {
        return Err(WeatherError::Status { service, status, body: truncate_body(&body) });
    }

    Ok(body)
}

/// One-line excerpt of a response body for error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;

    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

/// Answers exactly one request on a loopback port with a canned response.
#[cfg(test)]
pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> String {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}")
}

/// Client that ignores proxy variables so loopback requests stay local.
#[cfg(test)]
pub(crate) fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}
